//! Initialize the configuration directory: create ~/.skilldex, a default config, and the bundled skill library.
//!
//! Layout mirrors `crates/lib/config/`: `config/skills/` → `~/.skilldex/skills/`.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use std::path::{Path, PathBuf};

use crate::skills::Library;

static BUNDLED_SKILLS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/config/skills");

/// Library over the skills compiled into the binary (read straight from memory, no extraction).
pub fn bundled_library() -> Library {
    let mut source = crate::skills::MemorySource::new();
    add_bundled_files(&BUNDLED_SKILLS, &mut source);
    Library::new(source)
}

fn add_bundled_files(dir: &Dir<'_>, source: &mut crate::skills::MemorySource) {
    for file in dir.files() {
        let Some(text) = file.contents_utf8() else {
            log::debug!("skipping non-UTF-8 bundled file {}", file.path().display());
            continue;
        };
        source.insert(file.path().to_string_lossy().replace('\\', "/"), text);
    }
    for sub in dir.dirs() {
        add_bundled_files(sub, source);
    }
}

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Extracts the bundled skills into the `skills` subdirectory if it does not exist.
///
/// Returns the skills directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let skills_dir = config_dir.join("skills");
    if !skills_dir.exists() {
        std::fs::create_dir_all(&skills_dir)
            .with_context(|| format!("creating skills directory {}", skills_dir.display()))?;
        if let Err(e) = BUNDLED_SKILLS.extract(&skills_dir) {
            anyhow::bail!(
                "extracting bundled skills to {}: {}",
                skills_dir.display(),
                e
            );
        }
        log::info!("extracted bundled skills to {}", skills_dir.display());
    } else {
        log::debug!("skills directory already exists at {}, skipping", skills_dir.display());
    }

    Ok(skills_dir)
}
