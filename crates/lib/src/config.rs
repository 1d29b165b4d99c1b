//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.skilldex/config.json`) and environment.
//! The only thing the library needs from it is where the skill library lives.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SKILLDEX_CONFIG_PATH";

/// Env var that overrides the skill library root (highest precedence).
pub const SKILLS_DIR_ENV: &str = "SKILLDEX_SKILLS_DIR";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Skill library location.
    #[serde(default)]
    pub skills: SkillsConfig,
}

/// Skill library config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsConfig {
    /// Override the default skill root. Relative paths are resolved against the config file's parent. Omit to use the bundled library extracted by `skilldex init` (~/.skilldex/skills).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".skilldex").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or SKILLDEX_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving the config directory).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Default skill root when no override is set: `skills` subdirectory of the config file's parent.
pub fn skills_dir(config_path: &Path) -> PathBuf {
    config_parent(config_path).join("skills")
}

/// Skill root from the config file alone: `skills.directory` if set (relative paths resolved against the config file's parent), otherwise the default `skills` subdirectory.
pub fn resolve_skills_dir(config: &Config, config_path: &Path) -> PathBuf {
    match &config.skills.directory {
        Some(d) if !d.as_os_str().is_empty() => {
            if d.is_absolute() {
                d.clone()
            } else {
                config_parent(config_path).join(d)
            }
        }
        _ => skills_dir(config_path),
    }
}

/// Resolve the skill library root: env SKILLDEX_SKILLS_DIR, then the `--skills-dir` flag, then the config file.
/// The result is always absolute (relative values are joined onto the current directory).
pub fn resolve_root_dir(
    config: &Config,
    config_path: &Path,
    cli_override: Option<&Path>,
) -> PathBuf {
    let env_override = std::env::var(SKILLS_DIR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    let cli_override = cli_override
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let root = env_override
        .or(cli_override)
        .unwrap_or_else(|| resolve_skills_dir(config, config_path));
    absolutize(root)
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            log::warn!("cannot read current directory ({}); keeping {}", e, path.display());
            path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_skills_dir_default() {
        let config = Config::default();
        let path = Path::new("/home/user/.skilldex/config.json");
        assert_eq!(
            resolve_skills_dir(&config, path),
            PathBuf::from("/home/user/.skilldex/skills")
        );
    }

    #[test]
    fn resolve_skills_dir_override_relative() {
        let mut config = Config::default();
        config.skills.directory = Some(PathBuf::from("custom/skills"));
        let path = Path::new("/home/user/.skilldex/config.json");
        assert_eq!(
            resolve_skills_dir(&config, path),
            PathBuf::from("/home/user/.skilldex/custom/skills")
        );
    }

    #[test]
    fn resolve_skills_dir_override_absolute() {
        let mut config = Config::default();
        config.skills.directory = Some(PathBuf::from("/repo/skills"));
        let path = Path::new("/home/user/.skilldex/config.json");
        assert_eq!(
            resolve_skills_dir(&config, path),
            PathBuf::from("/repo/skills")
        );
    }

    #[test]
    fn resolve_root_dir_is_absolute() {
        if std::env::var_os(SKILLS_DIR_ENV).is_some() {
            return;
        }
        let config = Config::default();
        let root = resolve_root_dir(
            &config,
            Path::new("config.json"),
            Some(Path::new("rel/skills")),
        );
        assert!(root.is_absolute());
        assert!(root.ends_with("rel/skills"));
    }

    #[test]
    fn resolve_root_dir_flag_beats_config() {
        if std::env::var_os(SKILLS_DIR_ENV).is_some() {
            return;
        }
        let mut config = Config::default();
        config.skills.directory = Some(PathBuf::from("/repo/skills"));
        let root = resolve_root_dir(
            &config,
            Path::new("/home/user/.skilldex/config.json"),
            Some(Path::new("/flag/skills")),
        );
        assert_eq!(root, PathBuf::from("/flag/skills"));
    }

    #[test]
    fn parse_camel_case_config() {
        let config: Config =
            serde_json::from_str(r#"{"skills":{"directory":"/srv/skills"}}"#).unwrap();
        assert_eq!(config.skills.directory, Some(PathBuf::from("/srv/skills")));
    }
}
