//! Read-only storage behind the skill library.
//!
//! The library only ever lists a directory or reads a file, relative to its root.
//! `FsSource` does that against a real directory; `MemorySource` keeps everything in a map.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// One entry of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
}

impl SourceEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Narrow read-only view of a document tree. Paths are relative to the source root; the empty path is the root itself.
pub trait DocumentSource: Send + Sync {
    /// List the immediate entries of a directory, sorted by name.
    fn list(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Read a file as UTF-8 text.
    fn read(&self, file: &Path) -> io::Result<String>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Rejects absolute paths and `..` so a crafted identifier cannot escape the root.
fn check_relative(path: &Path) -> io::Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path escapes library root: {}", path.display()),
        ));
    }
    Ok(())
}

/// Filesystem-backed source rooted at an absolute directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSource for FsSource {
    fn list(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        check_relative(dir)?;
        let mut out = Vec::new();
        for entry in std::fs::read_dir(self.root.join(dir))?.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::debug!("skipping non-UTF-8 entry in {}", self.root.join(dir).display());
                continue;
            };
            // follows symlinks, like Path::is_dir
            let is_dir = entry.path().is_dir();
            out.push(SourceEntry { name, is_dir });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn read(&self, file: &Path) -> io::Result<String> {
        check_relative(file)?;
        let path = self.root.join(file);
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a file: {}", path.display()),
            ));
        }
        std::fs::read_to_string(path)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory source: files keyed by `/`-separated relative path. Directories exist implicitly.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into().trim_matches('/').to_string();
        self.files.insert(path, content.into());
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    fn key(path: &Path) -> String {
        path.components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl DocumentSource for MemorySource {
    fn list(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        check_relative(dir)?;
        let dir = Self::key(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        let mut entries: BTreeMap<String, bool> = BTreeMap::new();
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    entries.insert(child.to_string(), true);
                }
                None => {
                    entries.entry(rest.to_string()).or_insert(false);
                }
            }
        }
        if entries.is_empty() && !dir.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir),
            ));
        }
        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| SourceEntry { name, is_dir })
            .collect())
    }

    fn read(&self, file: &Path) -> io::Result<String> {
        check_relative(file)?;
        let key = Self::key(file);
        self.files.get(&key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", key))
        })
    }

    fn describe(&self) -> String {
        format!("<memory: {} file(s)>", self.files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_lists_dirs_and_files_sorted() {
        let src = MemorySource::new()
            .with("b/one.md", "1")
            .with("a/index.md", "i")
            .with("a/templates/x.hbs", "t")
            .with("README.md", "r");
        let root = src.list(Path::new("")).unwrap();
        assert_eq!(
            root,
            vec![
                SourceEntry::file("README.md"),
                SourceEntry::dir("a"),
                SourceEntry::dir("b"),
            ]
        );
        let a = src.list(Path::new("a")).unwrap();
        assert_eq!(a, vec![SourceEntry::file("index.md"), SourceEntry::dir("templates")]);
    }

    #[test]
    fn memory_source_missing_dir_is_not_found() {
        let src = MemorySource::new().with("a/x.md", "x");
        let err = src.list(Path::new("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn parent_components_are_rejected() {
        let src = MemorySource::new().with("a/x.md", "x");
        let err = src.read(Path::new("a/../../etc/passwd")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn fs_source_missing_root_errors() {
        let src = FsSource::new(std::env::temp_dir().join("skilldex-definitely-missing-root"));
        assert!(src.list(Path::new("")).is_err());
    }
}
