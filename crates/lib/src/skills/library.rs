//! The skill library: enumerate categories, resolve identifiers, suggest, and search.
//!
//! Nothing is cached. Every call walks the source again, so edits on disk show up on the
//! next request and concurrent callers never share mutable state.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::document::{
    overview_description, Category, Document, SkillRef, MARKDOWN_EXT, OVERVIEW_SLUG,
};
use super::source::{DocumentSource, FsSource, SourceEntry};

/// Maximum number of suggestions returned for a failed lookup.
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Identifier, category, or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Root or file exists but cannot be read.
    #[error("skill library unavailable ({location}): {source}")]
    StorageUnavailable {
        location: String,
        #[source]
        source: io::Error,
    },
    /// Request is missing what it needs to do anything.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl LibraryError {
    fn from_io(location: impl Into<String>, e: io::Error) -> Self {
        let location = location.into();
        if e.kind() == io::ErrorKind::NotFound {
            LibraryError::NotFound(location)
        } else {
            LibraryError::StorageUnavailable {
                location,
                source: e,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LibraryError::NotFound(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Category,
    Skill,
}

/// Candidate offered when an identifier did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Category name or skill id.
    pub label: String,
    pub kind: SuggestionKind,
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            SuggestionKind::Category => "category",
            SuggestionKind::Skill => "skill",
        };
        write!(f, "{} ({})", self.label, kind)
    }
}

/// Read-only accessor over a tree of `<category>/<slug>.md` documents. Cheap to clone.
#[derive(Clone)]
pub struct Library {
    source: Arc<dyn DocumentSource>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("source", &self.source.describe())
            .finish()
    }
}

/// One directory or file name: no separators, not `.` or `..`.
fn is_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn markdown_stem(name: &str) -> Option<&str> {
    name.strip_suffix(MARKDOWN_EXT).filter(|s| !s.is_empty())
}

impl Library {
    pub fn new(source: impl DocumentSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Library over a directory on disk. A missing directory is an empty library.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FsSource::new(root))
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    /// Category directory names, in enumeration order. Unreadable root => empty.
    fn category_dirs(&self) -> Vec<String> {
        match self.source.list(Path::new("")) {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.is_dir && !e.name.starts_with('.'))
                .map(|e| e.name)
                .collect(),
            Err(e) => {
                let err = LibraryError::StorageUnavailable {
                    location: self.source.describe(),
                    source: e,
                };
                log::warn!("{}; treating library as empty", err);
                Vec::new()
            }
        }
    }

    /// All categories with at least one skill or an overview, in enumeration order.
    pub fn categories(&self) -> Vec<Category> {
        self.category_dirs()
            .into_iter()
            .filter_map(|name| self.load_category(&name))
            .collect()
    }

    /// One category by name (case-insensitive).
    pub fn category(&self, name: &str) -> Option<Category> {
        let dir = self.find_entry(Path::new(""), name.trim(), true)?;
        self.load_category(&dir)
    }

    fn load_category(&self, name: &str) -> Option<Category> {
        let entries = match self.source.list(Path::new(name)) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("skipping category {}: {}", name, e);
                return None;
            }
        };
        let mut has_overview = false;
        let mut skills = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            let Some(stem) = markdown_stem(&entry.name) else {
                continue;
            };
            if stem == OVERVIEW_SLUG {
                has_overview = true;
            } else {
                skills.push(SkillRef::new(name, stem));
            }
        }
        if skills.is_empty() && !has_overview {
            return None;
        }
        let description = if has_overview {
            match self.read_overview(name) {
                Ok(doc) => overview_description(&doc.content),
                Err(e) => {
                    log::warn!("reading overview for {}: {}", name, e);
                    String::new()
                }
            }
        } else {
            String::new()
        };
        Some(Category {
            name: name.to_string(),
            description,
            has_overview,
            skills,
        })
    }

    /// Find the real name of an entry in `dir`: exact match first, then case-insensitive.
    fn find_entry(&self, dir: &Path, wanted: &str, want_dir: bool) -> Option<String> {
        let entries: Vec<SourceEntry> = self.source.list(dir).ok()?;
        let candidates = entries.into_iter().filter(|e| e.is_dir == want_dir);
        let mut folded = None;
        for e in candidates {
            if e.name == wanted {
                return Some(e.name);
            }
            if folded.is_none() && e.name.to_lowercase() == wanted.to_lowercase() {
                folded = Some(e.name);
            }
        }
        folded
    }

    fn read_at(&self, path: &Path) -> Result<String, LibraryError> {
        self.source
            .read(path)
            .map_err(|e| LibraryError::from_io(path.display().to_string(), e))
    }

    /// Read `<category>/<slug>.md`. The slug `index` yields the overview. Both parts must be
    /// single path segments; nothing below a category directory is a skill.
    pub fn read_document(&self, category: &str, slug: &str) -> Result<Document, LibraryError> {
        if slug.eq_ignore_ascii_case(OVERVIEW_SLUG) {
            return self.read_overview(category);
        }
        let not_found = || LibraryError::NotFound(format!("{}/{}", category, slug));
        if !is_segment(category) || !is_segment(slug) {
            return Err(not_found());
        }
        let file = format!("{}{}", slug, MARKDOWN_EXT);
        let exact = Path::new(category).join(&file);
        match self.read_at(&exact) {
            Ok(content) => return Ok(Document::skill(category, slug, content)),
            Err(e) if !e.is_not_found() => return Err(e),
            Err(_) => {}
        }
        let dir = self
            .find_entry(Path::new(""), category, true)
            .ok_or_else(not_found)?;
        let name = self
            .find_entry(Path::new(&dir), &file, false)
            .ok_or_else(not_found)?;
        let slug = markdown_stem(&name).ok_or_else(not_found)?;
        if slug == OVERVIEW_SLUG {
            return Err(not_found());
        }
        let content = self.read_at(&Path::new(&dir).join(&name))?;
        Ok(Document::skill(&dir, slug, content))
    }

    /// Read `<category>/index.md` as an overview document.
    pub fn read_overview(&self, category: &str) -> Result<Document, LibraryError> {
        if !is_segment(category) {
            return Err(LibraryError::NotFound(category.to_string()));
        }
        let file = format!("{}{}", OVERVIEW_SLUG, MARKDOWN_EXT);
        match self.read_at(&Path::new(category).join(&file)) {
            Ok(content) => return Ok(Document::overview(category, content)),
            Err(e) if !e.is_not_found() => return Err(e),
            Err(_) => {}
        }
        let dir = self
            .find_entry(Path::new(""), category, true)
            .ok_or_else(|| LibraryError::NotFound(category.to_string()))?;
        let content = self.read_at(&Path::new(&dir).join(&file))?;
        Ok(Document::overview(&dir, content))
    }

    /// Turn an identifier into one document.
    ///
    /// `category/slug` (or `category.slug`) is tried as a skill first; failing that the whole
    /// identifier is tried as a category overview. No guessing: a miss is `NotFound`, and the
    /// caller decides whether to offer [`Library::suggest`].
    pub fn resolve(&self, id: &str) -> Result<Document, LibraryError> {
        let id = id.trim().trim_matches('/');
        let id = id.strip_suffix(MARKDOWN_EXT).unwrap_or(id);
        if id.is_empty() {
            return Err(LibraryError::NotFound(String::new()));
        }

        let split = id.split_once('/').or_else(|| id.split_once('.'));
        if let Some((category, slug)) = split {
            match self.read_document(category.trim(), slug.trim()) {
                Ok(doc) => return Ok(doc),
                Err(e) if !e.is_not_found() => log::warn!("resolving {}: {}", id, e),
                Err(_) => {}
            }
        }

        match self.read_overview(id) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                if !e.is_not_found() {
                    log::warn!("resolving {} as category: {}", id, e);
                }
                Err(LibraryError::NotFound(id.to_string()))
            }
        }
    }

    /// Categories and skills whose name, id, or display name contains `input` (case-insensitive).
    /// At most [`MAX_SUGGESTIONS`], in enumeration order (each category before its skills).
    pub fn suggest(&self, input: &str) -> Vec<Suggestion> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for category in self.categories() {
            if category.name.to_lowercase().contains(&needle) {
                out.push(Suggestion {
                    label: category.name.clone(),
                    kind: SuggestionKind::Category,
                });
            }
            for skill in &category.skills {
                if skill.id.to_lowercase().contains(&needle)
                    || skill.display_name.to_lowercase().contains(&needle)
                {
                    out.push(Suggestion {
                        label: skill.id.clone(),
                        kind: SuggestionKind::Skill,
                    });
                }
            }
            if out.len() >= MAX_SUGGESTIONS {
                break;
            }
        }
        out.truncate(MAX_SUGGESTIONS);
        out
    }

    /// Every skill id (overviews excluded), in enumeration order.
    pub fn skill_ids(&self) -> Vec<String> {
        self.categories()
            .into_iter()
            .flat_map(|c| c.skills.into_iter().map(|s| s.id))
            .collect()
    }

    /// Skill documents whose content, display name, or category contains `query` (case-insensitive).
    /// Results keep enumeration order; an empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<Document> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for category in self.categories() {
            let category_hit = category.name.to_lowercase().contains(&needle);
            for skill in &category.skills {
                let doc = match self.read_document(&category.name, skill.slug()) {
                    Ok(doc) => doc,
                    Err(e) => {
                        log::warn!("search skipped {}: {}", skill.id, e);
                        continue;
                    }
                };
                if category_hit
                    || doc.display_name.to_lowercase().contains(&needle)
                    || doc.content.to_lowercase().contains(&needle)
                {
                    out.push(doc);
                }
            }
        }
        log::debug!("search {:?}: {} match(es)", query, out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::document::DocumentKind;
    use crate::skills::source::MemorySource;

    fn fixture() -> Library {
        Library::new(
            MemorySource::new()
                .with("backend-patterns/controller.md", "# Controller\nUse thin controllers.\n")
                .with("backend-patterns/service.md", "# Service\nBusiness logic lives here.\n")
                .with("database-patterns/index.md", "# Database\n> Schema and query patterns\n")
                .with("database-patterns/prisma.md", "# Prisma\nUse PRISMA migrations.\n")
                .with("database-patterns/postgres.md", "# Postgres\nIndexes and vacuum.\n")
                .with("empty-category/notes.txt", "not markdown")
                .with("README.md", "root file"),
        )
    }

    #[test]
    fn categories_skip_empty_and_non_dirs() {
        let lib = fixture();
        let cats = lib.categories();
        let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["backend-patterns", "database-patterns"]);
        assert!(!cats[0].has_overview);
        assert_eq!(cats[0].description, "");
        assert!(cats[1].has_overview);
        assert_eq!(cats[1].description, "Schema and query patterns");
        let skills: Vec<_> = cats[1].skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skills, vec!["database-patterns/postgres", "database-patterns/prisma"]);
    }

    #[test]
    fn resolve_skill_and_display_name() {
        let doc = fixture().resolve("backend-patterns/controller").unwrap();
        assert_eq!(doc.id, "backend-patterns/controller");
        assert_eq!(doc.display_name, "Controller");
        assert_eq!(doc.kind, DocumentKind::Skill);
    }

    #[test]
    fn resolve_is_case_insensitive_and_accepts_dots() {
        let lib = fixture();
        let doc = lib.resolve("Backend-Patterns/CONTROLLER").unwrap();
        assert_eq!(doc.id, "backend-patterns/controller");
        let doc = lib.resolve("database-patterns.prisma").unwrap();
        assert_eq!(doc.id, "database-patterns/prisma");
        let doc = lib.resolve("database-patterns/prisma.md").unwrap();
        assert_eq!(doc.id, "database-patterns/prisma");
    }

    #[test]
    fn resolve_category_overview() {
        let lib = fixture();
        let doc = lib.resolve("database-patterns").unwrap();
        assert_eq!(doc.id, "database-patterns/index");
        assert!(doc.is_overview());
        assert!(doc.display_name.ends_with("(Overview)"));
        assert_eq!(lib.resolve("database-patterns/index").unwrap(), doc);
    }

    #[test]
    fn resolve_category_without_overview_fails_with_suggestion() {
        let lib = fixture();
        let err = lib.resolve("backend-patterns").unwrap_err();
        assert!(err.is_not_found());
        let suggestions = lib.suggest("backend-patterns");
        assert_eq!(suggestions[0].to_string(), "backend-patterns (category)");
        assert!(suggestions
            .iter()
            .any(|s| s.label == "backend-patterns/controller" && s.kind == SuggestionKind::Skill));
    }

    #[test]
    fn skill_wins_over_overview() {
        let lib = Library::new(
            MemorySource::new()
                .with("a/b.md", "skill b")
                .with("a.b/index.md", "overview of a.b"),
        );
        let doc = lib.resolve("a.b").unwrap();
        assert_eq!(doc.kind, DocumentKind::Skill);
        assert_eq!(doc.content, "skill b");
        let overview = lib.resolve("a.b/index").unwrap();
        assert_eq!(overview.kind, DocumentKind::Overview);
        assert_eq!(overview.category, "a.b");
    }

    #[test]
    fn nested_paths_are_not_documents() {
        let lib = Library::new(
            MemorySource::new()
                .with("backend-patterns/controller.md", "# Controller")
                .with("backend-patterns/templates/README.md", "template readme")
                .with("backend-patterns/drafts/index.md", "draft overview"),
        );
        assert_eq!(lib.skill_ids(), vec!["backend-patterns/controller"]);
        assert!(lib.resolve("backend-patterns/templates/README").unwrap_err().is_not_found());
        assert!(lib.resolve("backend-patterns/drafts").unwrap_err().is_not_found());
        assert!(lib.read_document("backend-patterns", "templates/README").is_err());
        assert!(lib.read_overview("backend-patterns/drafts").is_err());
        let names: Vec<_> = lib.categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["backend-patterns"]);
    }

    #[test]
    fn resolve_is_idempotent() {
        let lib = fixture();
        let a = lib.resolve("database-patterns/prisma").unwrap();
        let b = lib.resolve("database-patterns/prisma").unwrap();
        assert_eq!(a.content, b.content);
    }

    #[test]
    fn suggestions_are_capped() {
        let mut src = MemorySource::new();
        for i in 0..15 {
            src.insert(format!("cat/widget-{:02}.md", i), "x");
        }
        let lib = Library::new(src);
        assert_eq!(lib.suggest("widget").len(), MAX_SUGGESTIONS);
        assert!(lib.suggest("zzz").is_empty());
    }

    #[test]
    fn search_matches_content_name_or_category() {
        let lib = fixture();
        let hits: Vec<_> = lib.search("prisma").into_iter().map(|d| d.id).collect();
        assert_eq!(hits, vec!["database-patterns/prisma"]);
        let hits = lib.search("database");
        assert_eq!(hits.len(), 2);
        assert!(lib.search("   ").is_empty());
        assert!(lib.search("kubernetes").is_empty());
    }

    #[test]
    fn skill_ids_exclude_overviews() {
        let ids = fixture().skill_ids();
        assert_eq!(ids.len(), 4);
        assert!(!ids.iter().any(|id| id.ends_with("/index")));
    }

    #[test]
    fn missing_root_is_empty() {
        let lib = Library::open(std::env::temp_dir().join("skilldex-no-such-root"));
        assert!(lib.categories().is_empty());
        assert!(lib.search("anything").is_empty());
        assert!(lib.resolve("a/b").unwrap_err().is_not_found());
    }
}
