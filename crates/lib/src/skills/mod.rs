//! Skills: a library of markdown pattern guides laid out as `<root>/<category>/<slug>.md`.
//!
//! Each category may carry an `index.md` overview and a `templates/` directory used for scaffolding.
//! The library reads through a [`DocumentSource`] so tests can swap the filesystem for memory.

mod document;
mod library;
mod rules;
mod source;

pub use document::{
    display_name, overview_description, strip_frontmatter, Category, Document, DocumentKind,
    SkillRef, MARKDOWN_EXT, OVERVIEW_SLUG,
};
pub use library::{Library, LibraryError, Suggestion, SuggestionKind, MAX_SUGGESTIONS};
pub use rules::extract_rules;
pub use source::{DocumentSource, FsSource, MemorySource, SourceEntry};
