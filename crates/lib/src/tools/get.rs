//! `get_skill`: fetch one document by id, or search the whole library by keyword.

use serde::Deserialize;
use std::fmt::Write;

use super::category_list;
use crate::skills::{strip_frontmatter, Document, Library, LibraryError};

/// Lines of prose kept in a search snippet.
const SNIPPET_LINES: usize = 3;
/// Hard character limit for a snippet (before the ellipsis).
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSkillArgs {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

enum Lookup<'a> {
    Id(&'a str),
    Search(&'a str),
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl GetSkillArgs {
    fn lookup(&self) -> Result<Lookup<'_>, LibraryError> {
        match (non_empty(&self.id), non_empty(&self.search)) {
            (Some(id), search) => {
                if search.is_some() {
                    log::debug!("get_skill: both id and search given; using id");
                }
                Ok(Lookup::Id(id))
            }
            (None, Some(query)) => Ok(Lookup::Search(query)),
            (None, None) => Err(LibraryError::MalformedInput(
                "provide either \"id\" (e.g. backend-patterns/controller) or \"search\" (a keyword)"
                    .to_string(),
            )),
        }
    }
}

/// Preview of a document: first few non-empty, non-heading lines, cut at 200 characters.
pub fn snippet(content: &str) -> String {
    let joined = strip_frontmatter(content)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .take(SNIPPET_LINES)
        .collect::<Vec<_>>()
        .join(" ");
    if joined.chars().count() > SNIPPET_CHARS {
        let cut: String = joined.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", cut)
    } else {
        joined
    }
}

fn render_document(doc: &Document) -> String {
    format!(
        "<!-- skill: {} | category: {} -->\n\n{}",
        doc.id, doc.category, doc.content
    )
}

fn render_not_found(library: &Library, id: &str) -> String {
    let suggestions = library.suggest(id);
    let mut out = format!("Skill \"{}\" not found.\n\n", id);
    if suggestions.is_empty() {
        let _ = write!(out, "Available categories: {}", category_list(library));
    } else {
        out.push_str("Did you mean:\n");
        for s in &suggestions {
            let _ = writeln!(out, "- {}", s);
        }
    }
    out
}

fn render_search(query: &str, docs: &[Document]) -> String {
    if docs.is_empty() {
        return format!(
            "No skills found matching \"{}\". Use list_skills to browse categories.",
            query
        );
    }
    let mut out = format!(
        "Found {} skill{} matching \"{}\":\n\n",
        docs.len(),
        if docs.len() == 1 { "" } else { "s" },
        query
    );
    for doc in docs {
        let _ = writeln!(out, "### {} (`{}`)", doc.display_name, doc.id);
        let _ = writeln!(out, "Category: {}", doc.category);
        let preview = snippet(&doc.content);
        if !preview.is_empty() {
            let _ = writeln!(out, "> {}", preview);
        }
        out.push('\n');
    }
    out
}

/// Fetch by `args.id` (skill or category overview) or search by `args.search`.
pub fn get_skill(library: &Library, args: &GetSkillArgs) -> String {
    match args.lookup() {
        Ok(Lookup::Id(id)) => match library.resolve(id) {
            Ok(doc) => render_document(&doc),
            Err(e) => {
                log::debug!("get_skill {}: {}", id, e);
                render_not_found(library, id)
            }
        },
        Ok(Lookup::Search(query)) => render_search(query, &library.search(query)),
        Err(LibraryError::MalformedInput(usage)) => format!("Usage: {}", usage),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::MemorySource;

    fn library() -> Library {
        Library::new(
            MemorySource::new()
                .with("backend-patterns/controller.md", "# Controller\n\nKeep controllers thin.\n")
                .with("database-patterns/prisma.md", "# Prisma\n\nUse Prisma migrations.\n")
                .with("database-patterns/postgres.md", "# Postgres\n\nTune postgres indexes.\n"),
        )
    }

    fn by_id(id: &str) -> GetSkillArgs {
        GetSkillArgs {
            id: Some(id.to_string()),
            search: None,
        }
    }

    #[test]
    fn get_by_id_returns_full_content() {
        let out = get_skill(&library(), &by_id("backend-patterns/controller"));
        assert!(out.contains("skill: backend-patterns/controller"));
        assert!(out.contains("Keep controllers thin."));
    }

    #[test]
    fn get_category_without_overview_suggests_category() {
        let out = get_skill(&library(), &by_id("backend-patterns"));
        assert!(out.starts_with("Skill \"backend-patterns\" not found."));
        assert!(out.contains("- backend-patterns (category)"));
    }

    #[test]
    fn get_unmatched_lists_categories() {
        let out = get_skill(&library(), &by_id("zzz"));
        assert!(out.contains("Available categories: backend-patterns, database-patterns"));
    }

    #[test]
    fn search_excludes_unrelated() {
        let args = GetSkillArgs {
            id: None,
            search: Some("PRISMA".to_string()),
        };
        let out = get_skill(&library(), &args);
        assert!(out.contains("Found 1 skill matching"));
        assert!(out.contains("`database-patterns/prisma`"));
        assert!(!out.contains("postgres"));
    }

    #[test]
    fn neither_id_nor_search_is_usage() {
        let out = get_skill(&library(), &GetSkillArgs::default());
        assert!(out.starts_with("Usage:"));
        let blank = GetSkillArgs {
            id: Some("  ".to_string()),
            search: None,
        };
        assert!(get_skill(&library(), &blank).starts_with("Usage:"));
    }

    #[test]
    fn snippet_skips_headings_and_truncates() {
        assert_eq!(snippet("# T\n\nA\n## S\nB\nC\nD\n"), "A B C");
        let long = format!("# T\n{}\n", "x".repeat(300));
        let s = snippet(&long);
        assert_eq!(s.chars().count(), 203);
        assert!(s.ends_with("..."));
    }
}
