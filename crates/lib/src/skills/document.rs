//! Documents and categories: the value types handed out by the library.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Slug used for a category's overview document (`<category>/index.md`).
pub const OVERVIEW_SLUG: &str = "index";

/// Markdown extension recognized for skill documents.
pub const MARKDOWN_EXT: &str = ".md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A single skill document (`<category>/<slug>.md`).
    Skill,
    /// A category overview (`<category>/index.md`).
    Overview,
}

/// One markdown document, read fresh from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `<category>/<slug>`; overviews use the slug `index`.
    pub id: String,
    pub display_name: String,
    pub category: String,
    pub kind: DocumentKind,
    /// Raw markdown, frontmatter included.
    pub content: String,
    /// Path relative to the library root. Only used to re-read the document.
    pub(crate) source_path: PathBuf,
}

impl Document {
    pub(crate) fn skill(category: &str, slug: &str, content: String) -> Self {
        Self {
            id: format!("{}/{}", category, slug),
            display_name: display_name(slug),
            category: category.to_string(),
            kind: DocumentKind::Skill,
            content,
            source_path: PathBuf::from(category).join(format!("{}{}", slug, MARKDOWN_EXT)),
        }
    }

    pub(crate) fn overview(category: &str, content: String) -> Self {
        Self {
            id: format!("{}/{}", category, OVERVIEW_SLUG),
            display_name: format!("{} (Overview)", display_name(category)),
            category: category.to_string(),
            kind: DocumentKind::Overview,
            content,
            source_path: PathBuf::from(category).join(format!("{}{}", OVERVIEW_SLUG, MARKDOWN_EXT)),
        }
    }

    pub fn is_overview(&self) -> bool {
        self.kind == DocumentKind::Overview
    }

    /// Path relative to the library root.
    pub(crate) fn source_path(&self) -> &std::path::Path {
        &self.source_path
    }
}

/// Reference to a skill inside a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRef {
    pub id: String,
    pub display_name: String,
}

impl SkillRef {
    pub fn new(category: &str, slug: &str) -> Self {
        Self {
            id: format!("{}/{}", category, slug),
            display_name: display_name(slug),
        }
    }

    /// Slug part of the id.
    pub fn slug(&self) -> &str {
        self.id.rsplit_once('/').map(|(_, s)| s).unwrap_or(&self.id)
    }
}

/// One category (immediate subdirectory of the root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    /// Short text from the overview; empty when there is none.
    pub description: String,
    pub has_overview: bool,
    pub skills: Vec<SkillRef>,
}

/// `"error-handling"` -> `"Error Handling"`.
pub fn display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Frontmatter fields we care about (minimal).
#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    description: Option<String>,
}

/// Split leading YAML frontmatter (`---` ... `---`) from the body. Returns (yaml, body).
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return (None, content);
    };
    if !after_open.starts_with('\n') && !after_open.starts_with("\r\n") {
        return (None, content);
    }
    match after_open.find("\n---") {
        Some(end) => {
            let yaml = &after_open[..end];
            let rest = &after_open[end + 4..];
            let body = match rest.find('\n') {
                Some(nl) => &rest[nl + 1..],
                None => "",
            };
            (Some(yaml), body)
        }
        None => (None, content),
    }
}

/// Content with any leading YAML frontmatter removed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).1
}

pub(crate) fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Description for a category overview: frontmatter `description`, else the first
/// block-quote line, else the first plain paragraph line. Headings and blank lines are skipped.
pub fn overview_description(content: &str) -> String {
    let (yaml, body) = split_frontmatter(content);
    if let Some(yaml) = yaml {
        match serde_yaml::from_str::<Frontmatter>(yaml) {
            Ok(fm) => {
                if let Some(d) = fm.description.map(|d| d.trim().to_string()) {
                    if !d.is_empty() {
                        return d;
                    }
                }
            }
            Err(e) => log::debug!("ignoring unparseable frontmatter: {}", e),
        }
    }

    let mut first_plain: Option<&str> = None;
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || is_heading(line) {
            continue;
        }
        if let Some(quote) = line.strip_prefix('>') {
            let quote = quote.trim();
            if !quote.is_empty() {
                return quote.to_string();
            }
            continue;
        }
        if first_plain.is_none() {
            first_plain = Some(line);
        }
    }
    first_plain.unwrap_or_default().to_string()
}
