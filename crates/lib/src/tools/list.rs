//! `list_skills`: categories, their descriptions, and skill references.

use serde::Deserialize;
use std::fmt::Write;

use super::category_list;
use crate::skills::{Category, Library};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSkillsArgs {
    #[serde(default)]
    pub category: Option<String>,
}

fn write_category(out: &mut String, category: &Category) {
    let _ = writeln!(out, "## {}", category.name);
    if !category.description.is_empty() {
        let _ = writeln!(out, "> {}", category.description);
    }
    if category.has_overview {
        let _ = writeln!(out, "Overview: `{}`", category.name);
    }
    if category.skills.is_empty() {
        out.push_str("(no skills)\n");
    }
    for skill in &category.skills {
        let _ = writeln!(out, "- `{}`: {}", skill.id, skill.display_name);
    }
    out.push('\n');
}

/// List all categories, or just the one named by `args.category` (case-insensitive).
pub fn list_skills(library: &Library, args: &ListSkillsArgs) -> String {
    let filter = args
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let categories = match filter {
        Some(name) => match library.category(name) {
            Some(c) => vec![c],
            None => {
                return format!(
                    "Category \"{}\" not found.\n\nAvailable categories: {}",
                    name,
                    category_list(library)
                );
            }
        },
        None => library.categories(),
    };

    if categories.is_empty() {
        return "No skill categories found. The skill library is empty.".to_string();
    }

    let skill_count: usize = categories.iter().map(|c| c.skills.len()).sum();
    let mut out = format!(
        "# Skill Library\n\n{} categor{}, {} skill{}\n\n",
        categories.len(),
        if categories.len() == 1 { "y" } else { "ies" },
        skill_count,
        if skill_count == 1 { "" } else { "s" },
    );
    for category in &categories {
        write_category(&mut out, category);
    }
    out.push_str("Use get_skill with an id to read a skill, or with a category name to read its overview.");
    out
}
