//! `scaffold`: render a category's templates for a name and return the files as text.

use serde::Deserialize;
use std::fmt::Write;

use super::category_list;
use crate::skills::Library;
use crate::templates::{self, RenderedFile};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldArgs {
    pub category: String,
    pub name: String,
    /// Extra variables; override the derived name variants. Kept in caller order.
    #[serde(default)]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
}

fn json_value_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ScaffoldArgs {
    /// Overrides as strings. Null, array, and object values are skipped.
    pub fn overrides(&self) -> Vec<(String, String)> {
        let Some(vars) = &self.variables else {
            return Vec::new();
        };
        vars.iter()
            .filter_map(|(k, v)| match json_value_to_string(v) {
                Some(s) => Some((k.clone(), s)),
                None => {
                    log::debug!("scaffold: ignoring non-scalar variable {}", k);
                    None
                }
            })
            .collect()
    }
}

fn code_fence(file: &RenderedFile) -> (&'static str, &str) {
    let fence = if file.content.contains("```") { "````" } else { "```" };
    let lang = file
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("");
    (fence, lang)
}

/// Render `args.category`'s templates for `args.name`.
pub fn scaffold(library: &Library, args: &ScaffoldArgs) -> String {
    let category = args.category.trim();
    let name = args.name.trim();
    if category.is_empty() || name.is_empty() {
        return "Usage: provide \"category\" (e.g. backend-patterns) and \"name\" (e.g. user-profile)."
            .to_string();
    }

    let result = templates::scaffold(library, category, name, args.overrides());
    if result.files.is_empty() {
        return format!(
            "No templates found for category \"{}\" (expected files in {}/{}/).\n\nCategories with documents: {}",
            category,
            category,
            templates::TEMPLATES_DIR,
            category_list(library)
        );
    }
    log::info!(
        "scaffolded {} file(s) for {} from {}",
        result.files.len(),
        name,
        category
    );

    let mut out = format!(
        "# Scaffold: {} from {}\n\n{} file{} rendered. Save each file below at the path shown.\n\n## Variables\n\n",
        name,
        result.category,
        result.files.len(),
        if result.files.len() == 1 { "" } else { "s" },
    );
    for (k, v) in result.variables.iter() {
        let _ = writeln!(out, "- `{}` = `{}`", k, v);
    }
    out.push_str("\n## Files\n");
    for file in &result.files {
        let (fence, lang) = code_fence(file);
        let _ = write!(
            out,
            "\n### `{}`\n\n{}{}\n{}\n{}\n",
            file.filename,
            fence,
            lang,
            file.content.trim_end_matches('\n'),
            fence
        );
    }
    out
}
