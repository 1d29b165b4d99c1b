//! Scaffolding templates: `<root>/<category>/templates/*` rendered with `{{variable}}` substitution.
//!
//! Variables come from one user-supplied name expanded into case variants, merged with
//! explicit overrides (overrides win). Unknown placeholders are left as they are.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

use crate::skills::Library;

/// Conventional subdirectory of a category holding its templates.
pub const TEMPLATES_DIR: &str = "templates";

/// Suffixes stripped from a template file name to get the output file name.
pub const TEMPLATE_SUFFIXES: [&str; 2] = [".hbs", ".template"];

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static NAME_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap())
}

fn name_token_re() -> &'static Regex {
    NAME_TOKEN_RE.get_or_init(|| Regex::new(r"\{\{\s*name\s*\}\}").unwrap())
}

/// One template file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub filename: String,
    pub content: String,
}

/// A rendered template, ready to be saved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub filename: String,
    pub content: String,
}

/// Result of scaffolding one category.
#[derive(Debug, Clone)]
pub struct Scaffold {
    pub category: String,
    pub files: Vec<RenderedFile>,
    pub variables: TemplateVars,
}

/// Insertion-ordered variable map. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    entries: Vec<(String, String)>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Apply overrides on top of the current values.
    pub fn merge<K, V>(&mut self, overrides: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in overrides {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a name into lowercase words at separators and camelCase boundaries.
/// `"userProfile"`, `"user_profile"`, `"User Profile"` all give `["user", "profile"]`.
fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut out = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                out.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Case variants of one name: `name`, `Name`, `NAME`, `nameKebab`, `nameSnake`, `nameCamel`, `namePascal`.
pub fn name_variants(name: &str) -> TemplateVars {
    let name = name.trim();
    let words = words(name);
    let camel: String = words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
        .collect();
    let pascal: String = words.iter().map(|w| capitalize(w)).collect();

    let mut vars = TemplateVars::new();
    vars.insert("name", name);
    vars.insert("Name", capitalize(name));
    vars.insert("NAME", name.to_uppercase());
    vars.insert("nameKebab", words.join("-"));
    vars.insert("nameSnake", words.join("_"));
    vars.insert("nameCamel", camel);
    vars.insert("namePascal", pascal);
    vars
}

/// Replace every `{{ var }}` with its value; placeholders without a value stay verbatim.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(v) => v.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// `"{{name}}.controller.ts.hbs"` + `"my-name"` -> `"my-name.controller.ts"`.
pub fn output_filename(template_name: &str, name_kebab: &str) -> String {
    let stripped = TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| template_name.strip_suffix(suffix))
        .filter(|s| !s.is_empty())
        .unwrap_or(template_name);
    name_token_re()
        .replace_all(stripped, regex::NoExpand(name_kebab))
        .into_owned()
}

/// Every file in `<category>/templates/`, sorted by name. Missing directory => empty.
pub fn load_templates(library: &Library, category: &str) -> Vec<TemplateFile> {
    let category = category.trim();
    if category.is_empty() {
        return Vec::new();
    }
    let dir_name = library
        .category(category)
        .map(|c| c.name)
        .unwrap_or_else(|| category.to_string());
    let dir = Path::new(&dir_name).join(TEMPLATES_DIR);
    let source = library.source();
    let entries = match source.list(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("no templates for {}: {}", category, e);
            return Vec::new();
        }
    };
    let mut out = Vec::new();
    for entry in entries.into_iter().filter(|e| !e.is_dir) {
        match source.read(&dir.join(&entry.name)) {
            Ok(content) => out.push(TemplateFile {
                filename: entry.name,
                content,
            }),
            Err(e) => log::warn!("skipping template {}/{}: {}", dir.display(), entry.name, e),
        }
    }
    out
}

/// Render all templates of a category for `name`, with `overrides` applied on top of the name variants.
pub fn scaffold<K, V>(
    library: &Library,
    category: &str,
    name: &str,
    overrides: impl IntoIterator<Item = (K, V)>,
) -> Scaffold
where
    K: Into<String>,
    V: Into<String>,
{
    let mut variables = name_variants(name);
    variables.merge(overrides);
    let kebab = variables.get("nameKebab").unwrap_or(name).to_string();
    let files = load_templates(library, category)
        .into_iter()
        .map(|t| RenderedFile {
            filename: output_filename(&t.filename, &kebab),
            content: render(&t.content, &variables),
        })
        .collect();
    Scaffold {
        category: category.trim().to_string(),
        files,
        variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::MemorySource;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        let mut v = TemplateVars::new();
        v.merge(pairs.iter().copied());
        v
    }

    #[test]
    fn render_substitutes_known_and_keeps_unknown() {
        let v = vars(&[("name", "svc"), ("port", "4100")]);
        assert_eq!(render("Hello {{name}}, port {{port}}", &v), "Hello svc, port 4100");
        assert_eq!(render("Hello {{missing}}", &v), "Hello {{missing}}");
        assert_eq!(render("{{ name }}-{{name}}", &v), "svc-svc");
    }

    #[test]
    fn output_filename_strips_suffix_and_substitutes_name() {
        assert_eq!(output_filename("foo.ts.hbs", "my-name"), "foo.ts");
        assert_eq!(output_filename("{{name}}.controller.ts", "my-name"), "my-name.controller.ts");
        assert_eq!(output_filename("{{ name }}.spec.ts.template", "a-b"), "a-b.spec.ts");
        assert_eq!(output_filename("README.md", "x"), "README.md");
    }

    #[test]
    fn name_variants_from_kebab() {
        let v = name_variants("user-profile");
        assert_eq!(v.get("name"), Some("user-profile"));
        assert_eq!(v.get("Name"), Some("User-profile"));
        assert_eq!(v.get("NAME"), Some("USER-PROFILE"));
        assert_eq!(v.get("nameKebab"), Some("user-profile"));
        assert_eq!(v.get("nameSnake"), Some("user_profile"));
        assert_eq!(v.get("nameCamel"), Some("userProfile"));
        assert_eq!(v.get("namePascal"), Some("UserProfile"));
    }

    #[test]
    fn name_variants_from_camel_and_acronyms() {
        let v = name_variants("HTTPServerConfig");
        assert_eq!(v.get("nameKebab"), Some("http-server-config"));
        let v = name_variants("orderItem2Fast");
        assert_eq!(v.get("nameSnake"), Some("order_item2_fast"));
    }

    #[test]
    fn overrides_win_and_keep_order() {
        let mut v = name_variants("svc");
        v.merge([("name", "override"), ("port", "4100")]);
        assert_eq!(v.get("name"), Some("override"));
        let keys: Vec<_> = v.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first(), Some(&"name"));
        assert_eq!(keys.last(), Some(&"port"));
    }

    #[test]
    fn scaffold_renders_category_templates() {
        let lib = Library::new(
            MemorySource::new()
                .with("backend-patterns/controller.md", "# Controller")
                .with(
                    "backend-patterns/templates/{{name}}.controller.ts.hbs",
                    "export class {{namePascal}}Controller {} // port {{port}}",
                )
                .with("backend-patterns/templates/README.md.template", "# {{Name}}"),
        );
        let s = scaffold(&lib, "backend-patterns", "user-profile", [("port", "4100")]);
        assert_eq!(s.files.len(), 2);
        assert_eq!(s.files[0].filename, "README.md");
        assert_eq!(s.files[0].content, "# User-profile");
        assert_eq!(s.files[1].filename, "user-profile.controller.ts");
        assert_eq!(
            s.files[1].content,
            "export class UserProfileController {} // port 4100"
        );
    }

    #[test]
    fn missing_templates_dir_is_empty() {
        let lib = Library::new(MemorySource::new().with("db/prisma.md", "x"));
        assert!(load_templates(&lib, "db").is_empty());
        assert!(load_templates(&lib, "nope").is_empty());
        assert!(scaffold(&lib, "db", "x", Vec::<(String, String)>::new()).files.is_empty());
    }
}
