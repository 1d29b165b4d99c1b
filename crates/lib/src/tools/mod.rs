//! Tool layer: the four query operations exposed to assistants (list, get/search, check, scaffold).
//!
//! Each tool takes a JSON argument object and returns markdown text. Lookups that miss are
//! not errors: they come back as `Ok` text with suggestions. `Err` is reserved for calls
//! that cannot be understood at all (unknown tool, arguments of the wrong shape).

mod check;
mod get;
mod list;
mod scaffold;

use serde::Serialize;
use serde_json::json;

use crate::skills::Library;

pub use check::{check_rules, CheckRulesArgs, Checklist};
pub use get::{get_skill, snippet, GetSkillArgs};
pub use list::{list_skills, ListSkillsArgs};
pub use scaffold::{scaffold, ScaffoldArgs};

pub const LIST_SKILLS: &str = "list_skills";
pub const GET_SKILL: &str = "get_skill";
pub const CHECK_RULES: &str = "check_rules";
pub const SCAFFOLD: &str = "scaffold";

/// Executes a tool by name and JSON arguments. Returns output or error string.
pub trait ToolExecutor: Send + Sync {
    fn execute(&self, name: &str, args: &serde_json::Value) -> Result<String, String>;
}

/// One tool as advertised to clients (name, description, JSON schema for arguments).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Executor over a skill library. Cheap to clone; every call re-reads the library.
#[derive(Debug, Clone)]
pub struct SkillTools {
    library: Library,
}

impl SkillTools {
    pub fn new(library: Library) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &str,
    args: &serde_json::Value,
) -> Result<T, String> {
    let args = if args.is_null() { json!({}) } else { args.clone() };
    if !args.is_object() {
        return Err(format!("{}: arguments must be an object", tool));
    }
    serde_json::from_value(args).map_err(|e| format!("{}: invalid arguments: {}", tool, e))
}

impl ToolExecutor for SkillTools {
    fn execute(&self, name: &str, args: &serde_json::Value) -> Result<String, String> {
        log::debug!("tool call {} {}", name, args);
        match name {
            LIST_SKILLS => Ok(list_skills(&self.library, &parse_args(name, args)?)),
            GET_SKILL => Ok(get_skill(&self.library, &parse_args(name, args)?)),
            CHECK_RULES => Ok(check_rules(&self.library, &parse_args(name, args)?).to_string()),
            SCAFFOLD => Ok(scaffold(&self.library, &parse_args(name, args)?)),
            _ => Err(format!("unknown tool: {}", name)),
        }
    }
}

/// Definitions for every tool [`SkillTools`] handles.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: LIST_SKILLS.to_string(),
            description: "List skill categories with their descriptions and skills. Optionally restrict to one category.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string", "description": "Only list this category (e.g. backend-patterns)" }
                }
            }),
        },
        ToolDefinition {
            name: GET_SKILL.to_string(),
            description: "Get a skill document by id (category/skill, or a category name for its overview), or search all skills by keyword.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Skill id, e.g. backend-patterns/controller, or a category name" },
                    "search": { "type": "string", "description": "Keyword to search in skill names, categories, and content" }
                }
            }),
        },
        ToolDefinition {
            name: CHECK_RULES.to_string(),
            description: "Extract the rules checklist from a skill document, optionally alongside code to review against it.".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["skillId"],
                "properties": {
                    "skillId": { "type": "string", "description": "Skill id, e.g. backend-patterns/controller" },
                    "code": { "type": "string", "description": "Optional code or description to check against the rules" }
                }
            }),
        },
        ToolDefinition {
            name: SCAFFOLD.to_string(),
            description: "Render a category's templates for a name. Returns file names and contents; nothing is written to disk.".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["category", "name"],
                "properties": {
                    "category": { "type": "string", "description": "Category whose templates/ directory to use" },
                    "name": { "type": "string", "description": "Name to scaffold (e.g. user-profile); case variants are derived" },
                    "variables": {
                        "type": "object",
                        "description": "Extra template variables; these override derived name variants",
                        "additionalProperties": { "type": ["string", "number", "boolean"] }
                    }
                }
            }),
        },
    ]
}

/// Comma-separated category names, or a note that the library is empty.
pub(crate) fn category_list(library: &Library) -> String {
    let names: Vec<String> = library.categories().into_iter().map(|c| c.name).collect();
    if names.is_empty() {
        "(none: the skill library is empty)".to_string()
    } else {
        names.join(", ")
    }
}
