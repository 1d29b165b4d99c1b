//! `check_rules`: turn a skill's rules into a checklist, optionally next to code under review.

use serde::Deserialize;
use std::fmt;

use crate::skills::{extract_rules, Library};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRulesArgs {
    pub skill_id: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Outcome of a rules check. `Display` renders the markdown returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checklist {
    Found {
        skill_id: String,
        display_name: String,
        rules: Vec<String>,
        code: Option<String>,
    },
    SkillNotFound {
        skill_id: String,
        known: Vec<String>,
    },
}

impl Checklist {
    /// Extracted rules, in document order (empty when the skill was not found).
    pub fn rules(&self) -> &[String] {
        match self {
            Checklist::Found { rules, .. } => rules,
            Checklist::SkillNotFound { .. } => &[],
        }
    }
}

fn fence_for(code: &str) -> &'static str {
    if code.contains("```") {
        "````"
    } else {
        "```"
    }
}

impl fmt::Display for Checklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checklist::SkillNotFound { skill_id, known } => {
                writeln!(f, "Skill \"{}\" not found.", skill_id)?;
                writeln!(f)?;
                if known.is_empty() {
                    write!(f, "The skill library is empty.")
                } else {
                    writeln!(f, "Available skills:")?;
                    for id in known {
                        writeln!(f, "- {}", id)?;
                    }
                    Ok(())
                }
            }
            Checklist::Found {
                skill_id,
                display_name,
                rules,
                code,
            } => {
                writeln!(f, "# Checklist: {} (`{}`)", display_name, skill_id)?;
                writeln!(f)?;
                if rules.is_empty() {
                    writeln!(
                        f,
                        "No explicit rules section found in this skill. Read it with get_skill and review against the full text."
                    )?;
                } else {
                    for rule in rules {
                        writeln!(f, "- [ ] {}", rule)?;
                    }
                    writeln!(f)?;
                    writeln!(f, "## Rules ({})", rules.len())?;
                    writeln!(f)?;
                    for (i, rule) in rules.iter().enumerate() {
                        writeln!(f, "{}. {}", i + 1, rule)?;
                    }
                }
                if let Some(code) = code.as_deref().filter(|c| !c.trim().is_empty()) {
                    let fence = fence_for(code);
                    writeln!(f)?;
                    writeln!(f, "## Code to review")?;
                    writeln!(f)?;
                    writeln!(f, "{}", fence)?;
                    writeln!(f, "{}", code.trim_end())?;
                    writeln!(f, "{}", fence)?;
                    writeln!(f)?;
                    write!(f, "Check the code above against each item of the checklist.")?;
                }
                Ok(())
            }
        }
    }
}

/// Resolve `args.skill_id` and extract its rules.
pub fn check_rules(library: &Library, args: &CheckRulesArgs) -> Checklist {
    let skill_id = args.skill_id.trim();
    match library.resolve(skill_id) {
        Ok(doc) => {
            let rules = extract_rules(&doc.content);
            log::debug!(
                "check_rules {}: {} rule(s) from {}",
                doc.id,
                rules.len(),
                doc.source_path().display()
            );
            Checklist::Found {
                skill_id: doc.id,
                display_name: doc.display_name,
                rules,
                code: args.code.clone(),
            }
        }
        Err(e) => {
            log::debug!("check_rules {}: {}", skill_id, e);
            Checklist::SkillNotFound {
                skill_id: skill_id.to_string(),
                known: library.skill_ids(),
            }
        }
    }
}
