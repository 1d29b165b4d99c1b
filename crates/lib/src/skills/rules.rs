//! Rule extraction: mine a flat checklist out of free-form skill markdown.
//!
//! Two passes over the lines, no I/O:
//! 1. Inside a "rules" section (an h1-h3 heading mentioning rule, standard, checklist,
//!    must, requirement or convention), every bullet or numbered item is a rule. Any other
//!    h1-h3 heading closes the section.
//! 2. Anywhere in the document, a bullet starting with a status marker (✅, ❌, ⚠️, MUST,
//!    SHOULD, ...) is a rule too, unless the exact same text was already collected.
//!
//! Lines inside fenced code blocks are still scanned for items, but a `#` line inside a
//! fence is not a heading and never opens or closes a section.

use regex::Regex;
use std::sync::OnceLock;

static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static TRIGGER_RE: OnceLock<Regex> = OnceLock::new();
static LIST_ITEM_RE: OnceLock<Regex> = OnceLock::new();
static STATUS_ITEM_RE: OnceLock<Regex> = OnceLock::new();

/// h1-h3 heading; captures the heading text.
fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^\s{0,3}#{1,3}\s+(.*?)\s*#*\s*$").unwrap())
}

fn trigger_re() -> &'static Regex {
    TRIGGER_RE.get_or_init(|| {
        Regex::new(r"(?i)rule|standard|checklist|must|requirement|convention").unwrap()
    })
}

/// `- item`, `* item`, `+ item`, `1. item`, `1) item`; captures the item text.
fn list_item_re() -> &'static Regex {
    LIST_ITEM_RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+?)\s*$").unwrap())
}

/// Bullet whose text starts with a status marker; captures the text after the bullet.
fn status_item_re() -> &'static Regex {
    STATUS_ITEM_RE.get_or_init(|| {
        Regex::new(
            r"^\s*[-*+]\s+((?:\*\*)?(?:✅|❌|⚠️|⚠|✓|✔|✗|✘|🚫|(?:MUST|SHOULD|SHALL|REQUIRED|NEVER|ALWAYS)\b).*?)\s*$",
        )
        .unwrap()
    })
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Each line with its heading text, when it is an h1-h3 heading outside a code fence.
fn section_headings(content: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    let mut in_fence = false;
    content.lines().map(move |line| {
        if is_fence(line) {
            in_fence = !in_fence;
            return (line, None);
        }
        if in_fence {
            return (line, None);
        }
        let heading = heading_re()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());
        (line, heading)
    })
}

/// Extract checklist rules from markdown. Never fails; no rules is an empty list.
pub fn extract_rules(content: &str) -> Vec<String> {
    let mut rules: Vec<String> = Vec::new();

    let mut in_rules_section = false;
    for (line, heading) in section_headings(content) {
        if let Some(text) = heading {
            in_rules_section = trigger_re().is_match(text);
            continue;
        }
        if !in_rules_section {
            continue;
        }
        if let Some(caps) = list_item_re().captures(line) {
            rules.push(caps[1].to_string());
        }
    }

    for line in content.lines() {
        if let Some(caps) = status_item_re().captures(line) {
            let text = caps[1].trim();
            if !rules.iter().any(|r| r == text) {
                rules.push(text.to_string());
            }
        }
    }

    rules
}
