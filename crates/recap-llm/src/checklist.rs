//! Markdown checklist parser.
//!
//! Used twice by task generation: once on the model's reply, and once on the
//! raw input text when both providers fail.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// One parsed checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

// Accepts `- [ ]`, `- [x]`, `- [X]`, plain `-`/`*` bullets, and `1.` style
// numbered items. The checkbox group is optional so plain bullets parse too.
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]|\d+[.)])\s+(?:\[(?<check>[ xX])\]\s*)?(?<body>.+)$").unwrap()
});

/// Parse `text` line by line into checklist items. Lines that are not list
/// items are ignored; empty bodies are skipped.
#[must_use]
pub fn parse_checklist(text: &str) -> Vec<ChecklistItem> {
    text.lines()
        .filter_map(|line| {
            let caps = ITEM_RE.captures(line)?;
            let body = caps["body"].trim();
            if body.is_empty() {
                return None;
            }
            let completed = caps
                .name("check")
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
            let (title, description) = match body.split_once(':') {
                Some((title, rest)) if !title.trim().is_empty() && !rest.trim().is_empty() => {
                    (title.trim().to_string(), Some(rest.trim().to_string()))
                }
                _ => (body.to_string(), None),
            };
            Some(ChecklistItem {
                title,
                description,
                completed,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
