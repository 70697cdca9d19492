//! Fixed prompt templates.
//!
//! Task titles, descriptions, and manual notes are interpolated verbatim; no
//! escaping is applied before the text reaches the model.

use recap_core::types::Task;

/// Assemble the daily-summary prompt from the date, the completed tasks, and
/// the optional manual note. `use_emoji` mirrors the `summary.use_emoji`
/// setting and toggles the closing tone instruction.
#[must_use]
pub fn build_summary_prompt(
    date: &str,
    tasks: &[Task],
    manual_summary: Option<&str>,
    use_emoji: bool,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an assistant that writes concise daily standup summaries \
         for a software consultant.\n\n",
    );
    prompt.push_str(&format!("Date: {date}\n\n"));

    if tasks.is_empty() {
        prompt.push_str("No tasks were completed today.\n");
    } else {
        prompt.push_str("Completed tasks:\n");
        for task in tasks {
            match task.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => {
                    prompt.push_str(&format!("- {}: {description}\n", task.title));
                }
                None => prompt.push_str(&format!("- {}\n", task.title)),
            }
        }
    }

    if let Some(note) = manual_summary {
        if !note.trim().is_empty() {
            prompt.push_str(&format!("\nAdditional notes from the user:\n{note}\n"));
        }
    }

    prompt.push_str(
        "\nWrite a short summary with three sections: what was done, what is \
         planned next, and any blockers. Use the headings \"Done\", \
         \"Planned\", and \"Blockers\".",
    );
    if use_emoji {
        prompt.push_str(" Feel free to use emoji to keep the tone light.");
    }
    prompt
}

/// Assemble the task-extraction prompt: the model is asked to reply with
/// nothing but a markdown checklist, which the checklist parser then turns
/// into task drafts.
#[must_use]
pub fn build_task_extraction_prompt(text: &str) -> String {
    format!(
        "Extract actionable tasks from the following notes. Reply with a \
         markdown checklist only, one item per line, in the form \
         `- [ ] Title: description`. Use `- [x]` for items that are already \
         done. Do not add any other text.\n\nNotes:\n{text}"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
