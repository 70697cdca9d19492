//! Two-provider fallback generation.
//!
//! The flow is forward-only: primary, then fallback, then a deterministic
//! template with no I/O. No stage is ever retried — a single failure moves
//! straight to the next stage.

use std::sync::Arc;

use recap_core::types::Task;
use serde::Serialize;
use tracing::warn;

use crate::prompt::build_summary_prompt;
use crate::provider::CompletionProvider;

/// Which stage of the chain produced a result. Stored verbatim in the
/// summary's `generated_by` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Primary,
    Fallback,
    Deterministic,
}

impl GenerationSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
            Self::Deterministic => "deterministic",
        }
    }
}

/// The PRIMARY → FALLBACK provider pair. Either stage may be absent (no API
/// key configured); an absent stage is skipped the same way a failed one is.
#[derive(Clone, Default)]
pub struct FallbackChain {
    primary: Option<Arc<dyn CompletionProvider>>,
    fallback: Option<Arc<dyn CompletionProvider>>,
}

impl FallbackChain {
    #[must_use]
    pub fn new(
        primary: Option<Arc<dyn CompletionProvider>>,
        fallback: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Whether at least one hosted provider is configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// Run the prompt through the provider stages in order. Returns `None`
    /// when every configured stage failed (or none is configured); the caller
    /// supplies its own deterministic tail.
    pub async fn complete(&self, prompt: &str) -> Option<(String, GenerationSource)> {
        for (provider, source) in [
            (self.primary.as_ref(), GenerationSource::Primary),
            (self.fallback.as_ref(), GenerationSource::Fallback),
        ] {
            let Some(provider) = provider else { continue };
            match provider.complete(prompt).await {
                Ok(text) => return Some((text, source)),
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "provider failed, moving to next stage");
                }
            }
        }
        None
    }

    /// Full daily-summary flow: build the prompt, run the chain, and fall
    /// through to [`deterministic_summary`] when no provider succeeds. Cannot
    /// fail.
    pub async fn generate_daily_summary(
        &self,
        date: &str,
        tasks: &[Task],
        manual_summary: Option<&str>,
        use_emoji: bool,
    ) -> (String, GenerationSource) {
        let prompt = build_summary_prompt(date, tasks, manual_summary, use_emoji);
        if let Some(result) = self.complete(&prompt).await {
            return result;
        }
        warn!(date, "all providers failed, using deterministic summary");
        (
            deterministic_summary(date, tasks, manual_summary),
            GenerationSource::Deterministic,
        )
    }
}

/// Templated summary used when both providers fail. No I/O, always succeeds.
#[must_use]
pub fn deterministic_summary(date: &str, tasks: &[Task], manual_summary: Option<&str>) -> String {
    let mut out = format!("Daily summary for {date}\n\nDone:\n");
    if tasks.is_empty() {
        out.push_str("- No completed tasks recorded.\n");
    } else {
        for task in tasks {
            match task.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => out.push_str(&format!("- {}: {description}\n", task.title)),
                None => out.push_str(&format!("- {}\n", task.title)),
            }
        }
    }
    out.push_str("\nPlanned:\n- See the task board for upcoming work.\n");
    out.push_str("\nBlockers:\n");
    match manual_summary.map(str::trim).filter(|note| !note.is_empty()) {
        Some(note) => out.push_str(&format!("- Notes: {note}\n")),
        None => out.push_str("- None reported.\n"),
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
