//! Scripted provider for chain-level tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::{ProviderError, Result};
use crate::provider::CompletionProvider;

/// A [`CompletionProvider`] that replays a scripted sequence of outcomes and
/// records every prompt it was handed. Lives in the public API (not behind
/// `cfg(test)`) so downstream crates can exercise the fallback chain without
/// a network.
pub struct MockProvider {
    name: &'static str,
    responses: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Provider that always succeeds with `text`.
    #[must_use]
    pub fn ok(name: &'static str, text: impl Into<String>) -> Self {
        Self::scripted(name, vec![Ok(text.into())])
    }

    /// Provider that always fails with an API error.
    #[must_use]
    pub fn failing(name: &'static str) -> Self {
        Self::scripted(
            name,
            vec![Err(ProviderError::Api {
                provider: name,
                status: 500,
                message: "scripted failure".to_string(),
            })],
        )
    }

    /// Provider that replays `responses` in order, then repeats the last one.
    #[must_use]
    pub fn scripted(name: &'static str, mut responses: Vec<Result<String>>) -> Self {
        responses.reverse();
        Self {
            name,
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt passed to [`CompletionProvider::complete`], in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of completion calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let mut responses = self.responses.lock();
        let next = if responses.len() > 1 {
            responses.pop()
        } else {
            responses.last().map(clone_result)
        };
        next.unwrap_or_else(|| {
            Err(ProviderError::EmptyCompletion {
                provider: self.name,
            })
        })
    }
}

fn clone_result(result: &Result<String>) -> Result<String> {
    match result {
        Ok(text) => Ok(text.clone()),
        Err(ProviderError::Api {
            provider,
            status,
            message,
        }) => Err(ProviderError::Api {
            provider,
            status: *status,
            message: message.clone(),
        }),
        Err(ProviderError::MissingApiKey { provider }) => {
            Err(ProviderError::MissingApiKey { provider })
        }
        Err(ProviderError::EmptyCompletion { provider }) => {
            Err(ProviderError::EmptyCompletion { provider })
        }
        // reqwest errors are not cloneable; degrade to an equivalent marker.
        Err(ProviderError::Http(_)) => Err(ProviderError::EmptyCompletion { provider: "mock" }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
