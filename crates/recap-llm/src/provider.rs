//! The completion provider trait.

use async_trait::async_trait;

use crate::errors::Result;

/// A hosted chat-completion service reduced to the one call this system
/// makes: prompt in, text out. Implementations must not panic on upstream
/// failure; every error becomes a [`crate::ProviderError`] so the fallback
/// chain can move on.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name used in logs (`openai`, `anthropic`).
    fn name(&self) -> &'static str;

    /// Issue a single chat completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
