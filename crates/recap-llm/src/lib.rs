//! # recap-llm
//!
//! AI completion providers and the summary generation workflow:
//!
//! - [`CompletionProvider`]: the trait both hosted providers implement
//! - [`OpenAiProvider`] / [`AnthropicProvider`]: the two HTTP clients
//! - [`prompt`]: the fixed prompt templates
//! - [`FallbackChain`]: PRIMARY → FALLBACK → (caller's deterministic tail)
//! - [`checklist`]: the markdown checklist parser behind task generation
//! - [`MockProvider`]: scripted provider for chain-level tests

#![deny(unsafe_code)]

pub mod anthropic;
pub mod checklist;
pub mod errors;
pub mod generate;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use checklist::{parse_checklist, ChecklistItem};
pub use errors::ProviderError;
pub use generate::{deterministic_summary, FallbackChain, GenerationSource};
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use provider::CompletionProvider;
