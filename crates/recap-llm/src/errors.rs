//! Provider error type.

use thiserror::Error;

/// Errors a completion provider can surface. Any of these transitions the
/// fallback chain to its next stage; none is retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the provider API.
    #[error("{provider} api error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Provider was constructed without an API key.
    #[error("{provider} api key not configured")]
    MissingApiKey { provider: &'static str },

    /// 2xx response that carried no usable completion text.
    #[error("{provider} returned an empty completion")]
    EmptyCompletion { provider: &'static str },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProviderError>;
