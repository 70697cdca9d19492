//! Settings document types.
//!
//! The settings file uses camelCase keys (`{"server": {"port": 8787}}`).
//! Every struct carries `#[serde(default)]` so a partial file deep-merges
//! cleanly over the compiled defaults.

use serde::{Deserialize, Serialize};

/// Root settings document (`~/.recap/settings.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecapSettings {
    /// Settings schema version.
    pub version: u32,
    /// HTTP server settings.
    pub server: ServerSettings,
    /// AI provider settings.
    pub providers: ProviderSettings,
}

impl Default for RecapSettings {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSettings::default(),
            providers: ProviderSettings::default(),
        }
    }
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// AI provider configuration.
///
/// API keys here are overridden by `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`
/// when set. A missing key disables that stage of the fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// OpenAI API key for the primary provider.
    pub openai_api_key: Option<String>,
    /// Anthropic API key for the fallback provider.
    pub anthropic_api_key: Option<String>,
    /// Model id sent to the primary provider.
    pub primary_model: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            primary_model: "gpt-4o-mini".to_string(),
        }
    }
}
