//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use recap_llm::FallbackChain;
use recap_settings::DiscoveryReport;
use recap_store::{ConnectionPool, PooledConnection, StoreError};

use crate::error::ApiError;

/// Which provider API keys were configured at startup. Surfaced by the
/// diagnostics route; key values are never exposed.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProviderPresence {
    pub openai: bool,
    pub anthropic: bool,
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: ConnectionPool,
    /// The PRIMARY → FALLBACK provider chain.
    pub chain: FallbackChain,
    /// How the database location was discovered.
    pub discovery: Arc<DiscoveryReport>,
    /// Provider key presence.
    pub providers: ProviderPresence,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        pool: ConnectionPool,
        chain: FallbackChain,
        discovery: DiscoveryReport,
        providers: ProviderPresence,
    ) -> Self {
        Self {
            pool,
            chain,
            discovery: Arc::new(discovery),
            providers,
            start_time: Instant::now(),
        }
    }

    /// Check a connection out of the pool.
    pub fn conn(&self) -> Result<PooledConnection, ApiError> {
        Ok(self.pool.get().map_err(StoreError::from)?)
    }
}
