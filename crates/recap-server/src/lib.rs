//! # recap-server
//!
//! The HTTP API:
//!
//! - [`AppState`]: pool + provider chain + diagnostics context
//! - [`build_router`]: every route under `/api` plus `/health`
//! - [`ApiError`]: the `{"error": ...}` JSON error envelope
//! - [`start`]: bind, serve, and shut down on signal
//!
//! Handlers are stateless: each checks a connection out of the pool, resolves
//! the default user, and calls into the repositories.

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ApiError;
pub use server::{build_router, start, ServerConfig, ServerHandle};
pub use state::{AppState, ProviderPresence};
