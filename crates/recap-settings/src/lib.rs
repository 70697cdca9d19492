//! # recap-settings
//!
//! Configuration loading for the recap server:
//!
//! - [`RecapSettings`]: the settings document backed by
//!   `~/.recap/settings.json`, deep-merged over compiled defaults
//! - [`load_settings`] / [`apply_env_overrides`]: the loading pipeline
//! - [`discovery`]: the prioritized environment-variable probe that locates
//!   the `SQLite` database

#![deny(unsafe_code)]

pub mod discovery;
pub mod errors;
pub mod loader;
pub mod types;

pub use discovery::{discover_database, DiscoveryReport, ProbeResult};
pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::{ProviderSettings, RecapSettings, ServerSettings};
