//! # recap-store
//!
//! `SQLite` persistence for recap.
//!
//! - [`connection`]: r2d2 pool with WAL/pragma customizer
//! - [`schema`]: DDL plus [`bootstrap`] (schema + default user + seed settings)
//! - Repositories: [`users`], [`tasks`], [`tags`], [`summaries`], [`settings`]
//! - [`backup`]: JSON export/import with per-record error swallowing
//!
//! Repositories are stateless: every method takes a `&Connection` and
//! translates between Rust types and SQL. Handlers check a connection out of
//! the pool per request; there are no transaction boundaries beyond each
//! statement's own implicit transaction.

#![deny(unsafe_code)]

pub mod backup;
pub mod connection;
pub mod errors;
pub mod schema;
pub mod settings;
pub mod summaries;
pub mod tags;
pub mod tasks;
pub mod users;

pub use backup::{export_backup, import_backup, BackupData, BackupDocument, ImportReport};
pub use connection::{new_file, new_in_memory, ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use schema::bootstrap;
pub use settings::SettingRepository;
pub use summaries::{SummaryRepository, SummaryUpsertParams};
pub use tags::{TagCreateParams, TagRepository, TagUpdateParams};
pub use tasks::{TaskCreateParams, TaskFilter, TaskRepository, TaskUpdateParams};
pub use users::UserRepository;
