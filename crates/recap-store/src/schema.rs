//! SQL DDL and idempotent bootstrap.
//!
//! Task rows store client tag *names* as a JSON array — deliberately no
//! foreign key to `client_tags`, so deleting a tag leaves task rows
//! untouched. `daily_summaries` is unique per (user, date); the upsert path
//! in [`crate::summaries`] is read-then-branch, not `ON CONFLICT`.

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use recap_core::{DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, DEFAULT_USER_ROLE};

use crate::errors::Result;
use crate::settings::SettingRepository;
use crate::users::UserRepository;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Settings seeded by bootstrap. Also the allow-list for backup import.
/// Every key here is read by a runtime path; provider model ids live in the
/// settings file, not the database.
pub const SEED_SETTINGS: &[(&str, &str, &str)] = &[
    (
        "summary.use_emoji",
        "true",
        "Whether generated summaries are asked to include emoji",
    ),
    (
        "summary.history_limit",
        "30",
        "Default page size for the summary history endpoint",
    ),
];

/// Table DDL, applied idempotently by [`bootstrap`].
pub const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'in_progress',
    completed INTEGER NOT NULL DEFAULT 0,
    start_date TEXT,
    end_date TEXT,
    client_tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS client_tags (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    color TEXT,
    description TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS daily_summaries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    summary_date TEXT NOT NULL,
    manual_summary TEXT,
    generated_summary TEXT,
    generated_by TEXT,
    tasks_completed TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, summary_date)
);

CREATE TABLE IF NOT EXISTS system_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    description TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_end_date ON tasks(end_date);
CREATE INDEX IF NOT EXISTS idx_summaries_user_date ON daily_summaries(user_id, summary_date);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
";

/// What [`bootstrap`] found or created.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    /// Schema version now recorded in the database.
    pub schema_version: u32,
    /// Id of the default user (created if absent).
    pub default_user_id: String,
    /// Number of seed settings inserted (existing keys are left alone).
    pub settings_seeded: usize,
}

/// Create the schema, the default user, and the seed settings if absent.
/// Safe to call on every startup and from `POST /api/admin/bootstrap`.
pub fn bootstrap(conn: &Connection) -> Result<BootstrapReport> {
    conn.execute_batch(CREATE_TABLES)?;

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();
    if version.is_none() {
        let _ = conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;
    }

    let user = UserRepository::get_or_create(
        conn,
        DEFAULT_USER_EMAIL,
        DEFAULT_USER_NAME,
        DEFAULT_USER_ROLE,
    )?;

    let mut seeded = 0;
    for (key, value, description) in SEED_SETTINGS {
        if SettingRepository::get(conn, key)?.is_none() {
            let _ = SettingRepository::upsert(conn, key, value, Some(description))?;
            seeded += 1;
        }
    }

    info!(
        schema_version = version.unwrap_or(SCHEMA_VERSION),
        default_user = %user.id,
        settings_seeded = seeded,
        "database bootstrapped"
    );

    Ok(BootstrapReport {
        schema_version: version.unwrap_or(SCHEMA_VERSION),
        default_user_id: user.id,
        settings_seeded: seeded,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
