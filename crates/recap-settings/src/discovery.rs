//! Database location discovery.
//!
//! The database path is found by probing a prioritized list of environment
//! variables and accepting the first value that looks syntactically like a
//! `SQLite` target. The full probe report is retained so the diagnostics
//! endpoint can show operators which variable won and why the others were
//! skipped (values themselves are never stored in the report).
//!
//! First-plausible-match can silently select the wrong database in a
//! misconfigured deployment; the report exists so that is at least visible.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

/// Environment variables probed for the database location, highest
/// priority first.
pub const DATABASE_ENV_CANDIDATES: [&str; 5] = [
    "RECAP_DATABASE_URL",
    "DATABASE_URL",
    "SQLITE_URL",
    "RECAP_DB_PATH",
    "DB_PATH",
];

/// Outcome of probing a single environment variable.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    /// Variable name.
    pub variable: String,
    /// Whether the variable was set and non-empty.
    pub set: bool,
    /// Whether the value looked like a `SQLite` target.
    pub matched: bool,
    /// Human-readable reason when not matched.
    pub reason: String,
}

/// Full discovery report, surfaced by `/api/admin/diagnostics`.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    /// One entry per candidate variable, in probe order.
    pub probes: Vec<ProbeResult>,
    /// Name of the variable that supplied the path, if any.
    pub selected: Option<String>,
    /// Resolved database path (or `:memory:`).
    pub database_path: String,
}

/// Probe the environment for a database location.
///
/// Falls back to `~/.recap/database/recap.db` when no candidate matches.
pub fn discover_database() -> DiscoveryReport {
    let values: Vec<(String, Option<String>)> = DATABASE_ENV_CANDIDATES
        .iter()
        .map(|name| ((*name).to_string(), std::env::var(name).ok()))
        .collect();
    let report = probe_candidates(&values, &default_database_path());
    match &report.selected {
        Some(variable) => info!(variable = %variable, path = %report.database_path, "database located via environment"),
        None => info!(path = %report.database_path, "no database env var matched, using default path"),
    }
    report
}

/// Pure probe over pre-read `(name, value)` pairs. First plausible value
/// wins; later candidates are still probed so the report is complete.
pub fn probe_candidates(
    values: &[(String, Option<String>)],
    default_path: &str,
) -> DiscoveryReport {
    let mut probes = Vec::with_capacity(values.len());
    let mut selected: Option<String> = None;
    let mut database_path: Option<String> = None;

    for (variable, value) in values {
        let probe = match value.as_deref().filter(|v| !v.is_empty()) {
            None => ProbeResult {
                variable: variable.clone(),
                set: false,
                matched: false,
                reason: "not set".to_string(),
            },
            Some(raw) => match parse_sqlite_target(raw) {
                Ok(path) => {
                    if selected.is_none() {
                        selected = Some(variable.clone());
                        database_path = Some(path);
                    }
                    ProbeResult {
                        variable: variable.clone(),
                        set: true,
                        matched: true,
                        reason: String::new(),
                    }
                }
                Err(reason) => {
                    warn!(variable = %variable, reason = %reason, "skipping implausible database candidate");
                    ProbeResult {
                        variable: variable.clone(),
                        set: true,
                        matched: false,
                        reason,
                    }
                }
            },
        };
        probes.push(probe);
    }

    DiscoveryReport {
        probes,
        selected,
        database_path: database_path.unwrap_or_else(|| default_path.to_string()),
    }
}

/// Whether a value looks like a `SQLite` target; returns the normalized
/// filesystem path (or `:memory:`) on success, a reason on failure.
///
/// Accepted forms: `sqlite://<path>`, `sqlite:<path>`, `:memory:`, or a bare
/// path ending in `.db` / `.sqlite` / `.sqlite3`.
fn parse_sqlite_target(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed == ":memory:" {
        return Ok(":memory:".to_string());
    }
    let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
        rest
    } else {
        trimmed
    };
    if path == ":memory:" {
        return Ok(":memory:".to_string());
    }
    if path.contains("://") {
        return Err(format!(
            "unsupported scheme '{}'",
            path.split("://").next().unwrap_or_default()
        ));
    }
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".db") || lower.ends_with(".sqlite") || lower.ends_with(".sqlite3") {
        Ok(path.to_string())
    } else {
        Err("not a .db/.sqlite/.sqlite3 path".to_string())
    }
}

/// Default on-disk location (`~/.recap/database/recap.db`).
pub fn default_database_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".recap")
        .join("database")
        .join("recap.db")
        .display()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
