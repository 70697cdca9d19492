//! Backup export/import.
//!
//! Export serializes all tasks, summaries, and settings for one user into a
//! single versioned JSON document. Import upserts per-record (conflict on
//! `id` for tasks/summaries, on `key` for allow-listed settings) and swallows
//! individual failures: a malformed record is logged at `warn`, counted, and
//! the batch continues. Partial import is the design, not a bug.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use recap_core::{now_iso, ClientTag, DailySummary, SystemSetting, Task, BACKUP_VERSION};

use crate::errors::Result;
use crate::schema::SEED_SETTINGS;
use crate::settings::SettingRepository;
use crate::summaries::SummaryRepository;
use crate::tags::TagRepository;
use crate::tasks::{TaskFilter, TaskRepository};

/// The exported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Format version tag (currently `"1"`).
    pub version: String,
    /// Export timestamp.
    pub exported_at: String,
    /// Entity sections.
    pub data: BackupData,
}

/// Entity sections of a backup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub summaries: Vec<DailySummary>,
    #[serde(default)]
    pub client_tags: Vec<ClientTag>,
    #[serde(default)]
    pub settings: Vec<SystemSetting>,
}

/// Per-section import counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SectionReport {
    pub imported: usize,
    pub failed: usize,
}

/// Counts returned by [`import_backup`]. Which records failed is not
/// surfaced beyond the counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub tasks: SectionReport,
    pub summaries: SectionReport,
    pub client_tags: SectionReport,
    pub settings: SectionReport,
}

/// Export everything belonging to `user_id` plus the (global) tags and
/// settings tables.
pub fn export_backup(conn: &Connection, user_id: &str) -> Result<BackupDocument> {
    Ok(BackupDocument {
        version: BACKUP_VERSION.to_string(),
        exported_at: now_iso(),
        data: BackupData {
            tasks: TaskRepository::list(conn, user_id, &TaskFilter::default())?,
            summaries: SummaryRepository::history(conn, user_id, u32::MAX)?,
            client_tags: TagRepository::list(conn)?,
            settings: SettingRepository::list(conn)?,
        },
    })
}

/// Import a backup `data` section for `user_id`.
///
/// The caller is responsible for checking that the document carried
/// `version` and `data` keys; this function takes the raw `data` value and
/// processes each section record by record.
pub fn import_backup(conn: &Connection, user_id: &str, data: &Value) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for record in section(data, "tasks") {
        match serde_json::from_value::<Task>(record.clone())
            .map_err(crate::StoreError::from)
            .and_then(|task| TaskRepository::upsert_snapshot(conn, user_id, &task))
        {
            Ok(()) => report.tasks.imported += 1,
            Err(e) => {
                warn!(error = %e, "skipping task record in backup import");
                report.tasks.failed += 1;
            }
        }
    }

    for record in section(data, "summaries") {
        match serde_json::from_value::<DailySummary>(record.clone())
            .map_err(crate::StoreError::from)
            .and_then(|summary| SummaryRepository::upsert_snapshot(conn, user_id, &summary))
        {
            Ok(()) => report.summaries.imported += 1,
            Err(e) => {
                warn!(error = %e, "skipping summary record in backup import");
                report.summaries.failed += 1;
            }
        }
    }

    for record in section(data, "client_tags") {
        let outcome = serde_json::from_value::<ClientTag>(record.clone())
            .map_err(crate::StoreError::from)
            .and_then(|tag| {
                // Name may already exist under a different id; keep the
                // existing row in that case
                if TagRepository::get_by_name(conn, &tag.name)?.is_some() {
                    return Ok(());
                }
                let _ = TagRepository::create(
                    conn,
                    &crate::tags::TagCreateParams {
                        name: tag.name,
                        color: tag.color,
                        description: tag.description,
                    },
                )?;
                Ok(())
            });
        match outcome {
            Ok(()) => report.client_tags.imported += 1,
            Err(e) => {
                warn!(error = %e, "skipping client tag record in backup import");
                report.client_tags.failed += 1;
            }
        }
    }

    for record in section(data, "settings") {
        match serde_json::from_value::<SystemSetting>(record.clone()) {
            Ok(setting) if allow_listed(&setting.key) => {
                match SettingRepository::upsert(
                    conn,
                    &setting.key,
                    &setting.value,
                    setting.description.as_deref(),
                ) {
                    Ok(_) => report.settings.imported += 1,
                    Err(e) => {
                        warn!(error = %e, key = %setting.key, "skipping setting in backup import");
                        report.settings.failed += 1;
                    }
                }
            }
            Ok(setting) => {
                warn!(key = %setting.key, "setting key not allow-listed, skipping");
                report.settings.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "skipping setting record in backup import");
                report.settings.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Only seed-known keys may be imported.
fn allow_listed(key: &str) -> bool {
    SEED_SETTINGS.iter().any(|(k, _, _)| *k == key)
}

fn section<'a>(data: &'a Value, name: &str) -> &'a [Value] {
    data.get(name)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
