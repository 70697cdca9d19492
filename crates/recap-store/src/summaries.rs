//! Daily summary repository.
//!
//! The (user, date) upsert is deliberately read-then-branch: look the row up,
//! then INSERT or UPDATE. Two requests racing on the same date are
//! last-writer-wins with no detection; this mirrors the original behavior and
//! is covered by the UNIQUE(user_id, summary_date) constraint only as a
//! duplicate backstop.

use rusqlite::{params, Connection, OptionalExtension};

use recap_core::ids::SUMMARY_PREFIX;
use recap_core::{generate_id, now_iso, DailySummary, Task};

use crate::errors::Result;

/// Fields written by an upsert. `None` leaves nothing behind — every column
/// is replaced with the provided value.
#[derive(Debug, Clone, Default)]
pub struct SummaryUpsertParams {
    pub manual_summary: Option<String>,
    pub generated_summary: Option<String>,
    /// Provider marker: `primary`, `fallback`, or `deterministic`.
    pub generated_by: Option<String>,
    /// Snapshot of the tasks the summary covers, embedded as JSON.
    pub tasks_completed: Vec<Task>,
}

/// SQL CRUD for `daily_summaries`.
pub struct SummaryRepository;

impl SummaryRepository {
    /// Insert or update the summary for (user, date).
    pub fn upsert(
        conn: &Connection,
        user_id: &str,
        date: &str,
        params: &SummaryUpsertParams,
    ) -> Result<DailySummary> {
        let tasks_json = serde_json::to_string(&params.tasks_completed)?;
        let now = now_iso();

        // Read-then-branch, not ON CONFLICT: concurrent writers for the same
        // date resolve last-writer-wins.
        let existing = Self::get_by_date(conn, user_id, date)?;
        let id = match existing {
            Some(row) => {
                let _ = conn.execute(
                    "UPDATE daily_summaries SET manual_summary = ?1, generated_summary = ?2,
                     generated_by = ?3, tasks_completed = ?4, updated_at = ?5 WHERE id = ?6",
                    rusqlite::params![
                        params.manual_summary,
                        params.generated_summary,
                        params.generated_by,
                        tasks_json,
                        now,
                        row.id,
                    ],
                )?;
                row.id
            }
            None => {
                let id = generate_id(SUMMARY_PREFIX);
                let _ = conn.execute(
                    "INSERT INTO daily_summaries (id, user_id, summary_date, manual_summary,
                     generated_summary, generated_by, tasks_completed, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                    rusqlite::params![
                        id,
                        user_id,
                        date,
                        params.manual_summary,
                        params.generated_summary,
                        params.generated_by,
                        tasks_json,
                        now,
                    ],
                )?;
                id
            }
        };

        Self::get(conn, &id)?.ok_or_else(|| crate::StoreError::not_found("daily_summary", &id))
    }

    /// Get a summary by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<DailySummary>> {
        let summary = conn
            .query_row(
                "SELECT * FROM daily_summaries WHERE id = ?1",
                params![id],
                |row| Ok(summary_from_row(row)),
            )
            .optional()?;
        Ok(summary)
    }

    /// Get the summary for (user, date).
    pub fn get_by_date(conn: &Connection, user_id: &str, date: &str) -> Result<Option<DailySummary>> {
        let summary = conn
            .query_row(
                "SELECT * FROM daily_summaries WHERE user_id = ?1 AND summary_date = ?2",
                params![user_id, date],
                |row| Ok(summary_from_row(row)),
            )
            .optional()?;
        Ok(summary)
    }

    /// Recent summaries for a user, newest date first.
    pub fn history(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<DailySummary>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM daily_summaries WHERE user_id = ?1 \
             ORDER BY summary_date DESC LIMIT ?2",
        )?;
        let summaries = stmt
            .query_map(params![user_id, limit], |row| Ok(summary_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(summaries)
    }

    /// Delete a summary by id. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM daily_summaries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Write a full summary record, replacing any row with the same id.
    /// Used by backup import; `user_id` is forced to the importing user.
    pub fn upsert_snapshot(conn: &Connection, user_id: &str, summary: &DailySummary) -> Result<()> {
        let tasks_json = serde_json::to_string(&summary.tasks_completed)?;
        let _ = conn.execute(
            "INSERT INTO daily_summaries (id, user_id, summary_date, manual_summary,
             generated_summary, generated_by, tasks_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                summary_date = excluded.summary_date,
                manual_summary = excluded.manual_summary,
                generated_summary = excluded.generated_summary,
                generated_by = excluded.generated_by,
                tasks_completed = excluded.tasks_completed,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                summary.id,
                user_id,
                summary.summary_date,
                summary.manual_summary,
                summary.generated_summary,
                summary.generated_by,
                tasks_json,
                summary.created_at,
                summary.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Delete all summaries for a user. Returns the number of rows removed.
    pub fn clear(conn: &Connection, user_id: &str) -> Result<usize> {
        let changed = conn.execute(
            "DELETE FROM daily_summaries WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(changed)
    }
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> DailySummary {
    let tasks_json: String = row.get_unwrap("tasks_completed");
    DailySummary {
        id: row.get_unwrap("id"),
        user_id: row.get_unwrap("user_id"),
        summary_date: row.get_unwrap("summary_date"),
        manual_summary: row.get_unwrap("manual_summary"),
        generated_summary: row.get_unwrap("generated_summary"),
        generated_by: row.get_unwrap("generated_by"),
        tasks_completed: serde_json::from_str(&tasks_json).unwrap_or_default(),
        created_at: row.get_unwrap("created_at"),
        updated_at: row.get_unwrap("updated_at"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::schema::bootstrap;
    use crate::tasks::{TaskCreateParams, TaskRepository, TaskUpdateParams};

    fn setup() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        let report = bootstrap(&conn).unwrap();
        (conn, report.default_user_id)
    }

    #[test]
    fn upsert_inserts_then_updates_in_place() {
        let (conn, user_id) = setup();
        let first = SummaryRepository::upsert(
            &conn,
            &user_id,
            "2024-03-01",
            &SummaryUpsertParams {
                manual_summary: Some("first".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let second = SummaryRepository::upsert(
            &conn,
            &user_id,
            "2024-03-01",
            &SummaryUpsertParams {
                manual_summary: Some("second".to_string()),
                generated_summary: Some("generated".to_string()),
                generated_by: Some("primary".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.manual_summary.as_deref(), Some("second"));
        assert_eq!(second.generated_by.as_deref(), Some("primary"));

        let count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM daily_summaries WHERE user_id = ?1 AND summary_date = ?2",
                params![user_id, "2024-03-01"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn tasks_completed_is_a_frozen_snapshot() {
        let (conn, user_id) = setup();
        let task = TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Before rename".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let summary = SummaryRepository::upsert(
            &conn,
            &user_id,
            "2024-03-01",
            &SummaryUpsertParams {
                tasks_completed: vec![task.clone()],
                ..Default::default()
            },
        )
        .unwrap();

        // Mutate the live row; the snapshot must not follow
        TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                title: Some("After rename".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let reread = SummaryRepository::get(&conn, &summary.id).unwrap().unwrap();
        assert_eq!(reread.tasks_completed[0].title, "Before rename");
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let (conn, user_id) = setup();
        for date in ["2024-03-01", "2024-03-03", "2024-03-02"] {
            SummaryRepository::upsert(
                &conn,
                &user_id,
                date,
                &SummaryUpsertParams::default(),
            )
            .unwrap();
        }
        let history = SummaryRepository::history(&conn, &user_id, 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].summary_date, "2024-03-03");
        assert_eq!(history[1].summary_date, "2024-03-02");
    }

    #[test]
    fn delete_summary() {
        let (conn, user_id) = setup();
        let summary = SummaryRepository::upsert(
            &conn,
            &user_id,
            "2024-03-01",
            &SummaryUpsertParams::default(),
        )
        .unwrap();
        assert!(SummaryRepository::delete(&conn, &summary.id).unwrap());
        assert!(SummaryRepository::get(&conn, &summary.id).unwrap().is_none());
    }

    #[test]
    fn get_by_date_missing_returns_none() {
        let (conn, user_id) = setup();
        assert!(SummaryRepository::get_by_date(&conn, &user_id, "2030-01-01")
            .unwrap()
            .is_none());
    }
}
