//! Domain records shared across the workspace.
//!
//! All records serialize with snake_case field names, matching the JSON the
//! API accepts and returns. Dates are bare `YYYY-MM-DD` strings, timestamps
//! full ISO 8601 — see [`crate::time`].

use serde::{Deserialize, Serialize};

/// Email of the single account every non-admin handler operates against.
pub const DEFAULT_USER_EMAIL: &str = "owner@recap.local";
/// Display name used when the default user record is first created.
pub const DEFAULT_USER_NAME: &str = "Recap Owner";
/// Role stamped on the default user record.
pub const DEFAULT_USER_ROLE: &str = "admin";

/// Version tag written into backup exports.
pub const BACKUP_VERSION: &str = "1";

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

/// Task lifecycle status.
///
/// `completed` on [`Task`] is an independently writable flag that the update
/// handlers keep in sync with this enum by convention only — there is no
/// constraint tying the two together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Canceled,
    Paused,
    Blocked,
}

impl TaskStatus {
    /// SQL string form stored in the `status` column.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Paused => "paused",
            Self::Blocked => "blocked",
        }
    }

    /// Parse the SQL string form; unknown values fall back to `Pending`.
    #[must_use]
    pub fn from_sql(value: &str) -> Self {
        match value {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "canceled" => Self::Canceled,
            "paused" => Self::Paused,
            "blocked" => Self::Blocked,
            _ => Self::Pending,
        }
    }

    /// Whether this status marks the task as finished (done or abandoned).
    ///
    /// Terminal statuses force `completed = true` and stamp `end_date`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

/// A single unit of work recorded by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub completed: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Client tag *names* — no foreign key, no referential integrity.
    pub client_tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client tag
// ─────────────────────────────────────────────────────────────────────────────

/// Named, colored label associating tasks with a customer or project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTag {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily summary
// ─────────────────────────────────────────────────────────────────────────────

/// Per-user, per-date standup report.
///
/// `tasks_completed` is a denormalized snapshot taken at generation time; it
/// does not update when the underlying task rows change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: String,
    pub user_id: String,
    pub summary_date: String,
    pub manual_summary: Option<String>,
    pub generated_summary: Option<String>,
    /// Which path produced `generated_summary`: `primary`, `fallback`, or
    /// `deterministic`. `None` for purely manual entries.
    pub generated_by: Option<String>,
    pub tasks_completed: Vec<Task>,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// System setting / user
// ─────────────────────────────────────────────────────────────────────────────

/// Flat key-value configuration row. No typing or schema validation on
/// `value`; callers parse it however they see fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: String,
}

/// Account record. In practice a single default user exists — see
/// [`DEFAULT_USER_EMAIL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_sql_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Canceled,
            TaskStatus::Paused,
            TaskStatus::Blocked,
        ] {
            assert_eq!(TaskStatus::from_sql(status.as_sql()), status);
        }
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        assert_eq!(TaskStatus::from_sql("archived"), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_sql(""), TaskStatus::Pending);
    }

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::Blocked.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, TaskStatus::Canceled);
    }

    #[test]
    fn task_json_uses_snake_case_fields() {
        let task = Task {
            id: "task-1".into(),
            user_id: "user-1".into(),
            title: "Write report".into(),
            description: None,
            status: TaskStatus::InProgress,
            completed: false,
            start_date: Some("2024-01-10".into()),
            end_date: None,
            client_tags: vec!["acme".into()],
            created_at: "2024-01-10T08:00:00Z".into(),
            updated_at: "2024-01-10T08:00:00Z".into(),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["start_date"], "2024-01-10");
        assert_eq!(value["client_tags"][0], "acme");
        assert_eq!(value["status"], "in_progress");
    }
}
