//! Task repository.
//!
//! Update semantics: moving `status` to a terminal value (`completed` /
//! `canceled`) forces `completed = true` and stamps `end_date` with today's
//! date if it was empty; moving to any other status clears both. The derived
//! fields and the caller's fields go out in one combined UPDATE, so a single
//! row is all-or-nothing, but there is no cross-row atomicity.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use recap_core::ids::TASK_PREFIX;
use recap_core::{generate_id, now_iso, today_iso, Task, TaskStatus};

use crate::errors::Result;

/// Parse a JSON array string into a `Vec<String>`.
fn parse_tags(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Serialize tags to a JSON array string.
fn tags_to_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskCreateParams {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_tags: Option<Vec<String>>,
}

/// Fields accepted on a partial update. A present `status` drives the
/// derived `completed` / `end_date` rules and wins over explicit values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_tags: Option<Vec<String>>,
}

/// List filter. `tags` is an overlap match: a task qualifies when any of
/// the given names appears in its `client_tags` array.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
    /// Inclusive lower bound on `start_date`.
    pub from: Option<String>,
    /// Inclusive upper bound on `start_date`.
    pub to: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// SQL CRUD for `tasks`.
pub struct TaskRepository;

impl TaskRepository {
    /// Create a task. Status defaults to `in_progress`, `start_date` to
    /// today. A terminal initial status marks the row completed immediately.
    pub fn create(conn: &Connection, user_id: &str, params: &TaskCreateParams) -> Result<Task> {
        let id = generate_id(TASK_PREFIX);
        let now = now_iso();
        let status = params.status.unwrap_or(TaskStatus::InProgress);
        let start_date = params
            .start_date
            .clone()
            .unwrap_or_else(today_iso);
        let (completed, end_date) = if status.is_terminal() {
            (true, params.end_date.clone().or_else(|| Some(today_iso())))
        } else {
            (params.completed.unwrap_or(false), params.end_date.clone())
        };
        let tags_json = tags_to_json(params.client_tags.as_deref().unwrap_or(&[]));

        let _ = conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, status, completed,
             start_date, end_date, client_tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                id,
                user_id,
                params.title,
                params.description,
                status.as_sql(),
                completed,
                start_date,
                end_date,
                tags_json,
                now,
            ],
        )?;

        Self::get(conn, &id)?.ok_or_else(|| crate::StoreError::not_found("task", &id))
    }

    /// Get a task by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<Task>> {
        let task = conn
            .query_row("SELECT * FROM tasks WHERE id = ?1", params![id], |row| {
                Ok(task_from_row(row))
            })
            .optional()?;
        Ok(task)
    }

    /// Get several tasks by id, preserving only rows that exist.
    pub fn get_many(conn: &Connection, ids: &[String]) -> Result<Vec<Task>> {
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(task) = Self::get(conn, id)? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Partial update. Returns the updated task, or `None` if not found.
    pub fn update(
        conn: &Connection,
        id: &str,
        updates: &TaskUpdateParams,
    ) -> Result<Option<Task>> {
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref title) = updates.title {
            sets.push("title = ?".to_string());
            values.push(Box::new(title.clone()));
        }
        if let Some(ref desc) = updates.description {
            sets.push("description = ?".to_string());
            values.push(Box::new(desc.clone()));
        }
        if let Some(ref start) = updates.start_date {
            sets.push("start_date = ?".to_string());
            values.push(Box::new(start.clone()));
        }
        if let Some(ref tags) = updates.client_tags {
            sets.push("client_tags = ?".to_string());
            values.push(Box::new(tags_to_json(tags)));
        }

        if let Some(status) = updates.status {
            sets.push("status = ?".to_string());
            values.push(Box::new(status.as_sql().to_string()));
            if status.is_terminal() {
                sets.push("completed = 1".to_string());
                if let Some(ref end) = updates.end_date {
                    sets.push("end_date = ?".to_string());
                    values.push(Box::new(end.clone()));
                } else {
                    // Stamp only when previously empty
                    sets.push("end_date = COALESCE(end_date, ?)".to_string());
                    values.push(Box::new(today_iso()));
                }
            } else {
                sets.push("completed = 0".to_string());
                sets.push("end_date = NULL".to_string());
            }
        } else {
            // completed/end_date are independently writable when no status
            // change rides along
            if let Some(completed) = updates.completed {
                sets.push("completed = ?".to_string());
                values.push(Box::new(completed));
            }
            if let Some(ref end) = updates.end_date {
                sets.push("end_date = ?".to_string());
                values.push(Box::new(end.clone()));
            }
        }

        if sets.is_empty() {
            return Self::get(conn, id);
        }

        sets.push("updated_at = ?".to_string());
        values.push(Box::new(now_iso()));
        values.push(Box::new(id.to_string()));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(AsRef::as_ref).collect();
        let changed = conn.execute(&sql, params_refs.as_slice())?;

        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    /// Delete a task by id. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// List tasks for a user with filtering, newest first.
    pub fn list(conn: &Connection, user_id: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut conditions: Vec<String> = vec!["user_id = ?".to_string()];
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(user_id.to_string())];

        if let Some(status) = filter.status {
            conditions.push("status = ?".to_string());
            values.push(Box::new(status.as_sql().to_string()));
        }
        if let Some(completed) = filter.completed {
            conditions.push("completed = ?".to_string());
            values.push(Box::new(completed));
        }
        if let Some(ref from) = filter.from {
            conditions.push("start_date IS NOT NULL AND start_date >= ?".to_string());
            values.push(Box::new(from.clone()));
        }
        if let Some(ref to) = filter.to {
            conditions.push("start_date IS NOT NULL AND start_date <= ?".to_string());
            values.push(Box::new(to.clone()));
        }
        if let Some(ref tags) = filter.tags {
            if !tags.is_empty() {
                // Overlap: any requested name present in the row's array
                let exists: Vec<String> = tags
                    .iter()
                    .map(|_| {
                        "EXISTS (SELECT 1 FROM json_each(tasks.client_tags) \
                         WHERE json_each.value = ?)"
                            .to_string()
                    })
                    .collect();
                conditions.push(format!("({})", exists.join(" OR ")));
                for tag in tags {
                    values.push(Box::new(tag.clone()));
                }
            }
        }

        let sql = format!(
            "SELECT * FROM tasks WHERE {} ORDER BY created_at DESC",
            conditions.join(" AND ")
        );
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(AsRef::as_ref).collect();
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_refs.as_slice(), |row| Ok(task_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(tasks)
    }

    /// Tasks completed on a given date — input to the summary workflow.
    pub fn list_completed_on(conn: &Connection, user_id: &str, date: &str) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM tasks WHERE user_id = ?1 AND completed = 1 AND end_date = ?2 \
             ORDER BY created_at",
        )?;
        let tasks = stmt
            .query_map(params![user_id, date], |row| Ok(task_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(tasks)
    }

    /// Write a full task record, replacing any existing row with the same id.
    /// Used by backup import; `user_id` is forced to the importing user.
    pub fn upsert_snapshot(conn: &Connection, user_id: &str, task: &Task) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, status, completed,
             start_date, end_date, client_tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                title = excluded.title,
                description = excluded.description,
                status = excluded.status,
                completed = excluded.completed,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                client_tags = excluded.client_tags,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                task.id,
                user_id,
                task.title,
                task.description,
                task.status.as_sql(),
                task.completed,
                task.start_date,
                task.end_date,
                tags_to_json(&task.client_tags),
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Delete all tasks for a user. Returns the number of rows removed.
    pub fn clear(conn: &Connection, user_id: &str) -> Result<usize> {
        let changed = conn.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;
        Ok(changed)
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> Task {
    let status_str: String = row.get_unwrap("status");
    let tags_json: String = row.get_unwrap("client_tags");
    Task {
        id: row.get_unwrap("id"),
        user_id: row.get_unwrap("user_id"),
        title: row.get_unwrap("title"),
        description: row.get_unwrap("description"),
        status: TaskStatus::from_sql(&status_str),
        completed: row.get_unwrap("completed"),
        start_date: row.get_unwrap("start_date"),
        end_date: row.get_unwrap("end_date"),
        client_tags: parse_tags(&tags_json),
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
    use crate::users::UserRepository;

    fn setup() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        let report = bootstrap(&conn).unwrap();
        let user_id = report.default_user_id;
        (conn, user_id)
    }

    fn create_titled(conn: &Connection, user_id: &str, title: &str) -> Task {
        TaskRepository::create(
            conn,
            user_id,
            &TaskCreateParams {
                title: title.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_defaults_to_in_progress() {
        let (conn, user_id) = setup();
        let task = TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Write report".to_string(),
                start_date: Some("2024-01-10".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(task.id.starts_with("task-"));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(!task.completed);
        assert_eq!(task.start_date.as_deref(), Some("2024-01-10"));
        assert!(task.end_date.is_none());
    }

    #[test]
    fn create_with_terminal_status_marks_completed() {
        let (conn, user_id) = setup();
        let task = TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Done already".to_string(),
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(task.completed);
        assert_eq!(task.end_date.as_deref(), Some(today_iso().as_str()));
    }

    #[test]
    fn status_completed_sets_completed_and_stamps_end_date() {
        let (conn, user_id) = setup();
        let task = create_titled(&conn, &user_id, "Task");
        let updated = TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.end_date.as_deref(), Some(today_iso().as_str()));
    }

    #[test]
    fn existing_end_date_is_not_restamped() {
        let (conn, user_id) = setup();
        let task = TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Backdated".to_string(),
                end_date: Some("2024-02-01".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let updated = TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.end_date.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn reverting_status_clears_completed_and_end_date() {
        let (conn, user_id) = setup();
        let task = create_titled(&conn, &user_id, "Task");
        TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();
        let reverted = TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(!reverted.completed);
        assert!(reverted.end_date.is_none());
    }

    #[test]
    fn completed_flag_is_independently_writable() {
        let (conn, user_id) = setup();
        let task = create_titled(&conn, &user_id, "Drifting");
        // No status in the payload: the flag moves alone and can disagree
        // with the status column
        let updated = TaskRepository::update(
            &conn,
            &task.id,
            &TaskUpdateParams {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.status, TaskStatus::InProgress);
    }

    #[test]
    fn update_missing_task_returns_none() {
        let (conn, _) = setup();
        let result = TaskRepository::update(
            &conn,
            "task-missing",
            &TaskUpdateParams {
                title: Some("X".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn delete_task() {
        let (conn, user_id) = setup();
        let task = create_titled(&conn, &user_id, "Delete me");
        assert!(TaskRepository::delete(&conn, &task.id).unwrap());
        assert!(TaskRepository::get(&conn, &task.id).unwrap().is_none());
        assert!(!TaskRepository::delete(&conn, &task.id).unwrap());
    }

    #[test]
    fn list_filters_by_status_and_completed() {
        let (conn, user_id) = setup();
        create_titled(&conn, &user_id, "Open");
        TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Done".to_string(),
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();

        let done = TaskRepository::list(
            &conn,
            &user_id,
            &TaskFilter {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "Done");

        let blocked = TaskRepository::list(
            &conn,
            &user_id,
            &TaskFilter {
                status: Some(TaskStatus::Blocked),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(blocked.is_empty());
    }

    #[test]
    fn list_filters_by_start_date_range() {
        let (conn, user_id) = setup();
        for date in ["2024-01-05", "2024-01-10", "2024-01-20"] {
            TaskRepository::create(
                &conn,
                &user_id,
                &TaskCreateParams {
                    title: date.to_string(),
                    start_date: Some(date.to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        let tasks = TaskRepository::list(
            &conn,
            &user_id,
            &TaskFilter {
                from: Some("2024-01-06".to_string()),
                to: Some("2024-01-15".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "2024-01-10");
    }

    #[test]
    fn list_tag_filter_is_an_overlap_match() {
        let (conn, user_id) = setup();
        TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Acme work".to_string(),
                client_tags: Some(vec!["acme".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Globex work".to_string(),
                client_tags: Some(vec!["globex".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        create_titled(&conn, &user_id, "Untagged");

        let tasks = TaskRepository::list(
            &conn,
            &user_id,
            &TaskFilter {
                tags: Some(vec!["acme".to_string(), "globex".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn list_completed_on_matches_end_date() {
        let (conn, user_id) = setup();
        TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Shipped".to_string(),
                status: Some(TaskStatus::Completed),
                end_date: Some("2024-03-01".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        create_titled(&conn, &user_id, "Still open");

        let tasks = TaskRepository::list_completed_on(&conn, &user_id, "2024-03-01").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Shipped");
        assert!(TaskRepository::list_completed_on(&conn, &user_id, "2024-03-02")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn upsert_snapshot_overwrites_existing_row() {
        let (conn, user_id) = setup();
        let mut task = create_titled(&conn, &user_id, "Original");
        task.title = "Imported".to_string();
        task.completed = true;
        TaskRepository::upsert_snapshot(&conn, &user_id, &task).unwrap();

        let stored = TaskRepository::get(&conn, &task.id).unwrap().unwrap();
        assert_eq!(stored.title, "Imported");
        assert!(stored.completed);
        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn clear_removes_only_this_users_tasks() {
        let (conn, user_id) = setup();
        create_titled(&conn, &user_id, "Mine");
        let other = UserRepository::get_or_create(&conn, "other@x.y", "Other", "member").unwrap();
        create_titled(&conn, &other.id, "Theirs");

        assert_eq!(TaskRepository::clear(&conn, &user_id).unwrap(), 1);
        let remaining = TaskRepository::list(&conn, &other.id, &TaskFilter::default()).unwrap();
        assert_eq!(remaining.len(), 1);
    }
}
