//! Client tag repository.
//!
//! Tags are a pure lookup table. Task rows reference tags by *name* with no
//! foreign key, so deleting a tag succeeds even while tasks still carry the
//! name — intentional, not a bug to fix.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use recap_core::ids::TAG_PREFIX;
use recap_core::{generate_id, now_iso, ClientTag};

use crate::errors::Result;

/// Fields accepted when creating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagCreateParams {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Fields accepted on a partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagUpdateParams {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// SQL CRUD for `client_tags`.
pub struct TagRepository;

impl TagRepository {
    /// Create a tag. Callers should check [`Self::get_by_name`] first; the
    /// UNIQUE constraint is the backstop.
    pub fn create(conn: &Connection, params: &TagCreateParams) -> Result<ClientTag> {
        let id = generate_id(TAG_PREFIX);
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO client_tags (id, name, color, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, params.name, params.color, params.description, now],
        )?;
        Ok(ClientTag {
            id,
            name: params.name.clone(),
            color: params.color.clone(),
            description: params.description.clone(),
            created_at: now,
        })
    }

    /// Get a tag by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<ClientTag>> {
        let tag = conn
            .query_row(
                "SELECT * FROM client_tags WHERE id = ?1",
                params![id],
                |row| Ok(tag_from_row(row)),
            )
            .optional()?;
        Ok(tag)
    }

    /// Get a tag by its unique name.
    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<ClientTag>> {
        let tag = conn
            .query_row(
                "SELECT * FROM client_tags WHERE name = ?1",
                params![name],
                |row| Ok(tag_from_row(row)),
            )
            .optional()?;
        Ok(tag)
    }

    /// List all tags, alphabetically.
    pub fn list(conn: &Connection) -> Result<Vec<ClientTag>> {
        let mut stmt = conn.prepare("SELECT * FROM client_tags ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| Ok(tag_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(tags)
    }

    /// Partial update. Returns the updated tag, or `None` if not found.
    pub fn update(
        conn: &Connection,
        id: &str,
        updates: &TagUpdateParams,
    ) -> Result<Option<ClientTag>> {
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref name) = updates.name {
            sets.push("name = ?".to_string());
            values.push(Box::new(name.clone()));
        }
        if let Some(ref color) = updates.color {
            sets.push("color = ?".to_string());
            values.push(Box::new(color.clone()));
        }
        if let Some(ref desc) = updates.description {
            sets.push("description = ?".to_string());
            values.push(Box::new(desc.clone()));
        }

        if sets.is_empty() {
            return Self::get(conn, id);
        }

        values.push(Box::new(id.to_string()));
        let sql = format!("UPDATE client_tags SET {} WHERE id = ?", sets.join(", "));
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(AsRef::as_ref).collect();
        let changed = conn.execute(&sql, params_refs.as_slice())?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    /// Delete a tag by id. Task rows referencing the name are left alone.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM client_tags WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn tag_from_row(row: &rusqlite::Row<'_>) -> ClientTag {
    ClientTag {
        id: row.get_unwrap("id"),
        name: row.get_unwrap("name"),
        color: row.get_unwrap("color"),
        description: row.get_unwrap("description"),
        created_at: row.get_unwrap("created_at"),
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
    use crate::tasks::{TaskCreateParams, TaskRepository};

    fn setup() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        let report = bootstrap(&conn).unwrap();
        (conn, report.default_user_id)
    }

    #[test]
    fn create_and_list() {
        let (conn, _) = setup();
        TagRepository::create(
            &conn,
            &TagCreateParams {
                name: "acme".to_string(),
                color: Some("#ff0000".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        TagRepository::create(
            &conn,
            &TagCreateParams {
                name: "globex".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let tags = TagRepository::list(&conn).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "acme");
    }

    #[test]
    fn duplicate_name_violates_unique_constraint() {
        let (conn, _) = setup();
        let params = TagCreateParams {
            name: "acme".to_string(),
            ..Default::default()
        };
        TagRepository::create(&conn, &params).unwrap();
        assert!(TagRepository::create(&conn, &params).is_err());
    }

    #[test]
    fn update_color() {
        let (conn, _) = setup();
        let tag = TagRepository::create(
            &conn,
            &TagCreateParams {
                name: "acme".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let updated = TagRepository::update(
            &conn,
            &tag.id,
            &TagUpdateParams {
                color: Some("#00ff00".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn delete_succeeds_while_tasks_reference_the_name() {
        let (conn, user_id) = setup();
        let tag = TagRepository::create(
            &conn,
            &TagCreateParams {
                name: "acme".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let task = TaskRepository::create(
            &conn,
            &user_id,
            &TaskCreateParams {
                title: "Acme work".to_string(),
                client_tags: Some(vec!["acme".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(TagRepository::delete(&conn, &tag.id).unwrap());
        // Task row keeps the now-dangling name
        let task = TaskRepository::get(&conn, &task.id).unwrap().unwrap();
        assert_eq!(task.client_tags, vec!["acme".to_string()]);
    }
}
