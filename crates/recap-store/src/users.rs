//! User repository.
//!
//! Nearly every handler starts by resolving the default user through
//! [`UserRepository::get_or_create`] — the system is single-tenant by
//! construction and none of this generalizes to real multi-tenancy.

use rusqlite::{params, Connection, OptionalExtension};

use recap_core::ids::USER_PREFIX;
use recap_core::{generate_id, now_iso, User};

use crate::errors::Result;

/// SQL CRUD for `users`.
pub struct UserRepository;

impl UserRepository {
    /// Look up a user by email, creating the record if absent.
    pub fn get_or_create(conn: &Connection, email: &str, name: &str, role: &str) -> Result<User> {
        if let Some(user) = Self::get_by_email(conn, email)? {
            return Ok(user);
        }
        let id = generate_id(USER_PREFIX);
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO users (id, email, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, email, name, role, now],
        )?;
        Ok(User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            created_at: now,
        })
    }

    /// Get a user by email.
    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, email, name, role, created_at FROM users WHERE email = ?1",
                params![email],
                |row| Ok(user_from_row(row)),
            )
            .optional()?;
        Ok(user)
    }

    /// List all users, oldest first.
    pub fn list(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt =
            conn.prepare("SELECT id, email, name, role, created_at FROM users ORDER BY created_at")?;
        let users = stmt
            .query_map([], |row| Ok(user_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(users)
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> User {
    User {
        id: row.get_unwrap("id"),
        email: row.get_unwrap("email"),
        name: row.get_unwrap("name"),
        role: row.get_unwrap("role"),
        created_at: row.get_unwrap("created_at"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
