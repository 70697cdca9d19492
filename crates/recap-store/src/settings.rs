//! System settings repository — a flat key-value table with no typing or
//! schema validation on `value`.

use rusqlite::{params, Connection, OptionalExtension};

use recap_core::{now_iso, SystemSetting};

use crate::errors::Result;

/// SQL CRUD for `system_settings`.
pub struct SettingRepository;

impl SettingRepository {
    /// Insert or replace a setting by key. A `None` description preserves
    /// whatever description the row already has.
    pub fn upsert(
        conn: &Connection,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SystemSetting> {
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO system_settings (key, value, description, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                description = COALESCE(excluded.description, system_settings.description),
                updated_at = excluded.updated_at",
            params![key, value, description, now],
        )?;
        Self::get(conn, key)?.ok_or_else(|| crate::StoreError::not_found("system_setting", key))
    }

    /// Get a setting by key.
    pub fn get(conn: &Connection, key: &str) -> Result<Option<SystemSetting>> {
        let setting = conn
            .query_row(
                "SELECT key, value, description, updated_at FROM system_settings WHERE key = ?1",
                params![key],
                |row| Ok(setting_from_row(row)),
            )
            .optional()?;
        Ok(setting)
    }

    /// List all settings, ordered by key.
    pub fn list(conn: &Connection) -> Result<Vec<SystemSetting>> {
        let mut stmt = conn.prepare(
            "SELECT key, value, description, updated_at FROM system_settings ORDER BY key",
        )?;
        let settings = stmt
            .query_map([], |row| Ok(setting_from_row(row)))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(settings)
    }

    /// Delete a setting by key. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM system_settings WHERE key = ?1", params![key])?;
        Ok(changed > 0)
    }
}

fn setting_from_row(row: &rusqlite::Row<'_>) -> SystemSetting {
    SystemSetting {
        key: row.get_unwrap("key"),
        value: row.get_unwrap("value"),
        description: row.get_unwrap("description"),
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

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        bootstrap(&conn).unwrap();
        conn
    }

    #[test]
    fn upsert_replaces_value() {
        let conn = setup();
        SettingRepository::upsert(&conn, "theme", "dark", Some("UI theme")).unwrap();
        let updated = SettingRepository::upsert(&conn, "theme", "light", None).unwrap();
        assert_eq!(updated.value, "light");
        // Missing description preserves the existing one
        assert_eq!(updated.description.as_deref(), Some("UI theme"));
    }

    #[test]
    fn delete_setting() {
        let conn = setup();
        SettingRepository::upsert(&conn, "temp", "1", None).unwrap();
        assert!(SettingRepository::delete(&conn, "temp").unwrap());
        assert!(!SettingRepository::delete(&conn, "temp").unwrap());
        assert!(SettingRepository::get(&conn, "temp").unwrap().is_none());
    }

    #[test]
    fn list_is_ordered_by_key() {
        let conn = setup();
        let settings = SettingRepository::list(&conn).unwrap();
        let keys: Vec<_> = settings.iter().map(|s| s.key.clone()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys.len(), crate::schema::SEED_SETTINGS.len());
        assert_eq!(keys, sorted);
    }

    #[test]
    fn value_is_untyped_text() {
        let conn = setup();
        let stored =
            SettingRepository::upsert(&conn, "anything", "{\"not\": \"validated\"}", None).unwrap();
        assert_eq!(stored.value, "{\"not\": \"validated\"}");
    }
}
