//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod generate;
pub mod summaries;
pub mod tags;
pub mod tasks;

use rusqlite::Connection;

use recap_core::{User, DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, DEFAULT_USER_ROLE};
use recap_store::UserRepository;

use crate::error::ApiError;

/// Resolve the default user, creating the record on first use. Every
/// non-admin handler starts here.
pub(crate) fn default_user(conn: &Connection) -> Result<User, ApiError> {
    Ok(UserRepository::get_or_create(
        conn,
        DEFAULT_USER_EMAIL,
        DEFAULT_USER_NAME,
        DEFAULT_USER_ROLE,
    )?)
}

/// 400 unless `value` is a calendar-valid `YYYY-MM-DD` date.
pub(crate) fn require_iso_date(field: &str, value: &str) -> Result<(), ApiError> {
    if recap_core::is_iso_date(value) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "{field} must be a YYYY-MM-DD date"
        )))
    }
}
