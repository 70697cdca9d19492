//! ISO 8601 time helpers.
//!
//! All timestamps in the database and on the wire are strings: `created_at`
//! and friends carry a full UTC timestamp, `summary_date` / `start_date` /
//! `end_date` carry a bare `YYYY-MM-DD` date.

/// Current UTC timestamp as an ISO 8601 string.
#[must_use]
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Today's UTC date as `YYYY-MM-DD`.
#[must_use]
pub fn today_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Whether a string is a plausible `YYYY-MM-DD` date.
#[must_use]
pub fn is_iso_date(value: &str) -> bool {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
