//! Prefixed, time-ordered entity IDs.
//!
//! Every record gets a `{prefix}-{uuidv7}` ID. UUID v7 keeps IDs sortable by
//! creation time, which makes `ORDER BY id` a usable recency ordering in
//! ad-hoc queries without an extra index.

use uuid::Uuid;

/// ID prefix for task records.
pub const TASK_PREFIX: &str = "task";
/// ID prefix for client tag records.
pub const TAG_PREFIX: &str = "tag";
/// ID prefix for daily summary records.
pub const SUMMARY_PREFIX: &str = "sum";
/// ID prefix for user records.
pub const USER_PREFIX: &str = "user";

/// Generate a prefixed UUID v7 ID.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_prefix() {
        let id = generate_id(TASK_PREFIX);
        assert!(id.starts_with("task-"));
        // prefix + dash + 36-char uuid
        assert_eq!(id.len(), "task-".len() + 36);
    }

    #[test]
    fn sequential_ids_sort_by_creation_order() {
        let first = generate_id(SUMMARY_PREFIX);
        let second = generate_id(SUMMARY_PREFIX);
        assert!(first < second);
    }
}
