//! # recap-core
//!
//! Foundation types and utilities shared by the recap crates.
//!
//! This crate provides the vocabulary the rest of the workspace depends on:
//!
//! - **Domain records**: [`Task`], [`ClientTag`], [`DailySummary`],
//!   [`SystemSetting`], [`User`]
//! - **Status enum**: [`TaskStatus`] with the terminal-state rules the task
//!   handlers apply
//! - **Prefixed IDs**: time-ordered UUID v7 IDs with entity prefixes
//!   (`task-…`, `tag-…`, `sum-…`, `user-…`)
//! - **Time helpers**: ISO 8601 timestamp and date formatting

#![deny(unsafe_code)]

pub mod ids;
pub mod time;
pub mod types;

pub use ids::generate_id;
pub use time::{is_iso_date, now_iso, today_iso};
pub use types::{
    ClientTag, DailySummary, SystemSetting, Task, TaskStatus, User, BACKUP_VERSION,
    DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, DEFAULT_USER_ROLE,
};
