//! # taskboard-store
//!
//! SQLite persistence for users and their tasks.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for both tables.
//! Referential integrity between the two (a task's author must exist, and
//! deleting a user deletes its tasks) is enforced by the schema itself.

pub mod database;
pub mod migrations;
pub mod models;
pub mod tasks;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
