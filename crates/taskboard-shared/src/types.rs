use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An owner of tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Generated by the store at insert time.
    pub id: Uuid,
    /// Display name, stored trimmed and never empty.
    pub name: String,
}

/// A task belonging to exactly one [`User`].
///
/// Serialized with camelCase field names (`authorId`, `createdAt`, ...), which
/// is the JSON shape the HTTP API speaks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    /// Owning user. Fixed at creation.
    pub author_id: Uuid,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Advanced on every accepted update, never moves backwards.
    pub updated_at: DateTime<Utc>,
}
