//! v001 -- Initial schema creation.
//!
//! Creates the `users` and `tasks` tables. Every task references its author
//! with `ON DELETE CASCADE`, so removing a user removes its tasks in the same
//! statement.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id   TEXT PRIMARY KEY NOT NULL,           -- UUID v4
    name TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Tasks
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tasks (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    title      TEXT NOT NULL,
    author_id  TEXT NOT NULL,                 -- FK -> users(id)
    completed  INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL,                 -- RFC-3339, microseconds, UTC
    updated_at TEXT NOT NULL,                 -- RFC-3339, microseconds, UTC

    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_author_created
    ON tasks(author_id, created_at ASC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
