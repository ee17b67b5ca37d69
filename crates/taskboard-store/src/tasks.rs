//! CRUD operations for [`Task`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use taskboard_shared::TaskPatch;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{self, decode_timestamp, decode_uuid, encode_timestamp, Task};

const TASK_COLUMNS: &str = "id, title, author_id, completed, created_at, updated_at";

impl Database {
    /// Insert a task owned by `author_id`.
    ///
    /// Id and both timestamps are assigned here. If the author does not exist
    /// the foreign key rejects the row and [`StoreError::ForeignKey`] is
    /// returned; nothing is written.
    pub fn create_task(&self, author_id: Uuid, title: &str) -> Result<Task> {
        let now = models::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author_id,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        self.conn()
            .execute(
                "INSERT INTO tasks (id, title, author_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task.id.to_string(),
                    task.title,
                    task.author_id.to_string(),
                    encode_timestamp(&task.created_at),
                    encode_timestamp(&task.updated_at),
                ],
            )
            .map_err(StoreError::classify)?;

        Ok(task)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task> {
        self.conn()
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
                row_to_task,
            )
            .map_err(StoreError::classify)
    }

    /// Tasks of one user, oldest first. Rows created within the same
    /// microsecond keep their insertion order.
    pub fn list_tasks_for_user(&self, author_id: Uuid) -> Result<Vec<Task>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE author_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;

        let rows = stmt.query_map(params![author_id.to_string()], row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    pub fn count_tasks_for_user(&self, author_id: Uuid) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE author_id = ?1",
            params![author_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Apply the fields present in `patch` and move `updated_at` to
    /// `updated_at` (or keep the stored value if it is already later).
    ///
    /// Single statement: either the whole patch lands or nothing does.
    pub fn update_task(
        &self,
        id: Uuid,
        patch: &TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Task> {
        self.conn()
            .query_row(
                &format!(
                    "UPDATE tasks
                     SET title      = COALESCE(?2, title),
                         completed  = COALESCE(?3, completed),
                         updated_at = MAX(updated_at, ?4)
                     WHERE id = ?1
                     RETURNING {TASK_COLUMNS}"
                ),
                params![
                    id.to_string(),
                    patch.title,
                    patch.completed,
                    encode_timestamp(&updated_at),
                ],
                row_to_task,
            )
            .map_err(StoreError::classify)
    }

    /// Delete a task by UUID. Returns `true` if a row was deleted.
    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let id_str: String = row.get(0)?;
    let title: String = row.get(1)?;
    let author_str: String = row.get(2)?;
    let completed: bool = row.get(3)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    Ok(Task {
        id: decode_uuid(0, &id_str)?,
        title,
        author_id: decode_uuid(2, &author_str)?,
        completed,
        created_at: decode_timestamp(4, &created_str)?,
        updated_at: decode_timestamp(5, &updated_str)?,
    })
}
