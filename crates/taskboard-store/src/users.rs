//! CRUD operations for [`User`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{decode_uuid, User};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user. The id is generated here, never by the caller.
    ///
    /// `name` is stored as given; trimming and emptiness checks belong to the
    /// request validators.
    pub fn create_user(&self, name: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };

        self.conn().execute(
            "INSERT INTO users (id, name) VALUES (?1, ?2)",
            params![user.id.to_string(), user.name],
        )?;

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by UUID.
    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name FROM users WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(StoreError::classify)
    }

    /// Whether a user with this id exists.
    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List all users, ordered by name (case-insensitive), then by insertion.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name
             FROM users
             ORDER BY name COLLATE NOCASE ASC, rowid ASC",
        )?;

        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Rename a user, returning the stored row. [`StoreError::NotFound`] if
    /// the id is unknown.
    pub fn rename_user(&self, id: Uuid, name: &str) -> Result<User> {
        self.conn()
            .query_row(
                "UPDATE users SET name = ?2 WHERE id = ?1 RETURNING id, name",
                params![id.to_string(), name],
                row_to_user,
            )
            .map_err(StoreError::classify)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a user by UUID. Returns `true` if a row was deleted.
    // ON DELETE CASCADE: the user's tasks go with it
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;

    Ok(User {
        id: decode_uuid(0, &id_str)?,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_then_list() {
        let db = db();
        let ricky = db.create_user("Ricky").unwrap();
        let anna = db.create_user("anna").unwrap();
        let bob = db.create_user("Bob").unwrap();

        assert_ne!(ricky.id, anna.id);
        let names: Vec<_> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(names, vec![anna.id, bob.id, ricky.id]);
    }

    #[test]
    fn duplicate_names_keep_insertion_order() {
        let db = db();
        let first = db.create_user("Sam").unwrap();
        let second = db.create_user("Sam").unwrap();

        let ids: Vec<_> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let db = db();
        assert!(matches!(
            db.get_user(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
        assert!(!db.user_exists(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn rename_user() {
        let db = db();
        let user = db.create_user("Ricky").unwrap();

        let renamed = db.rename_user(user.id, "Rick").unwrap();
        assert_eq!(renamed.id, user.id);
        assert_eq!(renamed.name, "Rick");
        assert_eq!(db.get_user(user.id).unwrap().name, "Rick");

        assert!(matches!(
            db.rename_user(Uuid::new_v4(), "Nobody"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_user_reports_whether_a_row_went_away() {
        let db = db();
        let user = db.create_user("Ricky").unwrap();

        assert!(db.delete_user(user.id).unwrap());
        assert!(!db.delete_user(user.id).unwrap());
        assert!(!db.user_exists(user.id).unwrap());
    }

    #[test]
    fn test_corrupt_id_surfaces_as_sqlite_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute("INSERT INTO users (id, name) VALUES ('garbage', 'Ricky')", [])
            .unwrap();

        let err = db.list_users().unwrap_err();
        assert!(matches!(
            err,
            StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(0, _, _))
        ));
    }
}
