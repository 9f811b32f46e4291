//! CRUD operations for [`User`] records.

use rapport_shared::{UserId, UserSummary};
use rusqlite::{params, ErrorCode, OptionalExtension};

use crate::columns::{ts_from_sql, ts_to_sql, user_id_from_sql};
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user. Fails with [`StoreError::EmailTaken`] when the
    /// email is already registered.
    pub fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, name, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.name,
                    user.email,
                    user.password_hash,
                    ts_to_sql(&user.created_at),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref f, _)
                    if f.code == ErrorCode::ConstraintViolation =>
                {
                    StoreError::EmailTaken(user.email.clone())
                }
                other => StoreError::Sqlite(other),
            })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by id.
    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, email, password_hash, created_at
                 FROM users
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, name, email, password_hash, created_at
                 FROM users
                 WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_exists(&self, id: &UserId) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn user_summary(&self, id: &UserId) -> Result<Option<UserSummary>> {
        let summary = self
            .conn()
            .query_row(
                "SELECT id, name, email FROM users WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    let id_str: String = row.get(0)?;
                    Ok(UserSummary {
                        id: user_id_from_sql(0, &id_str)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(summary)
    }

    /// List all users, oldest registration first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, email, password_hash, created_at
             FROM users
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(4)?;

    Ok(User {
        id: user_id_from_sql(0, &id_str)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: ts_from_sql(4, &created_str)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;

    pub(crate) fn seed_user(db: &Database, name: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            created_at: Utc::now(),
        };
        db.create_user(&user).unwrap();
        user.id
    }

    #[test]
    fn create_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let id = seed_user(&db, "alice");

        let user = db.get_user(&id).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(db.user_exists(&id).unwrap());
        assert_eq!(db.user_summary(&id).unwrap().unwrap().name, "alice");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "alice");

        let again = User {
            id: UserId::new(),
            name: "other alice".into(),
            email: "alice@example.com".into(),
            password_hash: "x".into(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            db.create_user(&again),
            Err(StoreError::EmailTaken(_))
        ));
    }

    #[test]
    fn missing_user() {
        let db = Database::open_in_memory().unwrap();
        let ghost = UserId::new();
        assert!(matches!(db.get_user(&ghost), Err(StoreError::NotFound)));
        assert!(!db.user_exists(&ghost).unwrap());
        assert!(db.user_summary(&ghost).unwrap().is_none());
        assert!(db.find_user_by_email("ghost@example.com").unwrap().is_none());
    }

    #[test]
    fn list_in_registration_order() {
        let db = Database::open_in_memory().unwrap();
        let a = seed_user(&db, "a");
        let b = seed_user(&db, "b");
        let ids: Vec<_> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
