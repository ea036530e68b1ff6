//! User repository contracts and SQLite implementation.
//!
//! Stores account metadata only. The password hash is opaque text produced
//! by the identity service.

use crate::model::user::User;
use crate::model::UserId;
use crate::repo::{ensure_schema_ready, map_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, email, password_hash, created_at FROM users";

pub trait UserRepository {
    fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: &str,
    ) -> RepoResult<UserId>;
    fn find_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Case-insensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn update_username(&self, id: UserId, username: &str) -> RepoResult<()>;
    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: &str,
    ) -> RepoResult<UserId> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![username, email, password_hash, created_at],
            )
            .map_err(|err| map_unique_violation(err, "users"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"),
                [email],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn update_username(&self, id: UserId, username: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET username = ?2 WHERE id = ?1;",
            params![id, username],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn update_password_hash(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?2 WHERE id = ?1;",
            params![id, password_hash],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}
