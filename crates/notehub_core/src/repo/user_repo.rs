//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness is enforced by storage and surfaced as
//!   `RepoError::Duplicate("user email")`.

use crate::model::user::{User, UserId};
use crate::repo::{parse_uuid, unique_violation_as, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT uuid, email, created_at FROM users";

/// Repository interface for registered identities.
pub trait UserRepository {
    /// Inserts a new user with a generated id.
    fn insert_user(&self, email: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Exact-match lookup on the stored (trimmed) email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, email: &str) -> RepoResult<User> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO users (uuid, email) VALUES (?1, ?2);",
                params![id.to_string(), email],
            )
            .map_err(unique_violation_as("user email"))?;

        self.get_user(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user {id} missing after insert"))
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?;
        user.map(parse_user_columns).transpose()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email],
                read_user_columns,
            )
            .optional()?;
        user.map(parse_user_columns).transpose()
    }
}

type UserColumns = (String, String, i64);

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok((row.get("uuid")?, row.get("email")?, row.get("created_at")?))
}

fn parse_user_columns((uuid, email, created_at): UserColumns) -> RepoResult<User> {
    Ok(User {
        id: parse_uuid(&uuid, "users.uuid")?,
        email,
        created_at,
    })
}
