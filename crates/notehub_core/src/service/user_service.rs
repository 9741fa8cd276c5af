//! User registration and lookup.
//!
//! # Invariants
//! - Stored emails are trimmed and match the `local@domain.tld` shape.
//! - A second registration of the same email fails with `Conflict`.

use crate::error::{CoreError, CoreResult, Missing};
use crate::model::user::{normalize_email, User, UserId};
use crate::repo::ensure_schema_ready;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::info;
use rusqlite::Connection;

pub struct UserService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserService<'conn> {
    /// Creates the service from a connection with all migrations applied.
    pub fn try_new(conn: &'conn Connection) -> CoreResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub fn register(&self, email: &str) -> CoreResult<User> {
        let email = normalize_email(email)
            .ok_or_else(|| CoreError::InvalidInput("email is malformed".to_string()))?;
        let user = SqliteUserRepository::new(self.conn).insert_user(&email)?;
        info!(
            "event=user_register module=users status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    pub fn get(&self, user_id: UserId) -> CoreResult<User> {
        SqliteUserRepository::new(self.conn)
            .get_user(user_id)?
            .ok_or(CoreError::NotFound(Missing::User(user_id)))
    }

    /// Lookup by email; the input is trimmed before matching.
    pub fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = normalize_email(email)
            .ok_or_else(|| CoreError::InvalidInput("email is malformed".to_string()))?;
        Ok(SqliteUserRepository::new(self.conn).find_by_email(&email)?)
    }
}
