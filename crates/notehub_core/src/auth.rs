//! Seam between the request layer and the acting user.
//!
//! Token issuance and verification live outside this crate; the core only
//! needs a way to turn an opaque credential into a registered [`User`].

use crate::error::{CoreError, CoreResult, Missing};
use crate::model::user::{User, UserId};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::debug;
use rusqlite::Connection;
use std::collections::HashMap;

/// Resolves the user behind a request credential.
pub trait CredentialService {
    /// Returns `Unauthenticated` when `token` is unknown or revoked.
    fn current_user(&self, token: &str) -> CoreResult<User>;
}

/// In-memory token table backed by the user store.
pub struct StaticTokenCredentials<'conn> {
    conn: &'conn Connection,
    tokens: HashMap<String, UserId>,
}

impl<'conn> StaticTokenCredentials<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            tokens: HashMap::new(),
        }
    }

    /// Maps `token` to `user_id`, replacing any previous mapping.
    ///
    /// The user must already be registered.
    pub fn insert_token(&mut self, token: impl Into<String>, user_id: UserId) -> CoreResult<()> {
        if SqliteUserRepository::new(self.conn).get_user(user_id)?.is_none() {
            return Err(CoreError::NotFound(Missing::User(user_id)));
        }
        self.tokens.insert(token.into(), user_id);
        Ok(())
    }

    /// Returns whether a mapping was removed.
    pub fn revoke_token(&mut self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }
}

impl CredentialService for StaticTokenCredentials<'_> {
    fn current_user(&self, token: &str) -> CoreResult<User> {
        let Some(user_id) = self.tokens.get(token).copied() else {
            debug!("event=credential_check module=auth status=unknown_token");
            return Err(CoreError::Unauthenticated);
        };

        // A mapped user that no longer resolves is treated like a bad token.
        SqliteUserRepository::new(self.conn)
            .get_user(user_id)?
            .ok_or(CoreError::Unauthenticated)
    }
}
