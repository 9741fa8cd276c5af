//! Note access control.
//!
//! # Responsibility
//! - Resolve the effective role of a user on a note.
//! - Enforce minimum-permission gates before reads and mutations.
//! - Create, update and remove collaborator grants on behalf of the owner.
//!
//! # Invariants
//! - Ownership is read from the note row and can never be granted.
//! - A missing note yields `NotFound`; an unrelated caller gets `AccessDenied`;
//!   an insufficient role gets `Forbidden`.
//! - Grant writes are single-statement upserts, so re-sharing never duplicates.

use crate::db::write_transaction;
use crate::error::{CoreError, CoreResult, Missing};
use crate::model::collaborator::Collaborator;
use crate::model::note::{Note, NoteId};
use crate::model::role::{CollaboratorRole, Permission, Role};
use crate::model::user::{normalize_email, UserId};
use crate::repo::collaborator_repo::{CollaboratorRepository, SqliteCollaboratorRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::{debug, info};
use rusqlite::Connection;

/// Access control component bound to one connection or transaction.
pub struct AccessControl<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AccessControl<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Returns the caller's effective role on the note.
    pub fn resolve(&self, note_id: NoteId, user_id: UserId) -> CoreResult<Role> {
        self.load_with_role(note_id, user_id).map(|(_, role)| role)
    }

    /// Succeeds for `Owner` and `Editor`.
    pub fn require_edit(&self, note_id: NoteId, user_id: UserId) -> CoreResult<Role> {
        self.authorize(note_id, user_id, Permission::Write)
            .map(|(_, role)| role)
    }

    /// Succeeds for `Owner` only.
    pub fn require_owner(&self, note_id: NoteId, user_id: UserId) -> CoreResult<()> {
        self.authorize(note_id, user_id, Permission::Manage)
            .map(|_| ())
    }

    /// Loads the note and checks that the caller's role allows `required`.
    ///
    /// Returns the note as currently stored together with the resolved role.
    pub fn authorize(
        &self,
        note_id: NoteId,
        user_id: UserId,
        required: Permission,
    ) -> CoreResult<(Note, Role)> {
        let (note, role) = self.load_with_role(note_id, user_id)?;
        if !role.allows(required) {
            debug!(
                "event=access_check module=access status=forbidden note_id={} user_id={} role={} required={}",
                note_id, user_id, role, required
            );
            return Err(CoreError::Forbidden {
                note_id,
                role,
                required,
            });
        }
        Ok((note, role))
    }

    /// Grants `role` on the note to the user registered under `target_email`.
    ///
    /// Re-granting to an existing collaborator overwrites the role in place.
    pub fn grant(
        &self,
        note_id: NoteId,
        owner_id: UserId,
        target_email: &str,
        role: CollaboratorRole,
    ) -> CoreResult<Collaborator> {
        write_transaction(self.conn, |tx| {
            let (note, _) = AccessControl::new(tx).authorize(note_id, owner_id, Permission::Manage)?;

            let email = normalize_email(target_email).ok_or_else(|| {
                CoreError::InvalidInput("collaborator email is malformed".to_string())
            })?;
            let target = SqliteUserRepository::new(tx)
                .find_by_email(&email)?
                .ok_or(CoreError::NotFound(Missing::UserEmail(email)))?;

            if target.id == note.owner_id {
                return Err(CoreError::InvalidOperation(
                    "cannot add the note owner as a collaborator".to_string(),
                ));
            }

            let grant = SqliteCollaboratorRepository::new(tx).upsert_grant(note_id, target.id, role)?;
            info!(
                "event=grant module=access status=ok note_id={} user_id={} role={}",
                note_id, target.id, role
            );
            Ok(grant)
        })
    }

    /// Removes the grant held by `target_user` on the note.
    pub fn revoke(&self, note_id: NoteId, owner_id: UserId, target_user: UserId) -> CoreResult<()> {
        write_transaction(self.conn, |tx| {
            AccessControl::new(tx).authorize(note_id, owner_id, Permission::Manage)?;

            let removed = SqliteCollaboratorRepository::new(tx).delete_grant(note_id, target_user)?;
            if !removed {
                return Err(CoreError::NotFound(Missing::Collaborator {
                    note_id,
                    user_id: target_user,
                }));
            }
            info!(
                "event=revoke module=access status=ok note_id={} user_id={}",
                note_id, target_user
            );
            Ok(())
        })
    }

    /// Lists grants on the note. Any role may read the collaborator list.
    pub fn list_collaborators(
        &self,
        note_id: NoteId,
        user_id: UserId,
    ) -> CoreResult<Vec<Collaborator>> {
        self.authorize(note_id, user_id, Permission::Read)?;
        Ok(SqliteCollaboratorRepository::new(self.conn).list_for_note(note_id)?)
    }

    fn load_with_role(&self, note_id: NoteId, user_id: UserId) -> CoreResult<(Note, Role)> {
        let note = SqliteNoteRepository::new(self.conn)
            .get_note(note_id)?
            .ok_or(CoreError::NotFound(Missing::Note(note_id)))?;

        if note.owner_id == user_id {
            return Ok((note, Role::Owner));
        }

        match SqliteCollaboratorRepository::new(self.conn).get_role(note_id, user_id)? {
            Some(role) => Ok((note, Role::from(role))),
            None => {
                debug!(
                    "event=access_check module=access status=denied note_id={} user_id={}",
                    note_id, user_id
                );
                Err(CoreError::AccessDenied(note_id))
            }
        }
    }
}
