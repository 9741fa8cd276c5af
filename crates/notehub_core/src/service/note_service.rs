//! Note lifecycle use-case service.
//!
//! # Responsibility
//! - Orchestrate create/update/delete/view on top of access control,
//!   versioning and the audit log.
//! - Provide sharing entry points that record `Share`/`Unshare` entries.
//! - Serve owned, shared-with-me and search listings plus activity queries.
//!
//! # Invariants
//! - Every mutation runs in a single immediate transaction together with its
//!   audit entry.
//! - Every `update` call snapshots, including calls that change no field.
//! - `delete` writes its audit entry before the cascade detaches it.
//! - Listings are ordered by `updated_at DESC`.

use crate::db::write_transaction;
use crate::error::{CoreError, CoreResult, Missing};
use crate::model::audit::{ActivityRecord, AuditAction, NewAuditEntry};
use crate::model::collaborator::{Collaborator, SharedNote};
use crate::model::note::{validate_content, validate_title, Note, NoteChanges, NoteId};
use crate::model::role::{CollaboratorRole, Permission};
use crate::model::user::UserId;
use crate::repo::ensure_schema_ready;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::access_control::AccessControl;
use crate::service::audit_log::AuditLog;
use crate::service::versioning::VersionEngine;
use log::info;
use rusqlite::Connection;

/// Note lifecycle facade over one migrated connection.
pub struct NoteService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NoteService<'conn> {
    /// Creates the service from a connection with all migrations applied.
    pub fn try_new(conn: &'conn Connection) -> CoreResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Access control bound to the same connection.
    pub fn access(&self) -> AccessControl<'conn> {
        AccessControl::new(self.conn)
    }

    /// Versioning engine bound to the same connection.
    pub fn versions(&self) -> VersionEngine<'conn> {
        VersionEngine::new(self.conn)
    }

    /// Creates a note owned by `owner_id`. New notes have no versions.
    pub fn create(&self, owner_id: UserId, title: &str, content: &str) -> CoreResult<Note> {
        validate_title(title)?;
        validate_content(content)?;

        write_transaction(self.conn, |tx| {
            if SqliteUserRepository::new(tx).get_user(owner_id)?.is_none() {
                return Err(CoreError::NotFound(Missing::User(owner_id)));
            }

            let note = SqliteNoteRepository::new(tx).insert_note(owner_id, title, content)?;
            AuditLog::new(tx).record(
                NewAuditEntry::for_note(owner_id, note.id, AuditAction::Create)
                    .with_details(format!("Created note: {}", note.title)),
            )?;

            info!(
                "event=note_create module=notes status=ok note_id={} owner_id={}",
                note.id, owner_id
            );
            Ok(note)
        })
    }

    /// Applies the provided fields after snapshotting the current state.
    pub fn update(
        &self,
        note_id: NoteId,
        editor_id: UserId,
        changes: NoteChanges,
    ) -> CoreResult<Note> {
        changes.validate()?;

        write_transaction(self.conn, |tx| {
            let (note, role) = AccessControl::new(tx).authorize(note_id, editor_id, Permission::Write)?;
            let change = VersionEngine::new(tx).apply_change(&note, editor_id, &changes)?;

            AuditLog::new(tx).record(
                NewAuditEntry::for_note(editor_id, note_id, AuditAction::Update)
                    .with_details("Updated note"),
            )?;

            info!(
                "event=note_update module=notes status=ok note_id={} role={} version={} title_changed={} content_changed={}",
                note_id,
                role,
                change.version.version_number,
                changes.title.is_some(),
                changes.content.is_some()
            );
            Ok(change.note)
        })
    }

    /// Deletes the note with its versions and grants. Owner only.
    ///
    /// Audit entries that referenced the note remain, without the reference.
    pub fn delete(&self, note_id: NoteId, owner_id: UserId) -> CoreResult<()> {
        write_transaction(self.conn, |tx| {
            let (note, _) = AccessControl::new(tx).authorize(note_id, owner_id, Permission::Manage)?;

            AuditLog::new(tx).record(
                NewAuditEntry::for_note(owner_id, note_id, AuditAction::Delete)
                    .with_details(format!("Deleted note: {}", note.title)),
            )?;
            let summary = SqliteNoteRepository::new(tx).delete_note_cascade(note_id)?;

            info!(
                "event=note_delete module=notes status=ok note_id={} versions_removed={} grants_removed={} audit_detached={}",
                note_id,
                summary.versions_removed,
                summary.grants_removed,
                summary.audit_entries_detached
            );
            Ok(())
        })
    }

    /// Reads the note and records a `View` entry for every successful read.
    pub fn view(&self, note_id: NoteId, viewer_id: UserId) -> CoreResult<Note> {
        write_transaction(self.conn, |tx| {
            let (note, _) = AccessControl::new(tx).authorize(note_id, viewer_id, Permission::Read)?;
            AuditLog::new(tx).record(NewAuditEntry::for_note(
                viewer_id,
                note_id,
                AuditAction::View,
            ))?;
            Ok(note)
        })
    }

    /// Grants `role` to the user registered under `email` and records `Share`.
    pub fn share(
        &self,
        note_id: NoteId,
        owner_id: UserId,
        email: &str,
        role: CollaboratorRole,
    ) -> CoreResult<Collaborator> {
        write_transaction(self.conn, |tx| {
            let grant = AccessControl::new(tx).grant(note_id, owner_id, email, role)?;
            AuditLog::new(tx).record(
                NewAuditEntry::for_note(owner_id, note_id, AuditAction::Share)
                    .with_details(format!("Shared with {} as {}", grant.email, grant.role)),
            )?;
            Ok(grant)
        })
    }

    /// Like [`NoteService::share`] with the role given by name.
    ///
    /// Unknown role names are rejected as invalid input.
    pub fn share_with_role_name(
        &self,
        note_id: NoteId,
        owner_id: UserId,
        email: &str,
        role: &str,
    ) -> CoreResult<Collaborator> {
        let role = CollaboratorRole::parse(role)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown collaborator role `{role}`")))?;
        self.share(note_id, owner_id, email, role)
    }

    /// Removes the grant of `user_id` and records `Unshare`.
    pub fn unshare(&self, note_id: NoteId, owner_id: UserId, user_id: UserId) -> CoreResult<()> {
        write_transaction(self.conn, |tx| {
            AccessControl::new(tx).revoke(note_id, owner_id, user_id)?;
            AuditLog::new(tx).record(
                NewAuditEntry::for_note(owner_id, note_id, AuditAction::Unshare)
                    .with_details(format!("Removed collaborator {user_id}")),
            )?;
            Ok(())
        })
    }

    pub fn list_collaborators(
        &self,
        note_id: NoteId,
        user_id: UserId,
    ) -> CoreResult<Vec<Collaborator>> {
        self.access().list_collaborators(note_id, user_id)
    }

    /// Notes owned by the caller, optionally filtered like [`NoteService::search`].
    ///
    /// A missing or empty `query` returns every owned note.
    pub fn list_owned(&self, user_id: UserId, query: Option<&str>) -> CoreResult<Vec<Note>> {
        let notes = SqliteNoteRepository::new(self.conn).list_owned(user_id)?;
        match query.and_then(normalize_query) {
            Some(needle) => Ok(filter_matching(notes, &needle)),
            None => Ok(notes),
        }
    }

    /// Notes shared with the caller, each with the granted role.
    pub fn list_shared(&self, user_id: UserId) -> CoreResult<Vec<SharedNote>> {
        Ok(SqliteNoteRepository::new(self.conn).list_shared(user_id)?)
    }

    /// Owned and shared notes whose title or content contains `query`,
    /// compared case-insensitively. Whitespace in `query` is matched as is.
    pub fn search(&self, user_id: UserId, query: &str) -> CoreResult<Vec<Note>> {
        let needle = normalize_query(query)
            .ok_or_else(|| CoreError::InvalidInput("search query must not be empty".to_string()))?;
        let notes = SqliteNoteRepository::new(self.conn).list_accessible(user_id)?;
        Ok(filter_matching(notes, &needle))
    }

    /// Audit entries for the note, newest first. Requires read access.
    pub fn note_activity(&self, note_id: NoteId, user_id: UserId) -> CoreResult<Vec<ActivityRecord>> {
        self.access().authorize(note_id, user_id, Permission::Read)?;
        AuditLog::new(self.conn).note_activity(note_id)
    }

    /// Audit entries written by the caller, newest first.
    pub fn user_activity(&self, user_id: UserId) -> CoreResult<Vec<ActivityRecord>> {
        AuditLog::new(self.conn).actor_activity(user_id)
    }
}

fn normalize_query(query: &str) -> Option<String> {
    if query.is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

fn filter_matching(notes: Vec<Note>, needle: &str) -> Vec<Note> {
    notes
        .into_iter()
        .filter(|note| {
            note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
        })
        .collect()
}
