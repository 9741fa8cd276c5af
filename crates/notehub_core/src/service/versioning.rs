//! Versioning engine: snapshot-on-write and restore-as-new-version.
//!
//! # Responsibility
//! - Persist the pre-change state of a note before any content change.
//! - List and fetch snapshots for readers of the note.
//! - Restore a snapshot by recording the current state first, then copying
//!   the snapshot values back onto the note.
//!
//! # Invariants
//! - A version always holds the state immediately prior to the change that
//!   produced it.
//! - Snapshot and content write commit together or not at all.
//! - Numbers are per note, start at 1, and the next number is `max + 1`.
//!   Restores never delete, renumber or rewind versions.

use crate::db::write_transaction;
use crate::error::{CoreError, CoreResult, Missing};
use crate::model::audit::{AuditAction, NewAuditEntry};
use crate::model::note::{Note, NoteChanges, NoteId};
use crate::model::role::Permission;
use crate::model::user::UserId;
use crate::model::version::NoteVersion;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::version_repo::{NewVersion, SqliteVersionRepository, VersionRepository};
use crate::repo::RepoError;
use crate::service::access_control::AccessControl;
use crate::service::audit_log::AuditLog;
use log::{info, warn};
use rusqlite::Connection;

/// Result of one snapshot-then-apply step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedChange {
    /// Note state after the change was applied.
    pub note: Note,
    /// Snapshot of the state before the change.
    pub version: NoteVersion,
}

/// Versioning component bound to one connection or transaction.
pub struct VersionEngine<'conn> {
    conn: &'conn Connection,
}

impl<'conn> VersionEngine<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Stores `note`'s current title/content as the next version.
    ///
    /// `note` must be the state read inside the same transaction that will
    /// apply the change. A concurrent writer that claimed the same number
    /// makes the insert fail on the unique `(note, version_number)` key; the
    /// number is recomputed once before the race is reported as `Conflict`.
    pub fn snapshot_before_change(&self, note: &Note, editor_id: UserId) -> CoreResult<NoteVersion> {
        write_transaction(self.conn, |tx| {
            insert_next_version(&SqliteVersionRepository::new(tx), note, editor_id)
        })
    }

    /// Snapshots `note`, then writes `changes` on top of it.
    ///
    /// Always produces a version, even when `changes` is empty.
    pub fn apply_change(
        &self,
        note: &Note,
        editor_id: UserId,
        changes: &NoteChanges,
    ) -> CoreResult<VersionedChange> {
        write_transaction(self.conn, |tx| {
            let version = VersionEngine::new(tx).snapshot_before_change(note, editor_id)?;

            let mut next = note.clone();
            changes.apply_to(&mut next);
            let note = SqliteNoteRepository::new(tx).write_content(
                note.id,
                next.title.as_str(),
                next.content.as_str(),
            )?;

            Ok(VersionedChange { note, version })
        })
    }

    /// All versions of the note, highest number first. Requires read access.
    pub fn list_versions(&self, note_id: NoteId, user_id: UserId) -> CoreResult<Vec<NoteVersion>> {
        AccessControl::new(self.conn).authorize(note_id, user_id, Permission::Read)?;
        Ok(SqliteVersionRepository::new(self.conn).list_versions(note_id)?)
    }

    /// One version by number. Requires read access.
    pub fn get_version(
        &self,
        note_id: NoteId,
        version_number: u32,
        user_id: UserId,
    ) -> CoreResult<NoteVersion> {
        AccessControl::new(self.conn).authorize(note_id, user_id, Permission::Read)?;
        self.load_version(note_id, version_number)
    }

    /// Copies the snapshot of `version_number` back onto the note.
    ///
    /// The pre-restore state is stored as a new version first, so a restore
    /// can itself be undone by restoring that version later.
    pub fn restore(
        &self,
        note_id: NoteId,
        version_number: u32,
        editor_id: UserId,
    ) -> CoreResult<Note> {
        write_transaction(self.conn, |tx| {
            let (note, _) = AccessControl::new(tx).authorize(note_id, editor_id, Permission::Write)?;
            let engine = VersionEngine::new(tx);
            let target = engine.load_version(note_id, version_number)?;

            let changes = NoteChanges {
                title: Some(target.title_snapshot),
                content: Some(target.content_snapshot),
            };
            let change = engine.apply_change(&note, editor_id, &changes)?;

            AuditLog::new(tx).record(
                NewAuditEntry::for_note(editor_id, note_id, AuditAction::Restore)
                    .with_details(format!("Restored to version {version_number}")),
            )?;

            info!(
                "event=note_restore module=versioning status=ok note_id={} restored_version={} snapshot_version={}",
                note_id, version_number, change.version.version_number
            );
            Ok(change.note)
        })
    }

    fn load_version(&self, note_id: NoteId, version_number: u32) -> CoreResult<NoteVersion> {
        SqliteVersionRepository::new(self.conn)
            .get_version(note_id, version_number)?
            .ok_or(CoreError::NotFound(Missing::Version {
                note_id,
                version_number,
            }))
    }
}

/// Inserts `note`'s state as `max + 1`, recomputing once on a number clash.
fn insert_next_version(
    versions: &impl VersionRepository,
    note: &Note,
    editor_id: UserId,
) -> CoreResult<NoteVersion> {
    let mut retried = false;
    loop {
        let version_number = versions.max_version_number(note.id)? + 1;
        let snapshot = NewVersion {
            note_id: note.id,
            version_number,
            title_snapshot: note.title.as_str(),
            content_snapshot: note.content.as_str(),
            editor_id,
        };

        match versions.insert_version(&snapshot) {
            Ok(version) => return Ok(version),
            Err(RepoError::Duplicate(_)) if !retried => {
                warn!(
                    "event=version_snapshot module=versioning status=retry note_id={} version={}",
                    note.id, version_number
                );
                retried = true;
            }
            Err(RepoError::Duplicate(_)) => {
                return Err(CoreError::Conflict(format!(
                    "concurrent version write on note {}",
                    note.id
                )));
            }
            Err(err) => return Err(err.into()),
        }
    }
}
