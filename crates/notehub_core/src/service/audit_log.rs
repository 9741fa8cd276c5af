//! Append-only audit trail.
//!
//! # Responsibility
//! - Record access-relevant actions in the caller's transaction.
//! - Serve raw per-note and per-actor activity listings.
//!
//! # Invariants
//! - No access checks happen here; callers gate note-scoped listings.
//! - Entries are never updated or removed by this component.

use crate::error::CoreResult;
use crate::model::audit::{ActivityRecord, AuditEntry, NewAuditEntry};
use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use log::debug;
use rusqlite::Connection;

/// Audit log component bound to one connection or transaction.
pub struct AuditLog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AuditLog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Appends one entry and returns it as stored.
    pub fn record(&self, entry: NewAuditEntry) -> CoreResult<AuditEntry> {
        let stored = SqliteAuditRepository::new(self.conn).append(&entry)?;
        debug!(
            "event=audit_append module=audit status=ok entry_id={} action={} has_note={}",
            stored.id,
            stored.action,
            stored.note_id.is_some()
        );
        Ok(stored)
    }

    pub fn note_activity(&self, note_id: NoteId) -> CoreResult<Vec<ActivityRecord>> {
        Ok(SqliteAuditRepository::new(self.conn).list_for_note(note_id)?)
    }

    pub fn actor_activity(&self, actor_id: UserId) -> CoreResult<Vec<ActivityRecord>> {
        Ok(SqliteAuditRepository::new(self.conn).list_for_actor(actor_id)?)
    }
}
