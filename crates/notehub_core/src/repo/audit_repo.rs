//! Audit log repository contracts and SQLite implementation.
//!
//! # Invariants
//! - The repository only appends; the single mutation of existing rows is the
//!   note-reference detach performed by the note delete cascade.
//! - Listings are newest first (`id DESC`).

use crate::model::audit::{ActivityRecord, AuditAction, AuditEntry, NewAuditEntry};
use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::repo::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    a.id,
    a.actor_uuid,
    a.note_uuid,
    a.action,
    a.details,
    a.created_at,
    u.email AS actor_email,
    n.title AS note_title
FROM audit_log a
INNER JOIN users u ON u.uuid = a.actor_uuid
LEFT JOIN notes n ON n.uuid = a.note_uuid";

/// Repository interface for the audit trail.
pub trait AuditRepository {
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditEntry>;
    /// Entries referencing one note, newest first.
    fn list_for_note(&self, note_id: NoteId) -> RepoResult<Vec<ActivityRecord>>;
    /// Entries written by one actor, newest first.
    fn list_for_actor(&self, actor_id: UserId) -> RepoResult<Vec<ActivityRecord>>;
}

/// SQLite-backed audit repository.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_activity(&self, filter_sql: &str, key: String) -> RepoResult<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE {filter_sql}
             ORDER BY a.id DESC;"
        ))?;
        let mut rows = stmt.query([key])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(ActivityRecord {
                entry: parse_entry_row(row)?,
                actor_email: row.get("actor_email")?,
                note_title: row.get("note_title")?,
            });
        }
        Ok(records)
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditEntry> {
        self.conn.execute(
            "INSERT INTO audit_log (actor_uuid, note_uuid, action, details)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                entry.actor_id.to_string(),
                entry.note_id.map(|id| id.to_string()),
                entry.action.as_str(),
                entry.details.as_deref(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        let mut stmt = self.conn.prepare(
            "SELECT id, actor_uuid, note_uuid, action, details, created_at
             FROM audit_log
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_entry_row(row),
            None => Err(RepoError::InvalidData(format!(
                "audit entry {id} missing after insert"
            ))),
        }
    }

    fn list_for_note(&self, note_id: NoteId) -> RepoResult<Vec<ActivityRecord>> {
        self.query_activity("a.note_uuid = ?1", note_id.to_string())
    }

    fn list_for_actor(&self, actor_id: UserId) -> RepoResult<Vec<ActivityRecord>> {
        self.query_activity("a.actor_uuid = ?1", actor_id.to_string())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    let actor_text: String = row.get("actor_uuid")?;
    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in audit_log.action"))
    })?;
    Ok(AuditEntry {
        id: row.get("id")?,
        actor_id: parse_uuid(&actor_text, "audit_log.actor_uuid")?,
        note_id: parse_optional_uuid(row.get("note_uuid")?, "audit_log.note_uuid")?,
        action,
        details: row.get("details")?,
        created_at: row.get("created_at")?,
    })
}
