//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows and serve owner/collaborator listing queries.
//! - Own the ordered delete routine that replaces declarative cascades.
//!
//! # Invariants
//! - Listings are sorted by `updated_at DESC` with newest insert first on ties.
//! - `delete_note_cascade` removes versions, then grants, then detaches audit
//!   entries, then removes the note. Callers run it inside a transaction.

use crate::db::NOW_EPOCH_MS_SQL;
use crate::model::collaborator::SharedNote;
use crate::model::note::{Note, NoteId};
use crate::model::role::{CollaboratorRole, Role};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const NOTE_COLUMNS_SQL: &str = "notes.uuid,
    notes.owner_uuid,
    notes.title,
    notes.content,
    notes.created_at,
    notes.updated_at";

const NOTE_ORDER_SQL: &str = "ORDER BY notes.updated_at DESC, notes.rowid DESC";

/// Row counts removed or detached by a note delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub versions_removed: usize,
    pub grants_removed: usize,
    pub audit_entries_detached: usize,
}

/// Repository interface for note rows.
pub trait NoteRepository {
    /// Inserts a new note with a generated id.
    fn insert_note(&self, owner_id: UserId, title: &str, content: &str) -> RepoResult<Note>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Overwrites title/content and bumps `updated_at`.
    fn write_content(&self, id: NoteId, title: &str, content: &str) -> RepoResult<Note>;
    /// Deletes a note and everything that hangs off it, keeping audit rows.
    fn delete_note_cascade(&self, id: NoteId) -> RepoResult<CascadeSummary>;
    /// Notes owned by `owner_id`.
    fn list_owned(&self, owner_id: UserId) -> RepoResult<Vec<Note>>;
    /// Notes on which `user_id` holds a grant, with the granted role.
    fn list_shared(&self, user_id: UserId) -> RepoResult<Vec<SharedNote>>;
    /// Owned notes plus shared notes, each note once.
    fn list_accessible(&self, user_id: UserId) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_required(&self, id: NoteId) -> RepoResult<Note> {
        self.get_note(id)?.ok_or(RepoError::NoteNotFound(id))
    }

    fn query_notes(&self, sql: &str, user_id: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, owner_id: UserId, title: &str, content: &str) -> RepoResult<Note> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notes (uuid, owner_uuid, title, content) VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), owner_id.to_string(), title, content],
        )?;
        self.load_required(id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {NOTE_COLUMNS_SQL} FROM notes WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn write_content(&self, id: NoteId, title: &str, content: &str) -> RepoResult<Note> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE notes
                 SET
                    title = ?2,
                    content = ?3,
                    updated_at = MAX(updated_at + 1, {NOW_EPOCH_MS_SQL})
                 WHERE uuid = ?1;"
            ),
            params![id.to_string(), title, content],
        )?;

        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }

        self.load_required(id)
    }

    fn delete_note_cascade(&self, id: NoteId) -> RepoResult<CascadeSummary> {
        let note_uuid = id.to_string();

        let versions_removed = self.conn.execute(
            "DELETE FROM note_versions WHERE note_uuid = ?1;",
            [note_uuid.as_str()],
        )?;
        let grants_removed = self.conn.execute(
            "DELETE FROM note_collaborators WHERE note_uuid = ?1;",
            [note_uuid.as_str()],
        )?;
        let audit_entries_detached = self.conn.execute(
            "UPDATE audit_log SET note_uuid = NULL WHERE note_uuid = ?1;",
            [note_uuid.as_str()],
        )?;
        let notes_removed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [note_uuid.as_str()])?;

        if notes_removed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }

        Ok(CascadeSummary {
            versions_removed,
            grants_removed,
            audit_entries_detached,
        })
    }

    fn list_owned(&self, owner_id: UserId) -> RepoResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {NOTE_COLUMNS_SQL}
                 FROM notes
                 WHERE notes.owner_uuid = ?1
                 {NOTE_ORDER_SQL};"
            ),
            owner_id,
        )
    }

    fn list_shared(&self, user_id: UserId) -> RepoResult<Vec<SharedNote>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS_SQL}, nc.role
             FROM notes
             INNER JOIN note_collaborators nc ON nc.note_uuid = notes.uuid
             WHERE nc.user_uuid = ?1
             {NOTE_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut shared = Vec::new();
        while let Some(row) = rows.next()? {
            let role_text: String = row.get("role")?;
            let role = CollaboratorRole::parse(&role_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid role `{role_text}` in note_collaborators.role"
                ))
            })?;
            shared.push(SharedNote {
                note: parse_note_row(row)?,
                role: Role::from(role),
            });
        }
        Ok(shared)
    }

    fn list_accessible(&self, user_id: UserId) -> RepoResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {NOTE_COLUMNS_SQL}
                 FROM notes
                 WHERE notes.owner_uuid = ?1
                    OR EXISTS (
                        SELECT 1
                        FROM note_collaborators nc
                        WHERE nc.note_uuid = notes.uuid
                          AND nc.user_uuid = ?1
                    )
                 {NOTE_ORDER_SQL};"
            ),
            user_id,
        )
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    Ok(Note {
        id: parse_uuid(&uuid_text, "notes.uuid")?,
        owner_id: parse_uuid(&owner_text, "notes.owner_uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
