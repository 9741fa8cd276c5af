//! Note version repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(note_uuid, version_number)` is unique in storage; a colliding insert
//!   surfaces as `RepoError::Duplicate("note version")`.
//! - Rows are insert-only. The only delete path is the note cascade.

use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::model::version::NoteVersion;
use crate::repo::{parse_uuid, unique_violation_as, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const VERSION_SELECT_SQL: &str = "SELECT
    id,
    note_uuid,
    version_number,
    title_snapshot,
    content_snapshot,
    editor_uuid,
    created_at
FROM note_versions";

/// Write model for one snapshot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewVersion<'a> {
    pub note_id: NoteId,
    pub version_number: u32,
    pub title_snapshot: &'a str,
    pub content_snapshot: &'a str,
    pub editor_id: UserId,
}

/// Repository interface for version snapshots.
pub trait VersionRepository {
    /// Highest stored version number for the note, `0` when none exist.
    fn max_version_number(&self, note_id: NoteId) -> RepoResult<u32>;
    fn insert_version(&self, version: &NewVersion<'_>) -> RepoResult<NoteVersion>;
    /// All versions of the note, highest number first.
    fn list_versions(&self, note_id: NoteId) -> RepoResult<Vec<NoteVersion>>;
    fn get_version(&self, note_id: NoteId, version_number: u32) -> RepoResult<Option<NoteVersion>>;
}

/// SQLite-backed version repository.
pub struct SqliteVersionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVersionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl VersionRepository for SqliteVersionRepository<'_> {
    fn max_version_number(&self, note_id: NoteId) -> RepoResult<u32> {
        let max: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(version_number), 0)
             FROM note_versions
             WHERE note_uuid = ?1;",
            [note_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn insert_version(&self, version: &NewVersion<'_>) -> RepoResult<NoteVersion> {
        self.conn
            .execute(
                "INSERT INTO note_versions (
                    note_uuid,
                    version_number,
                    title_snapshot,
                    content_snapshot,
                    editor_uuid
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    version.note_id.to_string(),
                    version.version_number,
                    version.title_snapshot,
                    version.content_snapshot,
                    version.editor_id.to_string(),
                ],
            )
            .map_err(unique_violation_as("note version"))?;

        self.get_version(version.note_id, version.version_number)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "version {} of note {} missing after insert",
                    version.version_number, version.note_id
                ))
            })
    }

    fn list_versions(&self, note_id: NoteId) -> RepoResult<Vec<NoteVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VERSION_SELECT_SQL}
             WHERE note_uuid = ?1
             ORDER BY version_number DESC;"
        ))?;
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next()? {
            versions.push(parse_version_row(row)?);
        }
        Ok(versions)
    }

    fn get_version(&self, note_id: NoteId, version_number: u32) -> RepoResult<Option<NoteVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VERSION_SELECT_SQL}
             WHERE note_uuid = ?1
               AND version_number = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id.to_string(), version_number])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_version_row(row)?));
        }
        Ok(None)
    }
}

fn parse_version_row(row: &Row<'_>) -> RepoResult<NoteVersion> {
    let note_text: String = row.get("note_uuid")?;
    let editor_text: String = row.get("editor_uuid")?;
    Ok(NoteVersion {
        id: row.get("id")?,
        note_id: parse_uuid(&note_text, "note_versions.note_uuid")?,
        version_number: row.get("version_number")?,
        title_snapshot: row.get("title_snapshot")?,
        content_snapshot: row.get("content_snapshot")?,
        editor_id: parse_uuid(&editor_text, "note_versions.editor_uuid")?,
        created_at: row.get("created_at")?,
    })
}
