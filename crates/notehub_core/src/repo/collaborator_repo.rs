//! Collaborator grant repository contracts and SQLite implementation.
//!
//! # Invariants
//! - At most one grant exists per `(note, user)` pair; writes are upserts.
//! - Grant rows never carry the `owner` role.

use crate::model::collaborator::Collaborator;
use crate::model::note::NoteId;
use crate::model::role::CollaboratorRole;
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLLABORATOR_SELECT_SQL: &str = "SELECT
    nc.id,
    nc.note_uuid,
    nc.user_uuid,
    u.email,
    nc.role,
    nc.created_at
FROM note_collaborators nc
INNER JOIN users u ON u.uuid = nc.user_uuid";

/// Repository interface for collaborator grants.
pub trait CollaboratorRepository {
    /// Role granted to `user_id` on `note_id`, if any.
    fn get_role(&self, note_id: NoteId, user_id: UserId) -> RepoResult<Option<CollaboratorRole>>;
    /// Creates the grant or overwrites the role of the existing one.
    fn upsert_grant(
        &self,
        note_id: NoteId,
        user_id: UserId,
        role: CollaboratorRole,
    ) -> RepoResult<Collaborator>;
    /// Deletes the grant. Returns `false` when none existed.
    fn delete_grant(&self, note_id: NoteId, user_id: UserId) -> RepoResult<bool>;
    /// Grants on one note in creation order.
    fn list_for_note(&self, note_id: NoteId) -> RepoResult<Vec<Collaborator>>;
}

/// SQLite-backed collaborator repository.
pub struct SqliteCollaboratorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollaboratorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CollaboratorRepository for SqliteCollaboratorRepository<'_> {
    fn get_role(&self, note_id: NoteId, user_id: UserId) -> RepoResult<Option<CollaboratorRole>> {
        let role_text: Option<String> = self
            .conn
            .query_row(
                "SELECT role
                 FROM note_collaborators
                 WHERE note_uuid = ?1
                   AND user_uuid = ?2;",
                params![note_id.to_string(), user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        role_text.as_deref().map(parse_role).transpose()
    }

    fn upsert_grant(
        &self,
        note_id: NoteId,
        user_id: UserId,
        role: CollaboratorRole,
    ) -> RepoResult<Collaborator> {
        self.conn.execute(
            "INSERT INTO note_collaborators (note_uuid, user_uuid, role)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (note_uuid, user_uuid) DO UPDATE SET role = excluded.role;",
            params![note_id.to_string(), user_id.to_string(), role.as_str()],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{COLLABORATOR_SELECT_SQL}
             WHERE nc.note_uuid = ?1
               AND nc.user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id.to_string(), user_id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_collaborator_row(row),
            None => Err(RepoError::InvalidData(format!(
                "grant for user {user_id} on note {note_id} missing after upsert"
            ))),
        }
    }

    fn delete_grant(&self, note_id: NoteId, user_id: UserId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM note_collaborators
             WHERE note_uuid = ?1
               AND user_uuid = ?2;",
            params![note_id.to_string(), user_id.to_string()],
        )?;
        Ok(removed > 0)
    }

    fn list_for_note(&self, note_id: NoteId) -> RepoResult<Vec<Collaborator>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COLLABORATOR_SELECT_SQL}
             WHERE nc.note_uuid = ?1
             ORDER BY nc.id ASC;"
        ))?;
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut collaborators = Vec::new();
        while let Some(row) = rows.next()? {
            collaborators.push(parse_collaborator_row(row)?);
        }
        Ok(collaborators)
    }
}

fn parse_collaborator_row(row: &Row<'_>) -> RepoResult<Collaborator> {
    let note_text: String = row.get("note_uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let role_text: String = row.get("role")?;
    Ok(Collaborator {
        id: row.get("id")?,
        note_id: parse_uuid(&note_text, "note_collaborators.note_uuid")?,
        user_id: parse_uuid(&user_text, "note_collaborators.user_uuid")?,
        email: row.get("email")?,
        role: parse_role(&role_text)?,
        created_at: row.get("created_at")?,
    })
}

fn parse_role(value: &str) -> RepoResult<CollaboratorRole> {
    CollaboratorRole::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{value}` in note_collaborators.role"))
    })
}
