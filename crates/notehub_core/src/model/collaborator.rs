//! Collaborator grant model.

use crate::model::note::{Note, NoteId};
use crate::model::role::{CollaboratorRole, Role};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// One (note, user, role) grant. At most one exists per (note, user) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: i64,
    pub note_id: NoteId,
    pub user_id: UserId,
    /// Email of the grantee, joined from `users`.
    pub email: String,
    pub role: CollaboratorRole,
    pub created_at: i64,
}

/// Note visible to a collaborator, paired with the role granted on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedNote {
    pub note: Note,
    pub role: Role,
}
