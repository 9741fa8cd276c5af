//! Audit trail model.
//!
//! # Invariants
//! - Entries are append-only.
//! - `note_id` becomes `None` when the referenced note is deleted; the entry
//!   itself is kept.

use crate::model::note::NoteId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Kind of access-relevant action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    View,
    Update,
    Delete,
    Share,
    Unshare,
    Restore,
}

impl AuditAction {
    pub const ALL: [AuditAction; 7] = [
        Self::Create,
        Self::View,
        Self::Update,
        Self::Delete,
        Self::Share,
        Self::Unshare,
        Self::Restore,
    ];

    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Share => "share",
            Self::Unshare => "unshare",
            Self::Restore => "restore",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: UserId,
    pub note_id: Option<NoteId>,
    pub action: AuditAction,
    pub details: Option<String>,
    pub created_at: i64,
}

/// Write model for appending one audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub actor_id: UserId,
    pub note_id: Option<NoteId>,
    pub action: AuditAction,
    pub details: Option<String>,
}

impl NewAuditEntry {
    pub fn for_note(actor_id: UserId, note_id: NoteId, action: AuditAction) -> Self {
        Self {
            actor_id,
            note_id: Some(note_id),
            action,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Audit entry joined with the actor email and, while the note exists, its
/// current title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub entry: AuditEntry,
    pub actor_email: String,
    pub note_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn storage_values_round_trip_for_every_action() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("CREATE"), None);
    }
}
