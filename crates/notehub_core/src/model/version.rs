//! Immutable note version snapshots.

use crate::model::note::NoteId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Full copy of a note's title/content taken immediately before a change.
///
/// `version_number` starts at 1 per note and the next number is always the
/// current maximum plus one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteVersion {
    pub id: i64,
    pub note_id: NoteId,
    pub version_number: u32,
    pub title_snapshot: String,
    pub content_snapshot: String,
    /// User whose change produced this snapshot.
    pub editor_id: UserId,
    pub created_at: i64,
}
