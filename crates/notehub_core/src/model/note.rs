//! Note model and field validation.
//!
//! # Invariants
//! - `title` is non-blank and at most [`NOTE_TITLE_MAX_CHARS`] characters.
//! - `content` is non-blank.
//! - `owner_id` is fixed for the lifetime of the note.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Upper bound for note titles, counted in characters.
pub const NOTE_TITLE_MAX_CHARS: usize = 200;

/// Current state of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; bumped by every content-changing operation.
    pub updated_at: i64,
}

/// Partial change set for a note update. `None` keeps the prior value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NoteChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// Validates whichever fields are present.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(content) = self.content.as_deref() {
            validate_content(content)?;
        }
        Ok(())
    }

    /// Applies present fields on top of `note`.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = self.title.as_ref() {
            note.title = title.clone();
        }
        if let Some(content) = self.content.as_ref() {
            note.content = content.clone();
        }
    }
}

/// Field-level validation failure for note input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteValidationError {
    #[error("note title must not be blank")]
    BlankTitle,
    #[error("note title exceeds {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },
    #[error("note content must not be blank")]
    BlankContent,
}

pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    let actual = title.chars().count();
    if actual > NOTE_TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong {
            max: NOTE_TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    if content.trim().is_empty() {
        return Err(NoteValidationError::BlankContent);
    }
    Ok(())
}
