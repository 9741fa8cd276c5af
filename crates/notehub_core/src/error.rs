//! Typed outcomes surfaced to the request-handling layer.
//!
//! # Invariants
//! - `NotFound` and `AccessDenied` are distinct: the first means the target
//!   does not exist, the second that the caller has no relation to an
//!   existing note. Nothing else about the note is revealed.
//! - Storage failures never masquerade as domain errors; they map to
//!   `ErrorKind::Internal`.

use crate::db::DbError;
use crate::model::note::{NoteId, NoteValidationError};
use crate::model::role::{Permission, Role};
use crate::model::user::UserId;
use crate::repo::RepoError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// What a `NotFound` outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Note(NoteId),
    Version { note_id: NoteId, version_number: u32 },
    Collaborator { note_id: NoteId, user_id: UserId },
    User(UserId),
    UserEmail(String),
}

impl Display for Missing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(id) => write!(f, "note {id}"),
            Self::Version {
                note_id,
                version_number,
            } => write!(f, "version {version_number} of note {note_id}"),
            Self::Collaborator { note_id, user_id } => {
                write!(f, "collaborator {user_id} on note {note_id}")
            }
            Self::User(id) => write!(f, "user {id}"),
            Self::UserEmail(_) => write!(f, "user with the given email"),
        }
    }
}

/// Core use-case error.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("access denied to note {0}")]
    AccessDenied(NoteId),
    #[error("{role} role lacks {required} permission on note {note_id}")]
    Forbidden {
        note_id: NoteId,
        role: Role,
        required: Permission,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error(transparent)]
    Repo(RepoError),
}

/// Coarse error classification for callers mapping outcomes to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Forbidden,
    InvalidInput,
    InvalidOperation,
    Conflict,
    Unauthenticated,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NotFound(Missing::Note(id)),
            RepoError::Duplicate(target) => Self::Conflict(format!("duplicate {target}")),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

impl From<NoteValidationError> for CoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}
