//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one per table.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories never open transactions; callers own the boundary.
//! - Repository APIs return semantic errors (`Duplicate`, `NoteNotFound`) in
//!   addition to DB transport errors.
//! - Read paths reject undecodable persisted state instead of masking it.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::note::NoteId;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

pub mod audit_repo;
pub mod collaborator_repo;
pub mod note_repo;
pub mod user_repo;
pub mod version_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    /// A UNIQUE constraint rejected the write.
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    /// Target note row does not exist.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),
    /// Connection schema is not at the expected migrated version.
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Fails unless the connection has every known migration applied.
pub fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = schema_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Maps UNIQUE/PRIMARY KEY violations to `RepoError::Duplicate(target)`.
pub(crate) fn unique_violation_as(target: &'static str) -> impl FnOnce(rusqlite::Error) -> RepoError {
    move |err| match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepoError::Duplicate(target)
        }
        _ => RepoError::from(err),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value
        .map(|text| parse_uuid(text.as_str(), column))
        .transpose()
}
