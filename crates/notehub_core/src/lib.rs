//! Core domain logic for NoteHub, a multi-user notes service.
//! This crate owns access control, note versioning and the audit trail.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{CredentialService, StaticTokenCredentials};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{CoreError, CoreResult, ErrorKind, Missing};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::audit::{ActivityRecord, AuditAction, AuditEntry};
pub use model::collaborator::{Collaborator, SharedNote};
pub use model::note::{Note, NoteChanges, NoteId};
pub use model::role::{CollaboratorRole, Permission, Role};
pub use model::user::{User, UserId};
pub use model::version::NoteVersion;
pub use repo::RepoError;
pub use service::access_control::AccessControl;
pub use service::audit_log::AuditLog;
pub use service::note_service::NoteService;
pub use service::user_service::UserService;
pub use service::versioning::{VersionEngine, VersionedChange};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
