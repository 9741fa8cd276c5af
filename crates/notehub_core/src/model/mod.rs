//! Domain model for users, notes, sharing, versions and the audit trail.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Represent roles and audit actions as closed enums.
//!
//! # Invariants
//! - Users and notes are identified by stable UUIDs.
//! - Note ownership never changes after creation.
//! - Versions and audit entries are immutable once written.

pub mod audit;
pub mod collaborator;
pub mod note;
pub mod role;
pub mod user;
pub mod version;
