//! Core use-case services.
//!
//! # Responsibility
//! - Compose repositories into access-checked, audited use-cases.
//! - Keep request layers decoupled from storage details.
//!
//! Components take a `&Connection`; when called inside another component's
//! transaction they join it instead of opening their own.

pub mod access_control;
pub mod audit_log;
pub mod note_service;
pub mod user_service;
pub mod versioning;
