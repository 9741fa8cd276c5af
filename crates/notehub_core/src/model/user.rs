//! User identity model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered user.
pub type UserId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Registered identity. Referenced by ownership, grants, versions and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique across all users.
    pub email: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Trims an email and checks that it has a `local@domain.tld` shape.
///
/// Returns `None` when the value cannot be an email address.
pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if EMAIL_RE.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn normalize_email_trims_valid_addresses() {
        assert_eq!(
            normalize_email("  ada@example.com ").as_deref(),
            Some("ada@example.com")
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_values() {
        assert!(normalize_email("").is_none());
        assert!(normalize_email("no-at-sign.example.com").is_none());
        assert!(normalize_email("two@@example.com").is_none());
        assert!(normalize_email("space in@example.com").is_none());
        assert!(normalize_email("ada@localhost").is_none());
    }
}
