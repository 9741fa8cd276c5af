//! Effective roles, grantable collaborator roles and permission gates.
//!
//! # Invariants
//! - `Owner` is never stored as a grant; it is derived from note ownership.
//! - Permission checks are exhaustive matches, never string comparisons.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Effective role of a user on one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creator of the note. Can read, edit, delete and manage sharing.
    Owner,
    /// Collaborator allowed to read and edit content.
    Editor,
    /// Collaborator allowed to read only.
    Viewer,
}

/// Capability required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// View note, versions, collaborators and activity.
    Read,
    /// Change title/content, restore versions.
    Write,
    /// Delete the note and manage collaborator grants.
    Manage,
}

impl Role {
    pub fn allows(self, permission: Permission) -> bool {
        match (self, permission) {
            (Self::Owner, _) => true,
            (Self::Editor, Permission::Read | Permission::Write) => true,
            (Self::Editor, Permission::Manage) => false,
            (Self::Viewer, Permission::Read) => true,
            (Self::Viewer, Permission::Write | Permission::Manage) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Manage => "manage",
        };
        f.write_str(label)
    }
}

/// Role that an owner can grant to a collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorRole {
    #[default]
    Viewer,
    Editor,
}

impl CollaboratorRole {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }

    /// Parses a role name, case-insensitively and ignoring surrounding space.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            _ => None,
        }
    }
}

impl From<CollaboratorRole> for Role {
    fn from(value: CollaboratorRole) -> Self {
        match value {
            CollaboratorRole::Viewer => Role::Viewer,
            CollaboratorRole::Editor => Role::Editor,
        }
    }
}

impl Display for CollaboratorRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{CollaboratorRole, Permission, Role};

    #[test]
    fn permission_matrix_matches_role_semantics() {
        for permission in [Permission::Read, Permission::Write, Permission::Manage] {
            assert!(Role::Owner.allows(permission));
        }
        assert!(Role::Editor.allows(Permission::Read));
        assert!(Role::Editor.allows(Permission::Write));
        assert!(!Role::Editor.allows(Permission::Manage));
        assert!(Role::Viewer.allows(Permission::Read));
        assert!(!Role::Viewer.allows(Permission::Write));
        assert!(!Role::Viewer.allows(Permission::Manage));
    }

    #[test]
    fn collaborator_role_parse_is_lenient_on_case_only() {
        assert_eq!(CollaboratorRole::parse(" Editor "), Some(CollaboratorRole::Editor));
        assert_eq!(CollaboratorRole::parse("viewer"), Some(CollaboratorRole::Viewer));
        assert_eq!(CollaboratorRole::parse("owner"), None);
        assert_eq!(CollaboratorRole::parse(""), None);
    }

    #[test]
    fn collaborator_role_defaults_to_viewer() {
        assert_eq!(CollaboratorRole::default(), CollaboratorRole::Viewer);
        assert_eq!(Role::from(CollaboratorRole::Editor), Role::Editor);
    }
}
