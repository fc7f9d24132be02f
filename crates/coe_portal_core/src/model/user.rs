//! User records and the closed role vocabulary.

use crate::model::{UnitId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Portal role. Capabilities per role live in `auth::permissions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Guest, Role::Student, Role::Faculty, Role::Admin];

    /// Stable wire label (`GUEST|STUDENT|FACULTY|ADMIN`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Student => "STUDENT",
            Self::Faculty => "FACULTY",
            Self::Admin => "ADMIN",
        }
    }

    /// Parses a wire label. Matching is exact; unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portal user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coe_id: Option<UnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "last_role_change_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_role_change_at: Option<String>,
    #[serde(
        default,
        rename = "created_by_uid",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by_uid: Option<UserId>,
    #[serde(default = "default_active", rename = "is_active")]
    pub is_active: bool,
    #[serde(default, rename = "force_password_reset")]
    pub force_password_reset: bool,
}

fn default_active() -> bool {
    true
}

/// Caller-supplied fields for an admin-initiated user creation.
///
/// `id`, `avatar_url` and `coe_id` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by_uid: Option<UserId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub force_password_reset: bool,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            department: None,
            description: None,
            created_by_uid: None,
            is_active: true,
            force_password_reset: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, User};

    #[test]
    fn role_labels_roundtrip_through_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("OWNER"), None);
    }

    #[test]
    fn user_deserializes_remote_shape_with_defaults() {
        let user: User = serde_json::from_str(
            r#"{"id":"user-1","name":"Asha","email":"asha@example.edu","role":"FACULTY","coeId":"coe-ai"}"#,
        )
        .expect("user json");
        assert_eq!(user.role, Role::Faculty);
        assert_eq!(user.coe_id.as_deref(), Some("coe-ai"));
        assert!(user.is_active);
        assert!(!user.force_password_reset);
    }
}
