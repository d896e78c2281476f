//! Application users (the login directory)

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind};
use crate::role::Role;

/// Stored user account.
///
/// `password_hash` is an Argon2 PHC string. It is never part of the
/// [`EntityKind::AppUser`] field schema, so redaction always strips it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password_hash: String,
}

impl AppUser {
    pub const GUEST_ID: &'static str = "guest";

    /// Transient identity for guest sessions; never persisted
    pub fn guest() -> Self {
        Self {
            id: Self::GUEST_ID.to_string(),
            username: "Guest".to_string(),
            full_name: None,
            role: Role::Public,
            password_hash: String::new(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.id == Self::GUEST_ID && self.role == Role::Public
    }

    /// Name written into attribution and task actor fields
    pub fn actor_name(&self) -> &str {
        &self.username
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
        }
    }
}

impl Entity for AppUser {
    const KIND: EntityKind = EntityKind::AppUser;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Public view of a user (no credential material)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guest_identity() {
        let guest = AppUser::guest();
        assert!(guest.is_guest());
        assert_eq!(guest.username, "Guest");
        assert_eq!(guest.role, Role::Public);
    }

    #[test]
    fn test_unknown_role_parses_public() {
        let user: AppUser = serde_json::from_value(json!({
            "username": "someone",
            "role": "SUPERVISOR"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Public);
    }

    #[test]
    fn test_summary_has_no_hash() {
        let user = AppUser {
            id: "u1".into(),
            username: "admin_unisma".into(),
            full_name: Some("Admin LPH".into()),
            role: Role::Admin,
            password_hash: "$argon2id$v=19$...".into(),
        };
        let value = serde_json::to_value(user.summary()).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], "ADMIN");
    }
}
