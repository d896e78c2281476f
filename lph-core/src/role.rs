//! Viewer roles

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege tier of the current viewer.
///
/// Read visibility nests (ADMIN ⊇ USER ⊇ PUBLIC) but the tiers are not a
/// strict ladder for mutations: create/update is shared by ADMIN and USER
/// while delete is ADMIN only. See [`crate::policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access, including deletes and user management
    Admin,
    /// Staff member
    User,
    /// Guest; unknown role strings also land here
    #[default]
    Public,
}

impl Role {
    /// ADMIN or USER
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::User)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    /// Never fails: anything that is not a known staff role is PUBLIC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "USER" => Role::User,
            _ => Role::Public,
        })
    }
}

/// Same reading as [`FromStr`], so stored and parsed roles agree
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_public() {
        assert_eq!("superuser".parse::<Role>().unwrap(), Role::Public);
        assert_eq!("".parse::<Role>().unwrap(), Role::Public);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_serde_unknown_role_is_public() {
        let role: Role = serde_json::from_str("\"ROOT\"").unwrap();
        assert_eq!(role, Role::Public);

        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);

        for raw in ["\"admin\"", "\" Admin \""] {
            let role: Role = serde_json::from_str(raw).unwrap();
            assert_eq!(role, raw.trim_matches('"').parse::<Role>().unwrap());
            assert_eq!(role, Role::Admin);
        }
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn test_staff_tiers() {
        assert!(Role::Admin.is_staff());
        assert!(Role::User.is_staff());
        assert!(!Role::Public.is_staff());
        assert!(!Role::User.is_admin());
    }
}
