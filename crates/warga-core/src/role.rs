//! Roles
//!
//! [`RoleKind`] keys the tier catalogs. [`Role`] is the durable role of a
//! user; the moderator sub-tier only exists inside the `Moderator` variant,
//! so a plain user can never carry a stale tier.

use crate::errors::WargaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog key for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Regular volunteer
    User,
    /// Community moderator
    Moderator,
    /// Platform administrator
    Admin,
}

impl RoleKind {
    /// All role kinds in ascending order of authority.
    pub const ALL: [RoleKind; 3] = [RoleKind::User, RoleKind::Moderator, RoleKind::Admin];

    /// Lowercase name used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::User => "user",
            RoleKind::Moderator => "moderator",
            RoleKind::Admin => "admin",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleKind {
    type Err = WargaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(RoleKind::User),
            "moderator" => Ok(RoleKind::Moderator),
            "admin" => Ok(RoleKind::Admin),
            _ => Err(WargaError::invalid_role(s)),
        }
    }
}

/// Durable role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    /// Regular volunteer
    #[default]
    User,
    /// Moderator at a given tier (1-based)
    Moderator {
        /// Moderator tier
        #[serde(rename = "moderator_tier")]
        tier: u8,
    },
    /// Administrator
    Admin,
}

impl Role {
    /// Catalog key for this role.
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::User => RoleKind::User,
            Role::Moderator { .. } => RoleKind::Moderator,
            Role::Admin => RoleKind::Admin,
        }
    }

    /// Moderator tier, if the role is moderator.
    pub fn moderator_tier(&self) -> Option<u8> {
        match self {
            Role::Moderator { tier } => Some(*tier),
            _ => None,
        }
    }

    /// Whether this role may invoke admin-only operations.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Moderator { tier } => write!(f, "moderator (tier {tier})"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_role_kind_parse() {
        assert_eq!("user".parse::<RoleKind>().unwrap(), RoleKind::User);
        assert_eq!("Moderator".parse::<RoleKind>().unwrap(), RoleKind::Moderator);
        assert_eq!(" admin ".parse::<RoleKind>().unwrap(), RoleKind::Admin);

        let err = "superuser".parse::<RoleKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRole);
    }

    #[test]
    fn test_role_tagged_serialization() {
        let json = serde_json::to_value(Role::Moderator { tier: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"role": "moderator", "moderator_tier": 3}));

        let user: Role = serde_json::from_value(serde_json::json!({"role": "user"})).unwrap();
        assert_eq!(user, Role::User);
        assert_eq!(user.moderator_tier(), None);
    }
}
