//! Persisted user record
//!
//! The storage collaborator owns the lifecycle of users. The engine reads
//! the record and only ever rewrites `role`, `points` and `badges`.

use crate::identifiers::{BadgeId, UserId};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Storage key prefix for user records.
pub const USER_KEY_PREFIX: &str = "user:";

/// Storage key of a user record.
pub fn user_key(user_id: &UserId) -> String {
    format!("{USER_KEY_PREFIX}{user_id}")
}

/// Where a user lives, expressed in geography codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domicile {
    /// Kecamatan (sub-district) code
    pub kecamatan: String,
    /// Kelurahan (village) code
    pub kelurahan: String,
    /// RW (ward) number, if recorded
    pub rw: Option<u8>,
    /// RT (block) number, if recorded
    pub rt: Option<u16>,
}

impl Domicile {
    /// Create a domicile down to the kelurahan.
    pub fn new(kecamatan: impl Into<String>, kelurahan: impl Into<String>) -> Self {
        Self {
            kecamatan: kecamatan.into(),
            kelurahan: kelurahan.into(),
            rw: None,
            rt: None,
        }
    }

    /// Set the RW number.
    pub fn with_rw(mut self, rw: u8) -> Self {
        self.rw = Some(rw);
        self
    }

    /// Set the RT number.
    pub fn with_rt(mut self, rt: u16) -> Self {
        self.rt = Some(rt);
        self
    }
}

/// Durable user state as persisted under `user:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User identifier
    pub id: UserId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Durable role (moderator tier included)
    #[serde(flatten)]
    pub role: Role,
    /// Baseline point balance
    pub points: i64,
    /// Durably held badges
    #[serde(default)]
    pub badges: BTreeSet<BadgeId>,
    /// Stored level, if the storage layer keeps one
    #[serde(default)]
    pub level: Option<u8>,
    /// Recorded domicile
    #[serde(default)]
    pub domicile: Option<Domicile>,
}

impl UserRecord {
    /// Create a new user with zero points and no badges.
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            points: 0,
            badges: BTreeSet::new(),
            level: None,
            domicile: None,
        }
    }

    /// Set the domicile.
    pub fn with_domicile(mut self, domicile: Domicile) -> Self {
        self.domicile = Some(domicile);
        self
    }

    /// Set the baseline points.
    pub fn with_points(mut self, points: i64) -> Self {
        self.points = points;
        self
    }

    /// Storage key of this record.
    pub fn storage_key(&self) -> String {
        user_key(&self.id)
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
