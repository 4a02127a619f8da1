//! Temporary adjustment records and effective state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use warga_core::{AdjustmentId, BadgeId, PhysicalTime, Role, RoleKind, UserId};
use warga_progression::LevelTier;

/// Storage key prefix for adjustment records.
pub const ADJUSTMENT_KEY_PREFIX: &str = "adjustment:";

/// Storage key of an adjustment record.
pub fn adjustment_key(id: &AdjustmentId) -> String {
    format!("{ADJUSTMENT_KEY_PREFIX}{id}")
}

/// Displayed level forced by a `level` adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOverride {
    /// Catalog the level refers to
    pub role: RoleKind,
    /// Level number within that catalog
    pub level: u8,
}

/// What a temporary adjustment grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AdjustmentKind {
    /// Extra points on top of the baseline
    Points(i64),
    /// A badge held for the lifetime of the grant
    Badge(BadgeId),
    /// A displayed level; never touches points
    Level(LevelOverride),
}

impl AdjustmentKind {
    /// Short name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Points(_) => "points",
            AdjustmentKind::Badge(_) => "badge",
            AdjustmentKind::Level(_) => "level",
        }
    }
}

/// A time-boxed grant against a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryAdjustment {
    /// Record id
    pub id: AdjustmentId,
    /// User the grant applies to
    pub target_user_id: UserId,
    /// What is granted
    pub kind: AdjustmentKind,
    /// Audit reason, never empty
    pub reason: String,
    /// When the grant was recorded
    pub granted_at: PhysicalTime,
    /// First instant at which the grant no longer counts
    pub expires_at: PhysicalTime,
    /// Admin who issued the grant
    pub granted_by: UserId,
}

impl TemporaryAdjustment {
    /// Whether the grant still counts at `now`.
    pub fn is_active(&self, now: PhysicalTime) -> bool {
        now < self.expires_at
    }

    /// Storage key of this record.
    pub fn storage_key(&self) -> String {
        adjustment_key(&self.id)
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

/// A user's standing with all active grants folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveState {
    /// User this state describes
    pub user_id: UserId,
    /// Durable role
    pub role: Role,
    /// Persisted point balance
    pub baseline_points: i64,
    /// Baseline plus active point grants
    pub points: i64,
    /// Baseline badges plus active badge grants
    pub badges: BTreeSet<BadgeId>,
    /// Level shown to the user
    pub display_level: LevelTier,
    /// Whether `display_level` comes from a level grant
    pub level_overridden: bool,
    /// Number of grants that contributed
    pub active_adjustments: usize,
    /// Query instant
    pub as_of: PhysicalTime,
}

/// Result of a storage hygiene sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Expired adjustment records deleted
    pub adjustments_removed: usize,
    /// Expired badge claim holders dropped
    pub claim_holders_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: AdjustmentKind) -> TemporaryAdjustment {
        TemporaryAdjustment {
            id: AdjustmentId::new(),
            target_user_id: UserId::from_bytes([1u8; 16]),
            kind,
            reason: "kerja bakti".to_string(),
            granted_at: PhysicalTime::from_ms(1_000),
            expires_at: PhysicalTime::from_ms(2_000),
            granted_by: UserId::from_bytes([9u8; 16]),
        }
    }

    #[test]
    fn test_activity_window_is_half_open() {
        let adj = sample(AdjustmentKind::Points(10));
        assert!(adj.is_active(PhysicalTime::from_ms(1_000)));
        assert!(adj.is_active(PhysicalTime::from_ms(1_999)));
        assert!(!adj.is_active(PhysicalTime::from_ms(2_000)));
    }

    #[test]
    fn test_kind_wire_shape() {
        let adj = sample(AdjustmentKind::Level(LevelOverride {
            role: RoleKind::User,
            level: 4,
        }));
        let json: serde_json::Value = serde_json::from_slice(&adj.to_bytes().unwrap()).unwrap();
        assert_eq!(json["kind"]["type"], "level");
        assert_eq!(json["kind"]["value"]["role"], "user");
        assert_eq!(json["kind"]["value"]["level"], 4);

        let badge = sample(AdjustmentKind::Badge(BadgeId::new("kader-pkk")));
        let decoded = TemporaryAdjustment::from_bytes(&badge.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, badge);
        assert_eq!(decoded.kind.as_str(), "badge");
    }
}
