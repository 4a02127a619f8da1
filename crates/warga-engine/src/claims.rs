//! Badge claim registry
//!
//! Every limited-capacity badge has one claim record under
//! `badge-claim:<badgeId>` listing its current holders. A holder entry is
//! written for both temporary grants and durable assignments, and the
//! record is only ever replaced through `compare_and_swap`, so two admins
//! racing for the same singleton office cannot both observe a free slot.
//!
//! Badges found in a user's baseline set are adopted into the record as
//! durable holders before every capacity check, so a badge written into a
//! user record without going through the engine still occupies its slot.

use crate::engine::ProgressionEngine;
use serde::{Deserialize, Serialize};
use warga_badges::{ensure_capacity, ValidatedBadge};
use warga_core::effects::{PhysicalTimeEffects, StorageEffects};
use warga_core::{
    AdjustmentId, BadgeId, PhysicalTime, UserId, UserRecord, WargaError, WargaResult, USER_KEY_PREFIX,
};

/// Storage key prefix for claim records.
pub const CLAIM_KEY_PREFIX: &str = "badge-claim:";

/// Storage key of a badge's claim record.
pub fn claim_key(badge_id: &BadgeId) -> String {
    format!("{CLAIM_KEY_PREFIX}{badge_id}")
}

/// One holder of a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimHolder {
    /// Holder
    pub user_id: UserId,
    /// Temporary grant backing the claim; `None` for a durable assignment
    pub adjustment_id: Option<AdjustmentId>,
    /// When the claim was taken
    pub claimed_at: PhysicalTime,
    /// When the claim lapses; `None` for a durable assignment
    pub expires_at: Option<PhysicalTime>,
}

impl ClaimHolder {
    /// Whether the holder still occupies a slot at `now`.
    pub fn is_active(&self, now: PhysicalTime) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => now < expires_at,
        }
    }

    /// Whether this entry was written for a durable assignment.
    pub fn is_durable(&self) -> bool {
        self.adjustment_id.is_none()
    }
}

/// Holders of one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeClaim {
    /// Badge the record belongs to
    pub badge_id: BadgeId,
    /// Holder entries in claim order
    pub holders: Vec<ClaimHolder>,
}

impl BadgeClaim {
    /// Record with no holders.
    pub fn empty(badge_id: &BadgeId) -> Self {
        Self {
            badge_id: badge_id.clone(),
            holders: Vec::new(),
        }
    }

    /// Distinct users other than `user_id` holding the badge at `now`.
    pub fn active_holders_excluding(&self, user_id: &UserId, now: PhysicalTime) -> u32 {
        let mut others: Vec<&UserId> = self
            .holders
            .iter()
            .filter(|holder| holder.is_active(now) && &holder.user_id != user_id)
            .map(|holder| &holder.user_id)
            .collect();
        others.sort();
        others.dedup();
        u32::try_from(others.len()).unwrap_or(u32::MAX)
    }

    /// Whether `user_id` already has a durable entry.
    pub fn holds_durably(&self, user_id: &UserId) -> bool {
        self.holders
            .iter()
            .any(|holder| holder.is_durable() && &holder.user_id == user_id)
    }

    /// Add a durable entry for every baseline holder the record lacks.
    /// Returns how many entries were added.
    fn adopt_baseline(&mut self, baseline: &[UserId], now: PhysicalTime) -> usize {
        let mut adopted = 0;
        for user_id in baseline {
            if !self.holds_durably(user_id) {
                self.holders.push(ClaimHolder {
                    user_id: *user_id,
                    adjustment_id: None,
                    claimed_at: now,
                    expires_at: None,
                });
                adopted += 1;
            }
        }
        adopted
    }

    /// Entries active at `now`.
    pub fn active(&self, now: PhysicalTime) -> impl Iterator<Item = &ClaimHolder> {
        self.holders.iter().filter(move |holder| holder.is_active(now))
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> WargaResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a stored record.
    pub fn from_bytes(bytes: &[u8]) -> WargaResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<S, T> ProgressionEngine<S, T>
where
    S: StorageEffects,
    T: PhysicalTimeEffects,
{
    /// Current claim record for a badge. Absent records read as empty.
    pub async fn badge_claim(&self, badge_id: &BadgeId) -> WargaResult<BadgeClaim> {
        match self.storage.retrieve(&claim_key(badge_id)).await? {
            Some(bytes) => BadgeClaim::from_bytes(&bytes),
            None => Ok(BadgeClaim::empty(badge_id)),
        }
    }

    /// Holders occupying a slot of `badge_id` at `now`.
    pub async fn active_holders(&self, badge_id: &BadgeId, now: PhysicalTime) -> WargaResult<Vec<ClaimHolder>> {
        let claim = self.badge_claim(badge_id).await?;
        Ok(claim.active(now).cloned().collect())
    }

    /// Users whose baseline badge set contains `badge_id`.
    async fn baseline_holders(&self, badge_id: &BadgeId) -> WargaResult<Vec<UserId>> {
        let mut holders = Vec::new();
        for key in self.storage.list_keys(Some(USER_KEY_PREFIX)).await? {
            let Some(bytes) = self.storage.retrieve(&key).await? else {
                continue;
            };
            let record = UserRecord::from_bytes(&bytes)?;
            if record.badges.contains(badge_id) {
                holders.push(record.id);
            }
        }
        Ok(holders)
    }

    /// Take a slot of `badge` for `holder`, failing with `CapacityExceeded`
    /// when other users already fill every slot.
    ///
    /// Baseline holders are adopted and expired entries dropped as part of
    /// the write. A durable holder that already has a durable entry leaves
    /// the record unchanged. Unlimited badges have no record and always
    /// succeed.
    pub(crate) async fn acquire_claim(&self, badge: &ValidatedBadge, holder: ClaimHolder) -> WargaResult<()> {
        if !badge.is_limited() {
            return Ok(());
        }

        let key = claim_key(&badge.id);
        let now = holder.claimed_at;
        for _ in 0..self.config.max_write_attempts {
            let current = self.storage.retrieve(&key).await?;
            let mut claim = match &current {
                Some(bytes) => BadgeClaim::from_bytes(bytes)?,
                None => BadgeClaim::empty(&badge.id),
            };
            let baseline = self.baseline_holders(&badge.id).await?;
            let adopted = claim.adopt_baseline(&baseline, now);

            ensure_capacity(badge, claim.active_holders_excluding(&holder.user_id, now))?;

            let before = claim.holders.len();
            claim.holders.retain(|entry| entry.is_active(now));
            let already_held = holder.is_durable() && claim.holds_durably(&holder.user_id);
            if already_held && adopted == 0 && claim.holders.len() == before {
                return Ok(());
            }
            if !already_held {
                claim.holders.push(holder.clone());
            }
            if self
                .storage
                .compare_and_swap(&key, current.as_deref(), claim.to_bytes()?)
                .await?
            {
                tracing::debug!(
                    badge_id = %badge.id,
                    user_id = %holder.user_id,
                    durable = holder.is_durable(),
                    "badge claim taken"
                );
                return Ok(());
            }
            tracing::debug!(badge_id = %badge.id, "badge claim changed concurrently, retrying");
        }
        Err(WargaError::Conflict {
            key,
            attempts: self.config.max_write_attempts,
        })
    }

    /// Drop every entry of a badge's claim record matching `matches`.
    /// Returns how many entries were removed.
    pub(crate) async fn release_claim<F>(&self, badge_id: &BadgeId, matches: F) -> WargaResult<usize>
    where
        F: Fn(&ClaimHolder) -> bool + Send + Sync,
    {
        let key = claim_key(badge_id);
        for _ in 0..self.config.max_write_attempts {
            let Some(current) = self.storage.retrieve(&key).await? else {
                return Ok(0);
            };
            let mut claim = BadgeClaim::from_bytes(&current)?;
            let before = claim.holders.len();
            claim.holders.retain(|holder| !matches(holder));
            let removed = before - claim.holders.len();
            if removed == 0 {
                return Ok(0);
            }

            let written = if claim.holders.is_empty() {
                self.storage.compare_and_remove(&key, &current).await?
            } else {
                self.storage
                    .compare_and_swap(&key, Some(&current), claim.to_bytes()?)
                    .await?
            };
            if written {
                tracing::debug!(badge_id = %badge_id, removed, "badge claim released");
                return Ok(removed);
            }
        }
        Err(WargaError::Conflict {
            key,
            attempts: self.config.max_write_attempts,
        })
    }

    /// Drop claim entries that expired before `now`. Returns entries removed.
    pub(crate) async fn prune_claims(&self, now: PhysicalTime) -> WargaResult<usize> {
        let mut removed = 0;
        for key in self.storage.list_keys(Some(CLAIM_KEY_PREFIX)).await? {
            let Some(raw) = key.strip_prefix(CLAIM_KEY_PREFIX) else {
                continue;
            };
            let badge_id = BadgeId::new(raw);
            removed += self
                .release_claim(&badge_id, |holder| !holder.is_active(now))
                .await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(seed: u8, expires_at: Option<u64>) -> ClaimHolder {
        ClaimHolder {
            user_id: UserId::from_bytes([seed; 16]),
            adjustment_id: expires_at.map(|_| AdjustmentId::new()),
            claimed_at: PhysicalTime::from_ms(0),
            expires_at: expires_at.map(PhysicalTime::from_ms),
        }
    }

    #[test]
    fn test_durable_holder_never_lapses() {
        let durable = holder(1, None);
        assert!(durable.is_durable());
        assert!(durable.is_active(PhysicalTime::from_ms(u64::MAX)));

        let temporary = holder(2, Some(100));
        assert!(temporary.is_active(PhysicalTime::from_ms(99)));
        assert!(!temporary.is_active(PhysicalTime::from_ms(100)));
    }

    #[test]
    fn test_active_holders_excluding_counts_distinct_others() {
        let claim = BadgeClaim {
            badge_id: BadgeId::new("rw-02-005-02"),
            holders: vec![holder(1, None), holder(1, Some(500)), holder(2, Some(50)), holder(3, Some(500))],
        };
        let now = PhysicalTime::from_ms(100);
        let me = UserId::from_bytes([3; 16]);
        // user 1 twice counts once, user 2 expired, user 3 excluded
        assert_eq!(claim.active_holders_excluding(&me, now), 1);
        assert_eq!(claim.active(now).count(), 3);
    }

    #[test]
    fn test_adopt_baseline_adds_missing_durable_entries() {
        let mut claim = BadgeClaim::empty(&BadgeId::new("rw-02-005-02"));
        claim.holders.push(holder(1, None));
        claim.holders.push(holder(2, Some(500)));

        let baseline = [UserId::from_bytes([1; 16]), UserId::from_bytes([2; 16])];
        assert_eq!(claim.adopt_baseline(&baseline, PhysicalTime::from_ms(0)), 1);
        assert!(claim.holds_durably(&UserId::from_bytes([2; 16])));
        assert_eq!(claim.holders.len(), 3);

        // A temporary entry lapsing does not free a baseline holder's slot.
        let later = PhysicalTime::from_ms(1_000);
        assert_eq!(claim.active_holders_excluding(&UserId::from_bytes([9; 16]), later), 2);
        assert_eq!(claim.adopt_baseline(&baseline, later), 0);

        let decoded = BadgeClaim::from_bytes(&claim.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, claim);
    }

    #[test]
    fn test_claim_key() {
        assert_eq!(claim_key(&BadgeId::new("camat-01")), "badge-claim:camat-01");
    }
}
