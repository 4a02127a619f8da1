//! Temporary adjustment ledger
//!
//! Grants are appended as standalone records and never revert anything:
//! an adjustment simply stops counting once `now >= expires_at`. Effective
//! state is recomputed on every read by folding the active records over
//! the user's persisted baseline, so expiry needs no scheduler. The
//! `prune_expired` sweep only reclaims storage.

use super::types::{
    AdjustmentKind, EffectiveState, LevelOverride, PruneReport, TemporaryAdjustment,
    ADJUSTMENT_KEY_PREFIX,
};
use crate::claims::ClaimHolder;
use crate::engine::{require_reason, ProgressionEngine};
use warga_badges::check_eligibility;
use warga_core::effects::{PhysicalTimeEffects, StorageEffects};
use warga_core::{
    AdjustmentId, BadgeId, PhysicalTime, RoleKind, UserId, WargaError, WargaResult,
};

impl<S, T> ProgressionEngine<S, T>
where
    S: StorageEffects,
    T: PhysicalTimeEffects,
{
    /// Grant temporary points on top of a user's baseline.
    ///
    /// Fails with `InvalidAmount` outside the configured range and
    /// `MissingReason` for a blank reason. The baseline balance is not
    /// touched.
    pub async fn grant_points(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        points: i64,
        reason: &str,
    ) -> WargaResult<TemporaryAdjustment> {
        let (min, max) = (self.config.min_temporary_points, self.config.max_temporary_points);
        if !(min..=max).contains(&points) {
            tracing::debug!(user_id = %user_id, points, "point grant rejected: amount out of range");
            return Err(WargaError::InvalidAmount {
                amount: points,
                min,
                max,
            });
        }
        let reason = require_reason(reason)?;
        self.load_user(user_id).await?;

        let adjustment = self
            .new_adjustment(admin_id, user_id, AdjustmentKind::Points(points), reason)
            .await?;
        self.record_adjustment(&adjustment).await?;

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user_id,
            points,
            expires_at_ms = adjustment.expires_at.ts_ms,
            "temporary points granted"
        );
        Ok(adjustment)
    }

    /// Grant a badge for the lifetime of a temporary adjustment.
    ///
    /// Checks, in order: the badge exists, the user's domicile falls inside
    /// the badge's scope, a reason is given, and a slot is free. The slot
    /// check and claim happen in one conditional write on the badge's claim
    /// record.
    pub async fn grant_badge(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        badge_id: &BadgeId,
        reason: &str,
    ) -> WargaResult<TemporaryAdjustment> {
        let badge = self.badges.require(badge_id)?;
        let user = self.load_user(user_id).await?;
        check_eligibility(badge, user.domicile.as_ref())?;
        let reason = require_reason(reason)?;

        let adjustment = self
            .new_adjustment(admin_id, user_id, AdjustmentKind::Badge(badge_id.clone()), reason)
            .await?;

        let holder = ClaimHolder {
            user_id: *user_id,
            adjustment_id: Some(adjustment.id),
            claimed_at: adjustment.granted_at,
            expires_at: Some(adjustment.expires_at),
        };
        if let Err(err) = self.acquire_claim(badge, holder).await {
            tracing::debug!(user_id = %user_id, badge_id = %badge_id, error = %err, "badge grant rejected");
            return Err(err);
        }

        if let Err(err) = self.record_adjustment(&adjustment).await {
            let adjustment_id = adjustment.id;
            if let Err(release_err) = self
                .release_claim(badge_id, |h| h.adjustment_id == Some(adjustment_id))
                .await
            {
                tracing::warn!(
                    badge_id = %badge_id,
                    error = %release_err,
                    "failed to release claim after grant write failed"
                );
            }
            return Err(err);
        }

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user_id,
            badge_id = %badge_id,
            expires_at_ms = adjustment.expires_at.ts_ms,
            "temporary badge granted"
        );
        Ok(adjustment)
    }

    /// Override the level a user is shown, without touching points.
    ///
    /// `role` names the catalog `level` is drawn from.
    pub async fn set_level(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        role: RoleKind,
        level: u8,
        reason: &str,
    ) -> WargaResult<TemporaryAdjustment> {
        self.tiers.catalog(role).require_tier(level)?;
        let reason = require_reason(reason)?;
        self.load_user(user_id).await?;

        let adjustment = self
            .new_adjustment(
                admin_id,
                user_id,
                AdjustmentKind::Level(LevelOverride { role, level }),
                reason,
            )
            .await?;
        self.record_adjustment(&adjustment).await?;

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user_id,
            role = %role,
            level,
            expires_at_ms = adjustment.expires_at.ts_ms,
            "temporary level override granted"
        );
        Ok(adjustment)
    }

    /// A user's standing at `now` with every active grant folded in.
    ///
    /// Pure read: expired records are skipped, never deleted.
    pub async fn effective_state(&self, user_id: &UserId, now: PhysicalTime) -> WargaResult<EffectiveState> {
        let user = self.load_user(user_id).await?;
        let active: Vec<TemporaryAdjustment> = self
            .load_adjustments()
            .await?
            .into_iter()
            .filter(|adj| &adj.target_user_id == user_id && adj.is_active(now))
            .collect();

        let mut points = user.points;
        let mut badges = user.badges.clone();
        let mut level_override: Option<&TemporaryAdjustment> = None;
        for adj in &active {
            match &adj.kind {
                AdjustmentKind::Points(amount) => points = points.saturating_add(*amount),
                AdjustmentKind::Badge(badge_id) => {
                    badges.insert(badge_id.clone());
                }
                AdjustmentKind::Level(_) => {
                    let newer = level_override
                        .map_or(true, |current| (adj.granted_at, adj.id) > (current.granted_at, current.id));
                    if newer {
                        level_override = Some(adj);
                    }
                }
            }
        }

        let overridden = level_override.and_then(|adj| match adj.kind {
            AdjustmentKind::Level(LevelOverride { role, level }) => self.tiers.catalog(role).tier(level),
            _ => None,
        });
        let (display_level, level_overridden) = match overridden {
            Some(tier) => (tier.clone(), true),
            None => (self.calculator().level_for(user.role.kind(), points).clone(), false),
        };

        Ok(EffectiveState {
            user_id: *user_id,
            role: user.role,
            baseline_points: user.points,
            points,
            badges,
            display_level,
            level_overridden,
            active_adjustments: active.len(),
            as_of: now,
        })
    }

    /// Effective state at the clock's current time.
    pub async fn effective_state_now(&self, user_id: &UserId) -> WargaResult<EffectiveState> {
        let now = self.now().await?;
        self.effective_state(user_id, now).await
    }

    /// Every adjustment active at `now`, soonest to expire first.
    pub async fn list_active(&self, now: PhysicalTime) -> WargaResult<Vec<TemporaryAdjustment>> {
        let mut active: Vec<_> = self
            .load_adjustments()
            .await?
            .into_iter()
            .filter(|adj| adj.is_active(now))
            .collect();
        active.sort_by_key(|adj| (adj.expires_at, adj.id));
        Ok(active)
    }

    /// Every retained adjustment for a user, newest first.
    pub async fn history_for(&self, user_id: &UserId) -> WargaResult<Vec<TemporaryAdjustment>> {
        let mut history: Vec<_> = self
            .load_adjustments()
            .await?
            .into_iter()
            .filter(|adj| &adj.target_user_id == user_id)
            .collect();
        history.sort_by(|a, b| (b.granted_at, b.id).cmp(&(a.granted_at, a.id)));
        Ok(history)
    }

    /// Look up one adjustment by id.
    pub async fn adjustment(&self, id: &AdjustmentId) -> WargaResult<Option<TemporaryAdjustment>> {
        match self.storage.retrieve(&super::types::adjustment_key(id)).await? {
            Some(bytes) => Ok(Some(TemporaryAdjustment::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete adjustment records and claim entries that expired before `now`.
    ///
    /// Only reclaims storage; effective state is the same before and after.
    pub async fn prune_expired(&self, now: PhysicalTime) -> WargaResult<PruneReport> {
        let mut report = PruneReport::default();
        for key in self.storage.list_keys(Some(ADJUSTMENT_KEY_PREFIX)).await? {
            let Some(bytes) = self.storage.retrieve(&key).await? else {
                continue;
            };
            let adjustment = TemporaryAdjustment::from_bytes(&bytes)?;
            if !adjustment.is_active(now) && self.storage.compare_and_remove(&key, &bytes).await? {
                report.adjustments_removed += 1;
            }
        }
        report.claim_holders_removed = self.prune_claims(now).await?;

        tracing::info!(
            adjustments_removed = report.adjustments_removed,
            claim_holders_removed = report.claim_holders_removed,
            "expired adjustments pruned"
        );
        Ok(report)
    }

    async fn new_adjustment(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        kind: AdjustmentKind,
        reason: String,
    ) -> WargaResult<TemporaryAdjustment> {
        let granted_at = self.now().await?;
        Ok(TemporaryAdjustment {
            id: AdjustmentId::new(),
            target_user_id: *user_id,
            kind,
            reason,
            granted_at,
            expires_at: granted_at.plus_ms(self.config.adjustment_ttl_ms),
            granted_by: *admin_id,
        })
    }

    // Insert-if-absent; a fresh v4 id colliding is treated as a conflict.
    async fn record_adjustment(&self, adjustment: &TemporaryAdjustment) -> WargaResult<()> {
        let key = adjustment.storage_key();
        let inserted = self
            .storage
            .compare_and_swap(&key, None, adjustment.to_bytes()?)
            .await?;
        if !inserted {
            return Err(WargaError::Conflict { key, attempts: 1 });
        }
        Ok(())
    }

    async fn load_adjustments(&self) -> WargaResult<Vec<TemporaryAdjustment>> {
        let keys = self.storage.list_keys(Some(ADJUSTMENT_KEY_PREFIX)).await?;
        let mut adjustments = Vec::with_capacity(keys.len());
        for key in keys {
            // Pruned between listing and reading.
            if let Some(bytes) = self.storage.retrieve(&key).await? {
                adjustments.push(TemporaryAdjustment::from_bytes(&bytes)?);
            }
        }
        Ok(adjustments)
    }
}
