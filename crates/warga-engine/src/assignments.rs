//! Durable badge assignment
//!
//! Unlike a temporary grant, a durable assignment lands in the user's
//! baseline badge set and holds a non-expiring claim until revoked.

use crate::claims::ClaimHolder;
use crate::engine::{require_reason, ProgressionEngine};
use warga_badges::check_eligibility;
use warga_core::effects::{PhysicalTimeEffects, StorageEffects};
use warga_core::{BadgeId, UserId, UserRecord, WargaError, WargaResult};

impl<S, T> ProgressionEngine<S, T>
where
    S: StorageEffects,
    T: PhysicalTimeEffects,
{
    /// Add a badge to a user's baseline.
    ///
    /// Validates like [`grant_badge`](Self::grant_badge). The claim is
    /// taken before the user record is written and given back if that
    /// write fails.
    pub async fn assign_badge(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        badge_id: &BadgeId,
        reason: &str,
    ) -> WargaResult<UserRecord> {
        let badge = self.badges.require(badge_id)?;
        let user = self.load_user(user_id).await?;
        check_eligibility(badge, user.domicile.as_ref())?;
        let reason = require_reason(reason)?;

        let now = self.now().await?;
        let holder = ClaimHolder {
            user_id: *user_id,
            adjustment_id: None,
            claimed_at: now,
            expires_at: None,
        };
        self.acquire_claim(badge, holder).await?;
        if user.badges.contains(badge_id) {
            return Ok(user);
        }

        let written = self
            .update_user(user_id, |user| {
                user.badges.insert(badge_id.clone());
                Ok(())
            })
            .await;
        let record = match written {
            Ok(record) => record,
            Err(err) => {
                self.release_durable_claim(user_id, badge_id).await;
                return Err(err);
            }
        };

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user_id,
            badge_id = %badge_id,
            reason = %reason,
            "badge assigned"
        );
        Ok(record)
    }

    /// Remove a durably assigned badge and free its slot.
    ///
    /// The badge leaves the user record first. If the claim cannot be
    /// released afterwards the badge is put back, so the record and the
    /// claim never disagree. Temporary grants of the same badge are
    /// unaffected and lapse on their own.
    pub async fn revoke_badge(
        &self,
        admin_id: &UserId,
        user_id: &UserId,
        badge_id: &BadgeId,
        reason: &str,
    ) -> WargaResult<UserRecord> {
        self.badges.require(badge_id)?;
        let reason = require_reason(reason)?;
        let record = self
            .update_user(user_id, |user| {
                if !user.badges.remove(badge_id) {
                    return Err(WargaError::badge_not_eligible(
                        badge_id.to_string(),
                        "badge is not held by this user",
                    ));
                }
                Ok(())
            })
            .await?;

        let target = *user_id;
        if let Err(err) = self
            .release_claim(badge_id, |holder| holder.user_id == target && holder.is_durable())
            .await
        {
            self.restore_badge(user_id, badge_id).await;
            return Err(err);
        }

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user_id,
            badge_id = %badge_id,
            reason = %reason,
            "badge revoked"
        );
        Ok(record)
    }

    async fn restore_badge(&self, user_id: &UserId, badge_id: &BadgeId) {
        let restored = self
            .update_user(user_id, |user| {
                user.badges.insert(badge_id.clone());
                Ok(())
            })
            .await;
        if let Err(err) = restored {
            tracing::warn!(badge_id = %badge_id, error = %err, "failed to restore badge after claim release failed");
        }
    }

    async fn release_durable_claim(&self, user_id: &UserId, badge_id: &BadgeId) {
        let target = *user_id;
        if let Err(err) = self
            .release_claim(badge_id, |holder| holder.user_id == target && holder.is_durable())
            .await
        {
            tracing::warn!(badge_id = %badge_id, error = %err, "failed to release claim after assignment failed");
        }
    }
}
