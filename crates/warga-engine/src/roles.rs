//! Role assignment manager
//!
//! Durable role transitions. Callers are expected to have confirmed that
//! `actor_id` is an admin; the checks here only concern the target state.
//!
//! ```text
//!   user ──promote(t)──▶ moderator{t} ──promote(t')──▶ moderator{t'}
//!     ▲                       │
//!     └──────demote───────────┘
//! ```
//!
//! Admins are outside this state machine and cannot be promoted or
//! demoted here.

use crate::engine::ProgressionEngine;
use warga_core::effects::{PhysicalTimeEffects, StorageEffects};
use warga_core::{Role, RoleKind, UserId, UserRecord, WargaError, WargaResult};

impl<S, T> ProgressionEngine<S, T>
where
    S: StorageEffects,
    T: PhysicalTimeEffects,
{
    /// Make a user a moderator at `tier`, or re-tier an existing moderator.
    ///
    /// When `seed_points_on_promotion` is set the baseline balance becomes
    /// the tier's `min_points`, so the displayed level matches the tier.
    pub async fn promote_to_moderator(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        tier: u8,
    ) -> WargaResult<UserRecord> {
        let catalog = self.tiers.catalog(RoleKind::Moderator);
        let seed = match catalog.tier(tier) {
            Some(level) => level.min_points,
            None => {
                return Err(WargaError::InvalidTier {
                    tier,
                    max: catalog.max_level(),
                })
            }
        };
        let seed_points = self.config.seed_points_on_promotion;

        let record = self
            .update_user(user_id, |user| {
                if user.role.is_admin() {
                    return Err(WargaError::invalid_transition(
                        user.role.to_string(),
                        "promote to moderator",
                    ));
                }
                user.role = Role::Moderator { tier };
                if seed_points {
                    user.points = seed;
                }
                Ok(())
            })
            .await?;

        tracing::info!(
            actor_id = %actor_id,
            user_id = %user_id,
            tier,
            points = record.points,
            "user promoted to moderator"
        );
        Ok(record)
    }

    /// Return a moderator to the plain user role. Points are kept.
    pub async fn demote_from_moderator(&self, actor_id: &UserId, user_id: &UserId) -> WargaResult<UserRecord> {
        let record = self
            .update_user(user_id, |user| {
                if user.role.kind() != RoleKind::Moderator {
                    return Err(WargaError::invalid_transition(
                        user.role.to_string(),
                        "demote from moderator",
                    ));
                }
                user.role = Role::User;
                Ok(())
            })
            .await?;

        tracing::info!(actor_id = %actor_id, user_id = %user_id, "moderator demoted to user");
        Ok(record)
    }
}
