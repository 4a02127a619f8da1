//! Engine handle and user record access
//!
//! [`ProgressionEngine`] bundles the storage and clock collaborators with
//! the immutable catalogs. The ledger, claim registry and role manager are
//! implemented as `impl` blocks on it in their own modules.

use crate::config::EngineConfig;
use std::sync::Arc;
use warga_badges::BadgeCatalog;
use warga_core::effects::{PhysicalTimeEffects, StorageEffects};
use warga_core::{user_key, PhysicalTime, UserId, UserRecord, WargaError, WargaResult};
use warga_progression::{ProgressionCalculator, TierCatalogSet};

/// The progression and temporary-authorization engine.
pub struct ProgressionEngine<S, T> {
    pub(crate) storage: S,
    pub(crate) clock: T,
    pub(crate) config: EngineConfig,
    pub(crate) tiers: Arc<TierCatalogSet>,
    pub(crate) badges: Arc<BadgeCatalog>,
}

impl<S, T> ProgressionEngine<S, T>
where
    S: StorageEffects,
    T: PhysicalTimeEffects,
{
    /// Create an engine over explicit catalogs.
    pub fn new(
        storage: S,
        clock: T,
        config: EngineConfig,
        tiers: Arc<TierCatalogSet>,
        badges: Arc<BadgeCatalog>,
    ) -> WargaResult<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            clock,
            config,
            tiers,
            badges,
        })
    }

    /// Create an engine over the built-in tiers and the bundled geography.
    pub fn with_defaults(storage: S, clock: T) -> WargaResult<Self> {
        Self::new(
            storage,
            clock,
            EngineConfig::default(),
            Arc::new(TierCatalogSet::builtin().clone()),
            Arc::new(BadgeCatalog::bundled()?.clone()),
        )
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Badge catalog in use.
    pub fn badge_catalog(&self) -> &BadgeCatalog {
        &self.badges
    }

    /// Tier catalogs in use.
    pub fn tier_catalogs(&self) -> &TierCatalogSet {
        &self.tiers
    }

    /// Calculator over this engine's tier catalogs.
    pub fn calculator(&self) -> ProgressionCalculator<'_> {
        ProgressionCalculator::new(&self.tiers)
    }

    /// Storage handler.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) async fn now(&self) -> WargaResult<PhysicalTime> {
        Ok(self.clock.physical_time().await?)
    }

    /// Read a user record.
    pub async fn load_user(&self, user_id: &UserId) -> WargaResult<UserRecord> {
        let bytes = self
            .storage
            .retrieve(&user_key(user_id))
            .await?
            .ok_or_else(|| WargaError::user_not_found(user_id))?;
        Ok(UserRecord::from_bytes(&bytes)?)
    }

    /// Atomically read-modify-write a user record.
    ///
    /// `apply` runs against the current record and may reject it; the
    /// write only lands if nobody changed the record in between, otherwise
    /// the whole step is retried on the fresh record.
    pub(crate) async fn update_user<F>(&self, user_id: &UserId, mut apply: F) -> WargaResult<UserRecord>
    where
        F: FnMut(&mut UserRecord) -> WargaResult<()> + Send,
    {
        let key = user_key(user_id);
        for _ in 0..self.config.max_write_attempts {
            let current = self
                .storage
                .retrieve(&key)
                .await?
                .ok_or_else(|| WargaError::user_not_found(user_id))?;
            let mut record = UserRecord::from_bytes(&current)?;
            apply(&mut record)?;
            let updated = record.to_bytes()?;
            if self
                .storage
                .compare_and_swap(&key, Some(&current), updated)
                .await?
            {
                return Ok(record);
            }
            tracing::debug!(user_id = %user_id, "user record changed concurrently, retrying");
        }
        Err(WargaError::Conflict {
            key,
            attempts: self.config.max_write_attempts,
        })
    }
}

/// Trim a grant reason, rejecting blank ones.
pub(crate) fn require_reason(reason: &str) -> WargaResult<String> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(WargaError::missing_reason());
    }
    Ok(trimmed.to_string())
}
