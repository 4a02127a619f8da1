//! Progression calculator
//!
//! Resolves a point balance into a tier, progress toward the next tier and
//! the award multiplier. Everything here is a pure function of the catalog
//! set and its inputs.

use crate::tiers::{LevelTier, TierCatalogSet};
use serde::Serialize;
use warga_core::{RoleKind, WargaResult};

/// Progress of a balance within its tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress<'a> {
    /// Tier the balance resolves to
    pub current: &'a LevelTier,
    /// Following tier, `None` at the terminal tier
    pub next: Option<&'a LevelTier>,
    /// Position within the current tier, in `[0, 100]`
    pub percent: f64,
    /// Points still needed to reach `next`, zero at the terminal tier
    pub points_to_next: i64,
}

/// Calculator over a catalog set.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionCalculator<'a> {
    catalogs: &'a TierCatalogSet,
}

impl Default for ProgressionCalculator<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProgressionCalculator<'static> {
    /// Calculator over the built-in catalogs.
    pub fn builtin() -> Self {
        Self {
            catalogs: TierCatalogSet::builtin(),
        }
    }
}

impl<'a> ProgressionCalculator<'a> {
    /// Calculator over a specific catalog set.
    pub fn new(catalogs: &'a TierCatalogSet) -> Self {
        Self { catalogs }
    }

    /// Catalog set in use.
    pub fn catalogs(&self) -> &'a TierCatalogSet {
        self.catalogs
    }

    /// Tier for a balance.
    ///
    /// Scans from the highest level down and returns the first tier whose
    /// `min_points` is reached, so a balance sitting exactly on a boundary
    /// belongs to the tier that starts there. Negative balances resolve to
    /// the lowest tier.
    pub fn level_for(&self, role: RoleKind, points: i64) -> &'a LevelTier {
        let catalog = self.catalogs.catalog(role);
        catalog
            .tiers()
            .iter()
            .rev()
            .find(|tier| tier.min_points <= points)
            .unwrap_or_else(|| catalog.lowest())
    }

    /// Tier for a balance, with the role given by name.
    pub fn level_for_named(&self, role: &str, points: i64) -> WargaResult<&'a LevelTier> {
        let role: RoleKind = role.parse()?;
        Ok(self.level_for(role, points))
    }

    /// Progress of a balance toward the next tier.
    pub fn progress(&self, role: RoleKind, points: i64) -> Progress<'a> {
        let catalog = self.catalogs.catalog(role);
        let current = self.level_for(role, points);

        let Some(next) = catalog.next_after(current) else {
            return Progress {
                current,
                next: None,
                percent: 100.0,
                points_to_next: 0,
            };
        };

        let span = (current.max_points - current.min_points) as f64;
        let percent = if span <= 0.0 {
            if points >= current.min_points {
                100.0
            } else {
                0.0
            }
        } else {
            ((points - current.min_points) as f64 / span * 100.0).clamp(0.0, 100.0)
        };

        Progress {
            current,
            next: Some(next),
            percent,
            points_to_next: next.min_points.saturating_sub(points).max(0),
        }
    }

    /// Award multiplier for a balance.
    pub fn multiplier(&self, role: RoleKind, points: i64) -> f64 {
        self.level_for(role, points).multiplier
    }

    /// Scale a base award by the multiplier of the given balance, rounding down.
    pub fn scaled_award(&self, role: RoleKind, points: i64, base_award: i64) -> i64 {
        (base_award as f64 * self.multiplier(role, points)).floor() as i64
    }
}

/// Tier for a balance in the built-in catalogs.
pub fn level_for(role: RoleKind, points: i64) -> &'static LevelTier {
    ProgressionCalculator::builtin().level_for(role, points)
}

/// Progress in the built-in catalogs.
pub fn progress(role: RoleKind, points: i64) -> Progress<'static> {
    ProgressionCalculator::builtin().progress(role, points)
}

/// Multiplier in the built-in catalogs.
pub fn multiplier(role: RoleKind, points: i64) -> f64 {
    ProgressionCalculator::builtin().multiplier(role, points)
}
