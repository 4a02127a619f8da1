//! Assignment validation
//!
//! Scope filtering, per-user eligibility and capacity checks over a
//! [`BadgeCatalog`]. These checks are pure; the engine runs the capacity
//! check inside its conditional write so the count it sees is current.

use crate::catalog::{BadgeCatalog, BadgeType, ValidatedBadge};
use serde::{Deserialize, Serialize};
use warga_core::{BadgeId, Domicile, WargaError, WargaResult};

/// Geographic filter for badge availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeScope {
    /// Kecamatan code
    pub kecamatan: Option<String>,
    /// Kelurahan code
    pub kelurahan: Option<String>,
    /// RW number
    pub rw: Option<u8>,
}

impl BadgeScope {
    /// Scope down to an RW.
    pub fn new(kecamatan: impl Into<String>, kelurahan: impl Into<String>, rw: Option<u8>) -> Self {
        Self {
            kecamatan: Some(kecamatan.into()),
            kelurahan: Some(kelurahan.into()),
            rw,
        }
    }

    /// Scope matching only unscoped badges.
    pub fn unscoped() -> Self {
        Self::default()
    }

    fn admits(&self, badge: &ValidatedBadge) -> bool {
        field_admits(badge.kecamatan.as_ref(), self.kecamatan.as_ref())
            && field_admits(badge.kelurahan.as_ref(), self.kelurahan.as_ref())
            && field_admits(badge.rw.as_ref(), self.rw.as_ref())
    }
}

impl From<&Domicile> for BadgeScope {
    fn from(domicile: &Domicile) -> Self {
        Self {
            kecamatan: Some(domicile.kecamatan.clone()),
            kelurahan: Some(domicile.kelurahan.clone()),
            rw: domicile.rw,
        }
    }
}

// Unset badge field admits anything; a set field needs an exact match.
fn field_admits<T: PartialEq>(badge_field: Option<&T>, scope_field: Option<&T>) -> bool {
    match badge_field {
        None => true,
        Some(required) => scope_field == Some(required),
    }
}

/// Outcome of a capacity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCheck {
    /// Whether another holder may be added
    pub ok: bool,
    /// Why not, when `ok` is false
    pub reason: Option<String>,
}

impl AssignmentCheck {
    fn allowed() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

impl BadgeCatalog {
    /// Badges whose scope fields are unset or equal to the given scope.
    /// Kader and custom badges carry no scope and always pass.
    pub fn available_for(&self, scope: &BadgeScope) -> Vec<&ValidatedBadge> {
        self.badges()
            .iter()
            .filter(|badge| {
                matches!(badge.badge_type, BadgeType::Kader | BadgeType::Custom)
                    || scope.admits(badge)
            })
            .collect()
    }

    /// Look a badge up or fail with `UnknownBadge`.
    pub fn require(&self, badge_id: &BadgeId) -> WargaResult<&ValidatedBadge> {
        self.get(badge_id)
            .ok_or_else(|| WargaError::unknown_badge(badge_id.as_str()))
    }

    /// Whether one more holder fits, given the number of active holders.
    pub fn can_assign(&self, badge_id: &BadgeId, current_assignment_count: u32) -> AssignmentCheck {
        match self.get(badge_id) {
            None => AssignmentCheck::denied(format!("badge {badge_id} is not in the catalog")),
            Some(badge) => capacity_check(badge, current_assignment_count),
        }
    }
}

/// Capacity check for a known badge.
pub fn capacity_check(badge: &ValidatedBadge, current_assignment_count: u32) -> AssignmentCheck {
    if current_assignment_count >= badge.max_assignments {
        if badge.is_singleton() {
            AssignmentCheck::denied(format!("{} is already held by another user", badge.name))
        } else {
            AssignmentCheck::denied(format!(
                "{} already has {current_assignment_count} of {} holders",
                badge.name, badge.max_assignments
            ))
        }
    } else {
        AssignmentCheck::allowed()
    }
}

/// Capacity check as a `Result`, failing with `CapacityExceeded`.
pub fn ensure_capacity(badge: &ValidatedBadge, current_assignment_count: u32) -> WargaResult<()> {
    let check = capacity_check(badge, current_assignment_count);
    if check.ok {
        return Ok(());
    }
    Err(WargaError::capacity_exceeded(
        badge.id.as_str(),
        check.reason.unwrap_or_default(),
    ))
}

/// Check that a badge's geographic scope matches a user's domicile.
pub fn check_eligibility(badge: &ValidatedBadge, domicile: Option<&Domicile>) -> WargaResult<()> {
    if badge.kecamatan.is_none() && badge.kelurahan.is_none() && badge.rw.is_none() {
        return Ok(());
    }

    let Some(domicile) = domicile else {
        return Err(WargaError::badge_not_eligible(
            badge.id.as_str(),
            "user has no recorded domicile",
        ));
    };

    if let Some(kecamatan) = &badge.kecamatan {
        if &domicile.kecamatan != kecamatan {
            return Err(WargaError::badge_not_eligible(
                badge.id.as_str(),
                format!("user lives in kecamatan {}, badge is for {kecamatan}", domicile.kecamatan),
            ));
        }
    }
    if let Some(kelurahan) = &badge.kelurahan {
        if &domicile.kelurahan != kelurahan {
            return Err(WargaError::badge_not_eligible(
                badge.id.as_str(),
                format!("user lives in kelurahan {}, badge is for {kelurahan}", domicile.kelurahan),
            ));
        }
    }
    if let Some(rw) = badge.rw {
        if domicile.rw != Some(rw) {
            return Err(WargaError::badge_not_eligible(
                badge.id.as_str(),
                format!("badge is for RW {rw:02}"),
            ));
        }
    }
    Ok(())
}
