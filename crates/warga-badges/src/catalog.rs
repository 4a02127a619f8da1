//! Badge catalog generator
//!
//! The catalog is derived, not stored: for every kelurahan it synthesizes
//! RW and RT office badges plus a Lurah badge, one Camat badge per
//! kecamatan, and a fixed set of unlimited kader and achievement badges.
//! Ids are composed from geography codes, so regenerating from the same
//! geography always yields the same ids.

use crate::geography::{GeographyIndex, Kecamatan, Kelurahan};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use warga_core::{BadgeId, WargaResult};

/// `max_assignments` of badges without a holder limit.
pub const UNLIMITED_ASSIGNMENTS: u32 = u32::MAX;

static BUNDLED_CATALOG: Lazy<WargaResult<BadgeCatalog>> =
    Lazy::new(|| GeographyIndex::bundled().map(BadgeCatalog::generate));

/// Kind of badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeType {
    /// Head of an RT (block)
    Rt,
    /// Head of an RW (ward)
    Rw,
    /// Village head
    Lurah,
    /// Sub-district head
    Camat,
    /// Thematic volunteer role
    Kader,
    /// Achievement or programme badge
    Custom,
}

impl BadgeType {
    /// Whether the badge models a unique administrative office.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            BadgeType::Rt | BadgeType::Rw | BadgeType::Lurah | BadgeType::Camat
        )
    }
}

/// An assignable badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedBadge {
    /// Stable id, e.g. `rt-02-005-02-003`
    pub id: BadgeId,
    /// Display name
    pub name: String,
    /// Kind of badge
    #[serde(rename = "type")]
    pub badge_type: BadgeType,
    /// Kecamatan scope
    pub kecamatan: Option<String>,
    /// Kelurahan scope
    pub kelurahan: Option<String>,
    /// RW scope
    pub rw: Option<u8>,
    /// RT scope
    pub rt: Option<u16>,
    /// How many users may hold it at once
    pub max_assignments: u32,
    /// Whether holders must have a verified NIK (national id number)
    pub requires_nik: bool,
}

impl ValidatedBadge {
    /// Whether the badge is limited to one holder.
    pub fn is_singleton(&self) -> bool {
        self.max_assignments == 1
    }

    /// Whether the badge has any holder limit.
    pub fn is_limited(&self) -> bool {
        self.max_assignments != UNLIMITED_ASSIGNMENTS
    }

    fn office(
        id: BadgeId,
        name: String,
        badge_type: BadgeType,
        kecamatan: &Kecamatan,
        kelurahan: Option<&Kelurahan>,
        rw: Option<u8>,
        rt: Option<u16>,
    ) -> Self {
        Self {
            id,
            name,
            badge_type,
            kecamatan: Some(kecamatan.code.clone()),
            kelurahan: kelurahan.map(|k| k.code.clone()),
            rw,
            rt,
            max_assignments: 1,
            requires_nik: true,
        }
    }

    fn unlimited(id: &str, name: &str, badge_type: BadgeType) -> Self {
        Self {
            id: BadgeId::new(id),
            name: name.to_string(),
            badge_type,
            kecamatan: None,
            kelurahan: None,
            rw: None,
            rt: None,
            max_assignments: UNLIMITED_ASSIGNMENTS,
            requires_nik: false,
        }
    }
}

/// Id of an RT head badge.
pub fn rt_badge_id(kecamatan: &str, kelurahan: &str, rw: u8, rt: u16) -> BadgeId {
    BadgeId::new(format!("rt-{kecamatan}-{kelurahan}-{rw:02}-{rt:03}"))
}

/// Id of an RW head badge.
pub fn rw_badge_id(kecamatan: &str, kelurahan: &str, rw: u8) -> BadgeId {
    BadgeId::new(format!("rw-{kecamatan}-{kelurahan}-{rw:02}"))
}

/// Id of a Lurah badge.
pub fn lurah_badge_id(kecamatan: &str, kelurahan: &str) -> BadgeId {
    BadgeId::new(format!("lurah-{kecamatan}-{kelurahan}"))
}

/// Id of a Camat badge.
pub fn camat_badge_id(kecamatan: &str) -> BadgeId {
    BadgeId::new(format!("camat-{kecamatan}"))
}

fn unlimited_badges() -> Vec<ValidatedBadge> {
    vec![
        ValidatedBadge::unlimited("kader-posyandu", "Kader Posyandu", BadgeType::Kader),
        ValidatedBadge::unlimited("kader-pkk", "Kader PKK", BadgeType::Kader),
        ValidatedBadge::unlimited("kader-jumantik", "Kader Jumantik", BadgeType::Kader),
        ValidatedBadge::unlimited("kader-lingkungan", "Kader Lingkungan", BadgeType::Kader),
        ValidatedBadge::unlimited("kader-siaga-bencana", "Kader Siaga Bencana", BadgeType::Kader),
        ValidatedBadge::unlimited("pelapor-teladan", "Pelapor Teladan", BadgeType::Custom),
        ValidatedBadge::unlimited("pahlawan-kebersihan", "Pahlawan Kebersihan", BadgeType::Custom),
    ]
}

/// The generated badge catalog with an id index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeCatalog {
    badges: Vec<ValidatedBadge>,
    index: HashMap<BadgeId, usize>,
}

impl BadgeCatalog {
    /// Generate the catalog for a geography.
    pub fn generate(geography: &GeographyIndex) -> Self {
        let mut badges = Vec::new();

        for kecamatan in geography.kecamatan() {
            badges.push(ValidatedBadge::office(
                camat_badge_id(&kecamatan.code),
                format!("Camat {}", kecamatan.name),
                BadgeType::Camat,
                kecamatan,
                None,
                None,
                None,
            ));

            for kelurahan in &kecamatan.kelurahan {
                badges.push(ValidatedBadge::office(
                    lurah_badge_id(&kecamatan.code, &kelurahan.code),
                    format!("Lurah {}", kelurahan.name),
                    BadgeType::Lurah,
                    kecamatan,
                    Some(kelurahan),
                    None,
                    None,
                ));

                for rw in geography.rw_numbers() {
                    badges.push(ValidatedBadge::office(
                        rw_badge_id(&kecamatan.code, &kelurahan.code, rw),
                        format!("Ketua RW {rw:02} {}", kelurahan.name),
                        BadgeType::Rw,
                        kecamatan,
                        Some(kelurahan),
                        Some(rw),
                        None,
                    ));

                    for rt in geography.rt_numbers() {
                        badges.push(ValidatedBadge::office(
                            rt_badge_id(&kecamatan.code, &kelurahan.code, rw, rt),
                            format!("Ketua RT {rt:03}/RW {rw:02} {}", kelurahan.name),
                            BadgeType::Rt,
                            kecamatan,
                            Some(kelurahan),
                            Some(rw),
                            Some(rt),
                        ));
                    }
                }
            }
        }

        badges.extend(unlimited_badges());
        Self::from_badges(badges)
    }

    fn from_badges(badges: Vec<ValidatedBadge>) -> Self {
        let index = badges
            .iter()
            .enumerate()
            .map(|(position, badge)| (badge.id.clone(), position))
            .collect();
        Self { badges, index }
    }

    /// Catalog for the bundled geography, generated once.
    pub fn bundled() -> WargaResult<&'static BadgeCatalog> {
        BUNDLED_CATALOG.as_ref().map_err(Clone::clone)
    }

    /// Every badge, offices first in geography order, then unlimited badges.
    pub fn badges(&self) -> &[ValidatedBadge] {
        &self.badges
    }

    /// Number of badges.
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    /// Badge by id.
    pub fn get(&self, id: &BadgeId) -> Option<&ValidatedBadge> {
        self.index.get(id).map(|&position| &self.badges[position])
    }

    /// Badge by id string.
    pub fn get_str(&self, id: &str) -> Option<&ValidatedBadge> {
        self.get(&BadgeId::new(id))
    }

    /// Whether `id` is in the catalog.
    pub fn contains(&self, id: &BadgeId) -> bool {
        self.index.contains_key(id)
    }
}
