//! Tier catalogs
//!
//! Each role has its own ordered list of level tiers. Tiers are contiguous
//! point ranges: `tier[i].max_points + 1 == tier[i + 1].min_points`, levels
//! run 1..=n, and the last tier is open-ended (`max_points ==
//! POINTS_UNBOUNDED`). Catalogs are validated on construction and never
//! mutated afterwards; a different product configuration is a new
//! [`TierCatalogSet`] with a new version.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use warga_core::{RoleKind, WargaError, WargaResult};

/// Sentinel `max_points` of a terminal tier.
pub const POINTS_UNBOUNDED: i64 = i64::MAX;

/// Version of the built-in catalogs.
pub const BUILTIN_CATALOG_VERSION: u32 = 1;

/// One level bracket of a role's progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTier {
    /// 1-based level number
    pub level: u8,
    /// Display name
    pub name: String,
    /// Lowest balance in this tier (inclusive)
    pub min_points: i64,
    /// Highest balance in this tier (inclusive), `POINTS_UNBOUNDED` for the last tier
    #[serde(default = "unbounded")]
    pub max_points: i64,
    /// Perks unlocked at this tier, in display order
    #[serde(default)]
    pub perks: Vec<String>,
    /// Badge glyph shown next to the name
    pub badge: String,
    /// Multiplier applied to point awards at this tier
    #[serde(default = "unit_multiplier")]
    pub multiplier: f64,
}

fn unbounded() -> i64 {
    POINTS_UNBOUNDED
}

fn unit_multiplier() -> f64 {
    1.0
}

impl LevelTier {
    /// Whether this tier has no upper bound.
    pub fn is_terminal(&self) -> bool {
        self.max_points == POINTS_UNBOUNDED
    }

    /// Whether `points` lies inside this tier's range.
    pub fn contains(&self, points: i64) -> bool {
        points >= self.min_points && points <= self.max_points
    }
}

fn tier(
    level: u8,
    name: &str,
    min_points: i64,
    max_points: i64,
    badge: &str,
    multiplier: f64,
    perks: &[&str],
) -> LevelTier {
    LevelTier {
        level,
        name: name.to_string(),
        min_points,
        max_points,
        perks: perks.iter().map(|p| p.to_string()).collect(),
        badge: badge.to_string(),
        multiplier,
    }
}

/// Validated, ordered tier list for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCatalog {
    role: RoleKind,
    tiers: Vec<LevelTier>,
}

impl TierCatalog {
    /// Build a catalog, checking ordering, contiguity and the terminal sentinel.
    pub fn new(role: RoleKind, tiers: Vec<LevelTier>) -> WargaResult<Self> {
        if tiers.is_empty() {
            return Err(WargaError::config(format!("{role} catalog has no tiers")));
        }
        if tiers.len() > u8::MAX as usize {
            return Err(WargaError::config(format!("{role} catalog has too many tiers")));
        }

        for (index, t) in tiers.iter().enumerate() {
            let expected_level = index + 1;
            if t.level as usize != expected_level {
                return Err(WargaError::config(format!(
                    "{role} tier at position {expected_level} has level {}",
                    t.level
                )));
            }
            if t.min_points > t.max_points {
                return Err(WargaError::config(format!(
                    "{role} tier {} has min_points above max_points",
                    t.level
                )));
            }
            if t.multiplier.is_nan() || t.multiplier < 1.0 {
                return Err(WargaError::config(format!(
                    "{role} tier {} has multiplier below 1.0",
                    t.level
                )));
            }
        }

        for pair in tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.max_points == POINTS_UNBOUNDED || lower.max_points + 1 != upper.min_points {
                return Err(WargaError::config(format!(
                    "{role} tiers {} and {} are not contiguous",
                    lower.level, upper.level
                )));
            }
        }

        if let Some(last) = tiers.last() {
            if !last.is_terminal() {
                return Err(WargaError::config(format!(
                    "{role} terminal tier {} must be unbounded",
                    last.level
                )));
            }
        }

        Ok(Self { role, tiers })
    }

    /// Role this catalog belongs to.
    pub fn role(&self) -> RoleKind {
        self.role
    }

    /// Tiers in ascending level order.
    pub fn tiers(&self) -> &[LevelTier] {
        &self.tiers
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Catalogs are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Highest level number.
    pub fn max_level(&self) -> u8 {
        self.tiers.len() as u8
    }

    /// Lowest tier.
    pub fn lowest(&self) -> &LevelTier {
        &self.tiers[0]
    }

    /// Tier with the given level number.
    pub fn tier(&self, level: u8) -> Option<&LevelTier> {
        if level == 0 {
            return None;
        }
        self.tiers.get(level as usize - 1)
    }

    /// Tier with the given level, or `InvalidLevel`.
    pub fn require_tier(&self, level: u8) -> WargaResult<&LevelTier> {
        self.tier(level).ok_or_else(|| WargaError::InvalidLevel {
            role: self.role.to_string(),
            level,
            max: self.max_level(),
        })
    }

    /// Tier following `tier`, if any.
    pub fn next_after(&self, tier: &LevelTier) -> Option<&LevelTier> {
        self.tiers.get(tier.level as usize)
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalogSet {
    version: u32,
    user: Vec<LevelTier>,
    moderator: Vec<LevelTier>,
    admin: Vec<LevelTier>,
}

/// The three role catalogs as one versioned unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCatalogSet {
    version: u32,
    user: TierCatalog,
    moderator: TierCatalog,
    admin: TierCatalog,
}

impl TierCatalogSet {
    /// Assemble a set from already-built catalogs.
    pub fn new(
        version: u32,
        user: TierCatalog,
        moderator: TierCatalog,
        admin: TierCatalog,
    ) -> WargaResult<Self> {
        let pairs = [
            (RoleKind::User, &user),
            (RoleKind::Moderator, &moderator),
            (RoleKind::Admin, &admin),
        ];
        for (expected, catalog) in pairs {
            if catalog.role() != expected {
                return Err(WargaError::config(format!(
                    "catalog for {} supplied in the {expected} slot",
                    catalog.role()
                )));
            }
        }
        Ok(Self {
            version,
            user,
            moderator,
            admin,
        })
    }

    /// Load and validate a catalog set from TOML.
    ///
    /// ```toml
    /// version = 2
    /// [[user]]
    /// level = 1
    /// name = "Pendatang Baru"
    /// min_points = 0
    /// max_points = 50
    /// badge = "🌱"
    /// ```
    pub fn from_toml_str(input: &str) -> WargaResult<Self> {
        let raw: RawCatalogSet =
            toml::from_str(input).map_err(|e| WargaError::config(e.to_string()))?;
        Self::new(
            raw.version,
            TierCatalog::new(RoleKind::User, raw.user)?,
            TierCatalog::new(RoleKind::Moderator, raw.moderator)?,
            TierCatalog::new(RoleKind::Admin, raw.admin)?,
        )
    }

    /// The built-in catalogs, created once per process.
    pub fn builtin() -> &'static TierCatalogSet {
        &BUILTIN_CATALOGS
    }

    /// Configuration version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Catalog for a role.
    pub fn catalog(&self, role: RoleKind) -> &TierCatalog {
        match role {
            RoleKind::User => &self.user,
            RoleKind::Moderator => &self.moderator,
            RoleKind::Admin => &self.admin,
        }
    }
}

static BUILTIN_CATALOGS: Lazy<TierCatalogSet> = Lazy::new(|| TierCatalogSet {
    version: BUILTIN_CATALOG_VERSION,
    user: TierCatalog {
        role: RoleKind::User,
        tiers: user_levels(),
    },
    moderator: TierCatalog {
        role: RoleKind::Moderator,
        tiers: moderator_levels(),
    },
    admin: TierCatalog {
        role: RoleKind::Admin,
        tiers: admin_levels(),
    },
});

fn user_levels() -> Vec<LevelTier> {
    vec![
        tier(1, "Pendatang Baru", 0, 50, "🌱", 1.0, &[
            "Membuat laporan warga",
            "Mengikuti kegiatan",
        ]),
        tier(2, "Warga Aktif", 51, 150, "🏠", 1.0, &[
            "Memberi komentar pada laporan",
            "Profil publik",
        ]),
        tier(3, "Relawan", 151, 300, "🤝", 1.1, &[
            "Mendaftar sebagai relawan kegiatan",
            "Lencana relawan di profil",
        ]),
        tier(4, "Tokoh Masyarakat", 301, 600, "⭐", 1.2, &[
            "Mengusulkan kegiatan baru",
            "Prioritas verifikasi laporan",
        ]),
        tier(5, "Penggerak Komunitas", 601, 1000, "🔥", 1.3, &[
            "Membuat kegiatan sendiri",
            "Mengundang warga ke kegiatan",
        ]),
        tier(6, "Pahlawan Lingkungan", 1001, 2000, "🏅", 1.4, &[
            "Sorotan di papan peringkat kota",
            "Undangan forum musrenbang",
        ]),
        tier(7, "Legenda Kota", 2001, POINTS_UNBOUNDED, "👑", 1.5, &[
            "Semua fitur warga",
            "Penghargaan tahunan wali kota",
        ]),
    ]
}

fn moderator_levels() -> Vec<LevelTier> {
    vec![
        tier(1, "Moderator Pemula", 0, 200, "🛡️", 1.2, &[
            "Memverifikasi laporan warga",
        ]),
        tier(2, "Moderator Muda", 201, 500, "🛡️", 1.4, &[
            "Memverifikasi laporan warga",
            "Menandai laporan duplikat",
        ]),
        tier(3, "Moderator Senior", 501, 1000, "⚔️", 1.6, &[
            "Menyetujui kegiatan",
            "Menyembunyikan konten bermasalah",
        ]),
        tier(4, "Moderator Ahli", 1001, 2000, "🏆", 1.8, &[
            "Membimbing moderator baru",
            "Menutup laporan selesai",
        ]),
        tier(5, "Kepala Moderator", 2001, POINTS_UNBOUNDED, "👑", 2.0, &[
            "Semua wewenang moderator",
            "Koordinasi antar kelurahan",
        ]),
    ]
}

fn admin_levels() -> Vec<LevelTier> {
    vec![
        tier(1, "Admin", 0, 1000, "🔧", 2.0, &[
            "Mengelola pengguna",
            "Memberi poin dan lencana sementara",
        ]),
        tier(2, "Admin Senior", 1001, 5000, "🗝️", 2.5, &[
            "Mengangkat moderator",
            "Mengelola lencana wilayah",
        ]),
        tier(3, "Super Admin", 5001, POINTS_UNBOUNDED, "👑", 3.0, &[
            "Akses penuh platform",
        ]),
    ]
}
