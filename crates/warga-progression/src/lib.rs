//! Warga Progression - tier catalogs and the progression calculator
//!
//! Three immutable catalogs (user: 7 tiers, moderator: 5, admin: 3) map a
//! point balance to a named level with perks and an award multiplier.
//!
//! ```ignore
//! use warga_core::RoleKind;
//! use warga_progression::{level_for, progress};
//!
//! let tier = level_for(RoleKind::User, 500);
//! assert_eq!(tier.name, "Tokoh Masyarakat");
//!
//! let p = progress(RoleKind::User, 500);
//! println!("{}% toward {:?}", p.percent, p.next.map(|t| &t.name));
//! ```

pub mod calculator;
pub mod tiers;

pub use calculator::{level_for, multiplier, progress, Progress, ProgressionCalculator};
pub use tiers::{LevelTier, TierCatalog, TierCatalogSet, BUILTIN_CATALOG_VERSION, POINTS_UNBOUNDED};
