//! Warga Badges - geography index and the generated badge catalog
//!
//! - `GeographyIndex`: the city's kecamatan/kelurahan list with postal codes
//! - `BadgeCatalog`: every assignable badge, derived from the geography
//! - Validation: scope filtering (`available_for`), eligibility and capacity
//!
//! # Singleton badges
//!
//! RT, RW, Lurah and Camat badges model real offices and allow exactly one
//! holder at a time. Kader and custom badges are unlimited. The catalog
//! only answers "could one more holder fit"; the engine enforces it
//! against live assignments.
//!
//! ```ignore
//! use warga_badges::{BadgeCatalog, BadgeScope};
//!
//! let catalog = BadgeCatalog::bundled()?;
//! let mine = catalog.available_for(&BadgeScope::new("02", "005", Some(2)));
//! ```

pub mod catalog;
pub mod geography;
pub mod validation;

pub use catalog::{
    camat_badge_id, lurah_badge_id, rt_badge_id, rw_badge_id, BadgeCatalog, BadgeType,
    ValidatedBadge, UNLIMITED_ASSIGNMENTS,
};
pub use geography::{GeoArea, GeographyIndex, Kecamatan, Kelurahan, RT_PER_RW, RW_PER_KELURAHAN};
pub use validation::{
    capacity_check, check_eligibility, ensure_capacity, AssignmentCheck, BadgeScope,
};
