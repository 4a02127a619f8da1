//! Warga Core - shared types for the civic-volunteer progression engine
//!
//! This crate holds everything the other Warga crates agree on:
//!
//! - Identifiers: `UserId`, `AdjustmentId`, `BadgeId`
//! - Roles: `RoleKind` catalog keys and the durable `Role` variant
//! - The persisted `UserRecord` and its `Domicile`
//! - `PhysicalTime` and the expiry arithmetic built on it
//! - `WargaError`, the single error type with a machine-readable `ErrorKind`
//! - Effect traits for the storage and clock collaborators
//!
//! # Architecture
//!
//! Core has no knowledge of tiers, badges or the adjustment ledger. Those
//! live in `warga-progression`, `warga-badges` and `warga-engine`, which
//! depend on this crate and never on each other's handlers.

pub mod effects;
pub mod errors;
pub mod identifiers;
pub mod role;
pub mod time;
pub mod user;

pub use effects::{PhysicalTimeEffects, StorageEffects, StorageError, TimeError};
pub use errors::{ErrorKind, WargaError, WargaResult};
pub use identifiers::{AdjustmentId, BadgeId, UserId};
pub use role::{Role, RoleKind};
pub use time::{PhysicalTime, DAY_MS, HOUR_MS};
pub use user::{user_key, Domicile, UserRecord, USER_KEY_PREFIX};
