//! Warga Engine - temporary grants, badge claims and role transitions
//!
//! [`ProgressionEngine`] is the one stateful component. It is generic over
//! the storage and clock collaborators and owns nothing but the immutable
//! tier and badge catalogs; every record lives in storage.
//!
//! - `adjustments`: the append-only temporary adjustment ledger and the
//!   effective-state fold over it
//! - `claims`: per-badge holder records that enforce assignment capacity
//! - `assignments`: durable badge assignment and revocation
//! - `roles`: the user/moderator role state machine
//! - `config`: [`EngineConfig`]
//!
//! # Concurrency
//!
//! Every write is a conditional write against the key it changes, retried
//! up to `max_write_attempts` times. Reads never write.

pub mod adjustments;
pub mod assignments;
pub mod claims;
pub mod config;
pub mod engine;
pub mod roles;

pub use adjustments::{
    AdjustmentKind, EffectiveState, LevelOverride, PruneReport, TemporaryAdjustment,
};
pub use claims::{claim_key, BadgeClaim, ClaimHolder, CLAIM_KEY_PREFIX};
pub use config::EngineConfig;
pub use engine::ProgressionEngine;
