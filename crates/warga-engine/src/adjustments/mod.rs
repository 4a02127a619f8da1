//! Temporary adjustments: record types and the ledger operations

mod ledger;
pub mod types;

pub use types::{
    adjustment_key, AdjustmentKind, EffectiveState, LevelOverride, PruneReport,
    TemporaryAdjustment, ADJUSTMENT_KEY_PREFIX,
};
