//! Physical time
//!
//! Wall-clock instants in milliseconds since the UNIX epoch. All expiry
//! arithmetic in the engine is done on these values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One hour in milliseconds.
pub const HOUR_MS: u64 = 60 * 60 * 1000;

/// One day in milliseconds.
pub const DAY_MS: u64 = 24 * HOUR_MS;

/// Wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the UNIX epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create from milliseconds since the UNIX epoch.
    pub const fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Timestamp `ms` milliseconds later, saturating at the end of time.
    pub fn plus_ms(self, ms: u64) -> Self {
        Self {
            ts_ms: self.ts_ms.saturating_add(ms),
        }
    }

    /// Whether this instant is strictly before `other`.
    pub fn is_before(&self, other: &PhysicalTime) -> bool {
        self.ts_ms < other.ts_ms
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
