//! Effect traits for the external collaborators
//!
//! The engine never talks to a database or the system clock directly. It
//! is generic over these traits; handlers live in `warga-effects` and test
//! doubles in `warga-testkit`.

pub mod storage;
pub mod time;

pub use storage::{StorageEffects, StorageError};
pub use time::{PhysicalTimeEffects, TimeError};
