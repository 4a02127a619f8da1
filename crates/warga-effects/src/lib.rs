//! Warga Effects - handlers for the core effect traits
//!
//! - `MemoryStorageHandler`: in-process key-value store with atomic
//!   conditional writes
//! - `PhysicalTimeHandler`: system wall clock
//!
//! Controllable clocks for tests live in `warga-testkit`.

pub mod storage;
pub mod time;

pub use storage::MemoryStorageHandler;
pub use time::PhysicalTimeHandler;
