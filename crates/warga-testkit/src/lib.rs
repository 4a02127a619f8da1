//! Warga Testing Infrastructure
//!
//! Shared setup for tests across the workspace: a clock the test drives by
//! hand, fixtures for users and admins, and storage wrappers for driving
//! write conflicts.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! warga-testkit = { path = "../warga-testkit" }
//! ```
//!
//! ```rust,no_run
//! use warga_testkit::*;
//!
//! async fn setup() {
//!     let clock = ControllableClock::new(TEST_EPOCH_MS);
//!     let storage = seeded_storage([test_user(1), test_admin(1)]).await;
//!     clock.advance_ms(1_000);
//!     assert_eq!(storage.len().await, 2);
//! }
//! ```

pub mod fixtures;
pub mod storage;
pub mod time;

pub use fixtures::{
    dago_rw02_domicile, seed_user, seeded_storage, test_admin, test_admin_id, test_user, test_user_id,
    TEST_EPOCH_MS,
};
pub use storage::InterleavedStorage;
pub use time::ControllableClock;
