//! Test fixtures

mod users;

pub use users::{
    dago_rw02_domicile, seed_user, seeded_storage, test_admin, test_admin_id, test_user, test_user_id,
    TEST_EPOCH_MS,
};
