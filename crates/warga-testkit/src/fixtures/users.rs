//! User fixtures
//!
//! Ids are derived from a seed byte so tests can refer to the same user
//! from several places without passing ids around.

use warga_core::effects::StorageEffects;
use warga_core::{Domicile, Role, UserId, UserRecord};
use warga_effects::MemoryStorageHandler;

/// Fixed starting instant for test clocks (2023-11-14T22:13:20Z).
pub const TEST_EPOCH_MS: u64 = 1_700_000_000_000;

/// User id for a seed.
pub fn test_user_id(seed: u8) -> UserId {
    UserId::from_bytes([seed; 16])
}

/// Admin id for a seed. Kept apart from user ids by the high bit.
pub fn test_admin_id(seed: u8) -> UserId {
    UserId::from_bytes([seed | 0x80; 16])
}

/// Kelurahan Dago (Coblong), RW 02, RT 003 in the bundled geography.
pub fn dago_rw02_domicile() -> Domicile {
    Domicile::new("02", "005").with_rw(2).with_rt(3)
}

/// Plain user at zero points living in Dago RW 02.
pub fn test_user(seed: u8) -> UserRecord {
    UserRecord::new(test_user_id(seed), format!("warga-{seed}"), Role::User)
        .with_domicile(dago_rw02_domicile())
}

/// Admin record.
pub fn test_admin(seed: u8) -> UserRecord {
    UserRecord::new(test_admin_id(seed), format!("admin-{seed}"), Role::Admin)
}

/// Write `user` into storage and hand it back.
pub async fn seed_user<S: StorageEffects + ?Sized>(storage: &S, user: UserRecord) -> UserRecord {
    storage
        .store(&user.storage_key(), user.to_bytes().unwrap())
        .await
        .unwrap();
    user
}

/// Fresh in-memory storage holding `users`.
pub async fn seeded_storage(users: impl IntoIterator<Item = UserRecord>) -> MemoryStorageHandler {
    let storage = MemoryStorageHandler::new();
    for user in users {
        seed_user(&storage, user).await;
    }
    storage
}
