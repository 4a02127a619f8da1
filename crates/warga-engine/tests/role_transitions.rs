//! Integration tests for the moderator role state machine

use assert_matches::assert_matches;
use warga_core::{Role, RoleKind, UserRecord, WargaError};
use warga_effects::MemoryStorageHandler;
use warga_engine::{EngineConfig, ProgressionEngine};
use warga_testkit::{
    seeded_storage, test_admin, test_admin_id, test_user, test_user_id, ControllableClock,
    TEST_EPOCH_MS,
};

type TestEngine = ProgressionEngine<MemoryStorageHandler, ControllableClock>;

async fn setup_with(config: EngineConfig) -> TestEngine {
    let storage = seeded_storage([
        test_admin(1),
        test_user(1),
        UserRecord::new(test_user_id(2), "veteran", Role::User).with_points(1_500),
    ])
    .await;
    ProgressionEngine::new(
        storage,
        ControllableClock::new(TEST_EPOCH_MS),
        config,
        std::sync::Arc::new(warga_progression::TierCatalogSet::builtin().clone()),
        std::sync::Arc::new(warga_badges::BadgeCatalog::bundled().unwrap().clone()),
    )
    .unwrap()
}

async fn setup() -> TestEngine {
    setup_with(EngineConfig::default()).await
}

#[tokio::test]
async fn test_promote_to_moderator_tier_3_seeds_points() {
    let engine = setup().await;

    let record = engine
        .promote_to_moderator(&test_admin_id(1), &test_user_id(1), 3)
        .await
        .unwrap();
    assert_eq!(record.role, Role::Moderator { tier: 3 });
    assert_eq!(record.role.moderator_tier(), Some(3));
    assert_eq!(record.points, 501);

    // Persisted, and the displayed level matches the tier.
    let state = engine.effective_state_now(&test_user_id(1)).await.unwrap();
    assert_eq!(state.role.kind(), RoleKind::Moderator);
    assert_eq!(state.display_level.level, 3);
    assert_eq!(state.display_level.name, "Moderator Senior");
}

#[tokio::test]
async fn test_promote_tier_bounds() {
    let engine = setup().await;
    let (admin, user) = (test_admin_id(1), test_user_id(1));

    assert_matches!(
        engine.promote_to_moderator(&admin, &user, 0).await,
        Err(WargaError::InvalidTier { tier: 0, max: 5 })
    );
    assert_matches!(
        engine.promote_to_moderator(&admin, &user, 6).await,
        Err(WargaError::InvalidTier { tier: 6, max: 5 })
    );
    assert_eq!(engine.load_user(&user).await.unwrap().role, Role::User);

    assert!(engine.promote_to_moderator(&admin, &user, 1).await.is_ok());
    assert!(engine.promote_to_moderator(&admin, &user, 5).await.is_ok());
}

#[tokio::test]
async fn test_retier_existing_moderator() {
    let engine = setup().await;
    let (admin, user) = (test_admin_id(1), test_user_id(1));

    engine.promote_to_moderator(&admin, &user, 4).await.unwrap();
    let record = engine.promote_to_moderator(&admin, &user, 2).await.unwrap();
    assert_eq!(record.role, Role::Moderator { tier: 2 });
    assert_eq!(record.points, 201);
}

#[tokio::test]
async fn test_promotion_without_seeding_keeps_points() {
    let engine = setup_with(EngineConfig {
        seed_points_on_promotion: false,
        ..EngineConfig::default()
    })
    .await;

    let record = engine
        .promote_to_moderator(&test_admin_id(1), &test_user_id(2), 1)
        .await
        .unwrap();
    assert_eq!(record.role, Role::Moderator { tier: 1 });
    assert_eq!(record.points, 1_500);
}

#[tokio::test]
async fn test_demote_keeps_points() {
    let engine = setup().await;
    let (admin, user) = (test_admin_id(1), test_user_id(1));

    engine.promote_to_moderator(&admin, &user, 3).await.unwrap();
    let record = engine.demote_from_moderator(&admin, &user).await.unwrap();
    assert_eq!(record.role, Role::User);
    assert_eq!(record.points, 501);

    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.display_level.name, "Tokoh Masyarakat");
}

#[tokio::test]
async fn test_invalid_transitions() {
    let engine = setup().await;
    let admin = test_admin_id(1);

    assert_matches!(
        engine.demote_from_moderator(&admin, &test_user_id(1)).await,
        Err(WargaError::InvalidTransition { .. })
    );
    assert_matches!(
        engine.promote_to_moderator(&admin, &admin, 2).await,
        Err(WargaError::InvalidTransition { .. })
    );
    assert_matches!(
        engine.demote_from_moderator(&admin, &admin).await,
        Err(WargaError::InvalidTransition { .. })
    );
    assert_eq!(engine.load_user(&admin).await.unwrap().role, Role::Admin);
}

#[tokio::test]
async fn test_transition_on_missing_user() {
    let engine = setup().await;
    assert_matches!(
        engine
            .promote_to_moderator(&test_admin_id(1), &test_user_id(77), 2)
            .await,
        Err(WargaError::UserNotFound { .. })
    );
}
