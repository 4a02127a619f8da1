//! Integration tests for the temporary adjustment ledger
//!
//! Covers:
//! - Point grants and the 24h expiry of their effect
//! - Amount, reason, level and user validation
//! - Level overrides versus point grants in effective state
//! - Active listing, per-user history and the prune sweep

use assert_matches::assert_matches;
use warga_core::effects::StorageEffects;
use warga_core::{BadgeId, Role, RoleKind, UserId, UserRecord, WargaError, DAY_MS, HOUR_MS};
use warga_effects::MemoryStorageHandler;
use warga_engine::{AdjustmentKind, EngineConfig, ProgressionEngine};
use warga_testkit::{
    seeded_storage, test_admin, test_admin_id, test_user, test_user_id, ControllableClock,
    TEST_EPOCH_MS,
};

// ============================================================================
// Test Helpers
// ============================================================================

type TestEngine = ProgressionEngine<MemoryStorageHandler, ControllableClock>;

async fn setup() -> (TestEngine, ControllableClock) {
    let storage = seeded_storage([test_admin(1), test_user(1), test_user(2)]).await;
    let clock = ControllableClock::new(TEST_EPOCH_MS);
    let engine = ProgressionEngine::with_defaults(storage, clock.clone()).unwrap();
    (engine, clock)
}

fn admin() -> UserId {
    test_admin_id(1)
}

// ============================================================================
// Point grants
// ============================================================================

#[tokio::test]
async fn test_grant_500_points_lasts_24_hours() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    let adjustment = engine.grant_points(&admin(), &user, 500, "test").await.unwrap();
    assert_eq!(adjustment.kind, AdjustmentKind::Points(500));
    assert_eq!(adjustment.expires_at.ts_ms, TEST_EPOCH_MS + DAY_MS);
    assert_eq!(adjustment.granted_by, admin());

    let state = engine.effective_state(&user, clock.now()).await.unwrap();
    assert_eq!(state.points, 500);
    assert_eq!(state.baseline_points, 0);
    assert_eq!(state.display_level.name, "Tokoh Masyarakat");
    assert_eq!(state.display_level.min_points, 301);
    assert_eq!(state.display_level.max_points, 600);
    assert!(!state.level_overridden);

    clock.advance_ms(DAY_MS - 1);
    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.points, 500);

    clock.advance_ms(1);
    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.points, 0);
    assert_eq!(state.display_level.name, "Pendatang Baru");
    assert_eq!(state.active_adjustments, 0);

    // Baseline never moved.
    assert_eq!(engine.load_user(&user).await.unwrap().points, 0);
}

#[tokio::test]
async fn test_grant_points_amount_bounds() {
    let (engine, _clock) = setup().await;
    let user = test_user_id(1);

    assert_matches!(
        engine.grant_points(&admin(), &user, 600, "x").await,
        Err(WargaError::InvalidAmount { amount: 600, min: 1, max: 500 })
    );
    assert_matches!(
        engine.grant_points(&admin(), &user, 0, "x").await,
        Err(WargaError::InvalidAmount { .. })
    );
    assert_matches!(
        engine.grant_points(&admin(), &user, -5, "x").await,
        Err(WargaError::InvalidAmount { .. })
    );
    assert!(engine.grant_points(&admin(), &user, 1, "x").await.is_ok());
    assert!(engine.grant_points(&admin(), &user, 500, "x").await.is_ok());
}

#[tokio::test]
async fn test_amount_checked_before_reason() {
    let (engine, _clock) = setup().await;
    assert_matches!(
        engine.grant_points(&admin(), &test_user_id(1), 501, "").await,
        Err(WargaError::InvalidAmount { .. })
    );
}

#[tokio::test]
async fn test_blank_reason_rejected_for_every_grant() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    assert_matches!(
        engine.grant_points(&admin(), &user, 10, "").await,
        Err(WargaError::MissingReason)
    );
    assert_matches!(
        engine.grant_points(&admin(), &user, 10, "   \t").await,
        Err(WargaError::MissingReason)
    );
    assert_matches!(
        engine
            .grant_badge(&admin(), &user, &BadgeId::new("kader-pkk"), "")
            .await,
        Err(WargaError::MissingReason)
    );
    assert_matches!(
        engine.set_level(&admin(), &user, RoleKind::User, 3, " ").await,
        Err(WargaError::MissingReason)
    );

    assert!(engine.list_active(clock.now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reason_is_trimmed() {
    let (engine, _clock) = setup().await;
    let adjustment = engine
        .grant_points(&admin(), &test_user_id(1), 25, "  kerja bakti RW 02 ")
        .await
        .unwrap();
    assert_eq!(adjustment.reason, "kerja bakti RW 02");
}

#[tokio::test]
async fn test_grant_to_missing_user() {
    let (engine, _clock) = setup().await;
    let err = engine
        .grant_points(&admin(), &test_user_id(42), 10, "x")
        .await
        .unwrap_err();
    assert_matches!(err, WargaError::UserNotFound { .. });
}

#[tokio::test]
async fn test_point_grants_accumulate() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    engine.grant_points(&admin(), &user, 100, "a").await.unwrap();
    clock.advance_ms(HOUR_MS);
    engine.grant_points(&admin(), &user, 100, "b").await.unwrap();

    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.points, 200);
    assert_eq!(state.display_level.name, "Relawan");
    assert_eq!(state.active_adjustments, 2);

    // First grant lapses an hour before the second.
    clock.set_ms(TEST_EPOCH_MS + DAY_MS);
    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.points, 100);
    assert_eq!(state.active_adjustments, 1);
}

#[tokio::test]
async fn test_configured_limits_apply() {
    let storage = seeded_storage([test_user(1)]).await;
    let clock = ControllableClock::new(TEST_EPOCH_MS);
    let engine = ProgressionEngine::new(
        storage,
        clock.clone(),
        EngineConfig {
            adjustment_ttl_ms: HOUR_MS,
            max_temporary_points: 100,
            ..EngineConfig::default()
        },
        std::sync::Arc::new(warga_progression::TierCatalogSet::builtin().clone()),
        std::sync::Arc::new(warga_badges::BadgeCatalog::bundled().unwrap().clone()),
    )
    .unwrap();

    assert_matches!(
        engine.grant_points(&admin(), &test_user_id(1), 101, "x").await,
        Err(WargaError::InvalidAmount { max: 100, .. })
    );
    let adjustment = engine.grant_points(&admin(), &test_user_id(1), 100, "x").await.unwrap();
    assert_eq!(adjustment.expires_at.ts_ms, TEST_EPOCH_MS + HOUR_MS);
}

// ============================================================================
// Level overrides
// ============================================================================

#[tokio::test]
async fn test_set_level_overrides_display_only() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    engine.grant_points(&admin(), &user, 100, "poin").await.unwrap();
    engine
        .set_level(&admin(), &user, RoleKind::User, 6, "acara kota")
        .await
        .unwrap();

    let state = engine.effective_state(&user, clock.now()).await.unwrap();
    assert_eq!(state.display_level.level, 6);
    assert_eq!(state.display_level.name, "Pahlawan Lingkungan");
    assert!(state.level_overridden);
    assert_eq!(state.points, 100);
    assert_eq!(state.baseline_points, 0);

    clock.advance_ms(DAY_MS);
    let state = engine.effective_state_now(&user).await.unwrap();
    assert!(!state.level_overridden);
    assert_eq!(state.display_level.level, 1);
}

#[tokio::test]
async fn test_set_level_range_follows_role_catalog() {
    let (engine, _clock) = setup().await;
    let user = test_user_id(1);

    assert!(engine.set_level(&admin(), &user, RoleKind::User, 7, "x").await.is_ok());
    assert_matches!(
        engine.set_level(&admin(), &user, RoleKind::Moderator, 6, "x").await,
        Err(WargaError::InvalidLevel { level: 6, max: 5, .. })
    );
    assert_matches!(
        engine.set_level(&admin(), &user, RoleKind::Admin, 4, "x").await,
        Err(WargaError::InvalidLevel { max: 3, .. })
    );
    assert_matches!(
        engine.set_level(&admin(), &user, RoleKind::User, 0, "x").await,
        Err(WargaError::InvalidLevel { .. })
    );
}

#[tokio::test]
async fn test_latest_level_override_wins() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    engine.set_level(&admin(), &user, RoleKind::User, 5, "first").await.unwrap();
    clock.advance_ms(1_000);
    engine.set_level(&admin(), &user, RoleKind::User, 2, "second").await.unwrap();

    let state = engine.effective_state_now(&user).await.unwrap();
    assert_eq!(state.display_level.level, 2);

    // The earlier override lapses first; the later one holds for another second.
    clock.set_ms(TEST_EPOCH_MS + DAY_MS);
    let state = engine.effective_state_now(&user).await.unwrap();
    assert!(state.level_overridden);
    assert_eq!(state.display_level.level, 2);
}

// ============================================================================
// Effective state
// ============================================================================

#[tokio::test]
async fn test_effective_state_is_a_pure_read() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);
    engine.grant_points(&admin(), &user, 50, "x").await.unwrap();

    clock.advance_ms(2 * DAY_MS);
    let keys_before = engine.storage().list_keys(None).await.unwrap();
    let first = engine.effective_state_now(&user).await.unwrap();
    let second = engine.effective_state_now(&user).await.unwrap();
    let keys_after = engine.storage().list_keys(None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(keys_before, keys_after);
    assert_eq!(engine.history_for(&user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_effective_state_uses_role_catalog() {
    let storage = seeded_storage([UserRecord::new(test_user_id(7), "mod", Role::Moderator { tier: 2 })
        .with_points(300)])
    .await;
    let engine = ProgressionEngine::with_defaults(storage, ControllableClock::new(TEST_EPOCH_MS)).unwrap();

    let state = engine.effective_state_now(&test_user_id(7)).await.unwrap();
    assert_eq!(state.display_level.name, "Moderator Muda");
    assert_eq!(state.role, Role::Moderator { tier: 2 });
}

#[tokio::test]
async fn test_grants_are_per_user() {
    let (engine, clock) = setup().await;
    engine.grant_points(&admin(), &test_user_id(1), 300, "x").await.unwrap();

    let other = engine.effective_state(&test_user_id(2), clock.now()).await.unwrap();
    assert_eq!(other.points, 0);
    assert_eq!(other.active_adjustments, 0);
}

// ============================================================================
// Listing, history and pruning
// ============================================================================

#[tokio::test]
async fn test_list_active_soonest_expiry_first() {
    let (engine, clock) = setup().await;

    let first = engine.grant_points(&admin(), &test_user_id(1), 10, "a").await.unwrap();
    clock.advance_ms(HOUR_MS);
    let second = engine.grant_points(&admin(), &test_user_id(2), 20, "b").await.unwrap();
    clock.advance_ms(HOUR_MS);
    let third = engine
        .grant_badge(&admin(), &test_user_id(1), &BadgeId::new("kader-posyandu"), "c")
        .await
        .unwrap();

    let active = engine.list_active(clock.now()).await.unwrap();
    let ids: Vec<_> = active.iter().map(|adj| adj.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    clock.set_ms(TEST_EPOCH_MS + DAY_MS + HOUR_MS);
    let active = engine.list_active(clock.now()).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, third.id);
}

#[tokio::test]
async fn test_history_newest_first_includes_expired() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    let old = engine.grant_points(&admin(), &user, 10, "old").await.unwrap();
    clock.advance_ms(2 * DAY_MS);
    let new = engine.set_level(&admin(), &user, RoleKind::User, 3, "new").await.unwrap();
    engine.grant_points(&admin(), &test_user_id(2), 10, "other").await.unwrap();

    let history = engine.history_for(&user).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, new.id);
    assert_eq!(history[1].id, old.id);
    let stored = engine.adjustment(&old.id).await.unwrap();
    assert_eq!(stored, Some(old));
}

#[tokio::test]
async fn test_prune_only_reclaims_storage() {
    let (engine, clock) = setup().await;
    let user = test_user_id(1);

    engine.grant_points(&admin(), &user, 10, "lapses").await.unwrap();
    engine
        .grant_badge(&admin(), &user, &BadgeId::new("rw-02-005-02"), "lapses")
        .await
        .unwrap();
    clock.advance_ms(DAY_MS);
    engine.grant_points(&admin(), &user, 40, "stays").await.unwrap();

    let before = engine.effective_state_now(&user).await.unwrap();
    let report = engine.prune_expired(clock.now()).await.unwrap();
    let after = engine.effective_state_now(&user).await.unwrap();

    assert_eq!(report.adjustments_removed, 2);
    assert_eq!(report.claim_holders_removed, 1);
    assert_eq!(before, after);
    assert_eq!(after.points, 40);
    assert_eq!(engine.history_for(&user).await.unwrap().len(), 1);

    let again = engine.prune_expired(clock.now()).await.unwrap();
    assert_eq!(again.adjustments_removed, 0);
    assert_eq!(again.claim_holders_removed, 0);
}
