//! Integration tests for failed-login lockout and its release.

use chrono::Duration;
use uuid::Uuid;

use acctguard_auth::FailureResult;
use acctguard_entity::audit::AuditEventType;
use acctguard_entity::user::{LockState, LockoutType, UserAuthRecord};

use crate::helpers::{TestApp, request, start_time};

#[tokio::test]
async fn test_fifth_failure_locks_and_sweep_releases() {
    let app = TestApp::new();
    let mut seeded = UserAuthRecord::new("mchen", "HRO");
    seeded.failed_login_attempts = 4;
    let user = app.users.insert(seeded).await;

    let result = app
        .gate
        .check_and_record_failure(user.id, &request())
        .await
        .unwrap();
    match result {
        FailureResult::Recorded(outcome) => {
            assert!(outcome.locked);
            assert_eq!(outcome.lockout_type, Some(LockoutType::Standard));
            assert_eq!(outcome.remaining_attempts, 0);
        }
        other => panic!("expected a lock, got {other:?}"),
    }

    let locked = app.user(user.id).await;
    assert_eq!(
        locked.login_locked_until,
        Some(start_time() + Duration::minutes(30))
    );
    assert!(!locked.active);
    assert_eq!(app.audit.events_of(AuditEventType::AccountLocked).await.len(), 1);

    app.clock.advance(Duration::minutes(31));
    let summary = app.run_job("auto_unlock").await;
    assert_eq!(summary["accounts_unlocked"], 1);

    let released = app.user(user.id).await;
    assert!(released.active);
    assert_eq!(released.failed_login_attempts, 0);
    assert_eq!(released.login_lockout_type, None);
    assert_eq!(released.login_locked_until, None);
    assert_eq!(released.lock_state(), LockState::Unlocked);
}

#[tokio::test]
async fn test_sweep_leaves_security_and_manual_locks() {
    let app = TestApp::new();
    let admin = Uuid::new_v4();

    let mut seeded = UserAuthRecord::new("brute", "HRO");
    seeded.failed_login_attempts = 10;
    let brute = app.users.insert(seeded).await;
    app.gate
        .check_and_record_failure(brute.id, &request())
        .await
        .unwrap();
    assert_eq!(app.user(brute.id).await.lock_state(), LockState::Security);

    let held = app.create_test_user("held", "HRO").await;
    app.gate
        .lock_manually(held.id, admin, "Pending investigation", None)
        .await
        .unwrap();

    app.clock.advance(Duration::days(2));
    let summary = app.run_job("auto_unlock").await;
    assert_eq!(summary["accounts_unlocked"], 0);

    assert_eq!(app.user(brute.id).await.lock_state(), LockState::Security);
    assert!(app.user(held.id).await.is_manually_locked);
    assert!(app.gate.lockout_status(held.id).await.unwrap().locked);
}

#[tokio::test]
async fn test_admin_unlock_restores_login() {
    let app = TestApp::new();
    let admin = Uuid::new_v4();
    let mut seeded = UserAuthRecord::new("brute", "HRO");
    seeded.failed_login_attempts = 10;
    let user = app.users.insert(seeded).await;
    app.gate
        .check_and_record_failure(user.id, &request())
        .await
        .unwrap();

    let blocked = app
        .gate
        .check_and_record_failure(user.id, &request())
        .await
        .unwrap();
    assert!(matches!(blocked, FailureResult::Blocked { .. }));
    assert_eq!(app.user(user.id).await.failed_login_attempts, 11);

    app.gate
        .unlock(user.id, admin, "Identity confirmed")
        .await
        .unwrap();
    let session = app.login(user.id).await;
    assert_eq!(session.user_id, user.id);

    let unlocked = app.audit.events_of(AuditEventType::AccountUnlocked).await;
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].extra["previous_lockout_type"], "SECURITY");
    assert_eq!(unlocked[0].extra["previous_failed_attempts"], 11);
}
