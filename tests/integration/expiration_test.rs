//! Integration tests for password expiration at login.

use chrono::Duration;

use acctguard_auth::LoginOutcome;
use acctguard_entity::audit::AuditEventType;
use acctguard_entity::user::UserAuthRecord;

use crate::helpers::{TestApp, request, start_time};

#[tokio::test]
async fn test_grace_period_then_password_change() {
    let app = TestApp::new();
    let mut seeded = UserAuthRecord::new("root", "Admin");
    seeded.password_expires_at = Some(start_time() - Duration::hours(1));
    let user = app.users.insert(seeded).await;

    let first = app
        .gate
        .record_success_and_issue_session(user.id, &request())
        .await
        .unwrap();
    assert!(first.is_granted());
    assert_eq!(
        app.audit.events_of(AuditEventType::GracePeriodStarted).await.len(),
        1
    );

    app.clock.advance(Duration::days(8));
    let denied = app
        .gate
        .record_success_and_issue_session(user.id, &request())
        .await
        .unwrap();
    assert!(matches!(denied, LoginOutcome::PasswordExpired { .. }));

    let expires_at = app.gate.password_changed(user.id).await.unwrap();
    assert_eq!(expires_at, start_time() + Duration::days(8) + Duration::days(60));

    let stored = app.user(user.id).await;
    assert!(stored.grace_period_started_at.is_none());
    assert_eq!(stored.last_expiration_warning_level, 0);

    let again = app
        .gate
        .record_success_and_issue_session(user.id, &request())
        .await
        .unwrap();
    match again {
        LoginOutcome::Granted { expiration, warn, .. } => {
            assert!(!expiration.is_expired);
            assert_eq!(expiration.days_until_expiration, Some(60));
            assert!(!warn);
        }
        other => panic!("expected a session, got {other:?}"),
    }
}

#[tokio::test]
async fn test_lowercase_admin_gets_standard_window() {
    let app = TestApp::new();
    let user = app.create_test_user("ops", "admin").await;

    let expires_at = app.gate.password_changed(user.id).await.unwrap();
    assert_eq!(expires_at, start_time() + Duration::days(90));
    assert_eq!(
        app.gate
            .expiration_status(user.id)
            .await
            .unwrap()
            .expiration_period_days,
        90
    );
}
