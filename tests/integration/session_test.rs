//! Integration tests for the concurrent-session cap and session cleanup.

use chrono::Duration;

use crate::helpers::{TestApp, start_time};

#[tokio::test]
async fn test_fourth_login_evicts_first_session() {
    let app = TestApp::new();
    let user = app.create_test_user("jdoe", "HRO").await;

    let t1 = app.login(user.id).await;
    app.clock.advance(Duration::minutes(10));
    let t2 = app.login(user.id).await;
    app.clock.advance(Duration::minutes(10));
    let t3 = app.login(user.id).await;
    assert_eq!(app.registry.count(user.id).await, 3);

    app.clock.advance(Duration::minutes(10));
    let t4 = app.login(user.id).await;

    assert_eq!(app.registry.count(user.id).await, 3);
    assert!(app.gate.authenticate(&t1.session_token).await.is_none());

    let ids: Vec<_> = app
        .gate
        .list_active_sessions(user.id)
        .await
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![t4.id, t3.id, t2.id]);
    assert_eq!(t4.device_info, "Mac");
}

#[tokio::test]
async fn test_cleanup_job_removes_expired_sessions() {
    let app = TestApp::new();
    let user = app.create_test_user("jdoe", "HRO").await;
    let old = app.login(user.id).await;
    app.clock.advance(Duration::hours(23));
    let fresh = app.login(user.id).await;

    app.clock.advance(Duration::hours(2));
    let summary = app.run_job("session_cleanup").await;
    assert_eq!(summary["expired_sessions_removed"], 1);

    assert!(app.gate.authenticate(&old.session_token).await.is_none());
    let validated = app.gate.authenticate(&fresh.session_token).await.unwrap();
    assert_eq!(validated.session.expires_at, fresh.expires_at);
    assert_eq!(
        validated.session.last_activity,
        start_time() + Duration::hours(25)
    );
}

#[tokio::test]
async fn test_logout_ends_only_that_session() {
    let app = TestApp::new();
    let user = app.create_test_user("jdoe", "HRO").await;
    let a = app.login(user.id).await;
    let b = app.login(user.id).await;

    assert!(app.gate.logout(&a.session_token).await);
    assert!(!app.gate.logout(&a.session_token).await);
    assert!(app.gate.authenticate(&b.session_token).await.is_some());
    assert_eq!(app.sessions.len().await, 1);
}
