//! End-to-end session lifecycle over the in-memory repository.
//!
//! Run with: `cargo test --features mocks --test lifecycle`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use warden::{
    AdminSessionAction, AuthorizeAction, CleanupAction, CreateSessionOptions,
    MockSessionRepository, OpenSessionAction, SessionError, SessionPolicy, SessionRepository,
    SignOutAction, UserSessionsAction,
};

#[tokio::test]
async fn sign_in_authorize_sign_out_round_trip() {
    let repo = MockSessionRepository::new();

    let session = OpenSessionAction::new(repo.clone())
        .execute(1, CreateSessionOptions::default())
        .await
        .unwrap();
    let token = session.token.expose_secret().to_owned();

    let authorize = AuthorizeAction::new(repo.clone());
    let outcome = authorize.execute(&token).await.unwrap();
    assert!(!outcome.renewed);
    assert_eq!(outcome.session.id, session.id);

    SignOutAction::new(repo.clone()).execute(&token).await.unwrap();

    let result = authorize.execute(&token).await;
    assert_eq!(result.unwrap_err(), SessionError::InvalidSession);
}

#[tokio::test]
async fn renewal_rotates_token_and_keeps_session_authorized() {
    let repo = MockSessionRepository::new();

    // force an immediate renewal window: every session is always due
    let policy = SessionPolicy {
        renew_period_length: Duration::days(30),
        ..Default::default()
    };

    let session = OpenSessionAction::new(repo.clone())
        .execute(5, CreateSessionOptions::default())
        .await
        .unwrap();
    let old_token = session.token.expose_secret().to_owned();

    let authorize = AuthorizeAction::with_policy(repo.clone(), policy);
    let outcome = authorize.execute(&old_token).await.unwrap();
    assert!(outcome.renewed);

    let new_token = outcome.session.token.expose_secret().to_owned();
    assert_ne!(old_token, new_token);

    // only the rotated token authorizes from now on
    assert!(authorize.execute(&new_token).await.is_ok());
    assert_eq!(
        authorize.execute(&old_token).await.unwrap_err(),
        SessionError::InvalidSession
    );
}

#[tokio::test]
async fn repeated_sign_ins_keep_the_session_count_bounded() {
    let repo = MockSessionRepository::new();
    let policy = SessionPolicy {
        max_concurrent_sessions: 3,
        max_history_sessions: 5,
        ..Default::default()
    };
    let open = OpenSessionAction::with_policy(repo.clone(), policy.clone());

    for _ in 0..12 {
        open.execute(1, CreateSessionOptions::default()).await.unwrap();
    }

    let now = Utc::now();
    let sessions = repo.sessions.lock().unwrap().clone();
    let valid = sessions.iter().filter(|s| !s.is_invalid(now)).count();
    assert_eq!(valid, 3);

    // history cap bounds total retention: 5 within the window plus
    // whatever the final pass left enabled
    assert!(sessions.len() <= 6);
}

#[tokio::test]
async fn user_can_revoke_all_other_devices() {
    let repo = MockSessionRepository::new();
    let open = OpenSessionAction::new(repo.clone());

    let phone = open.execute(1, CreateSessionOptions::default()).await.unwrap();
    let laptop = open.execute(1, CreateSessionOptions::default()).await.unwrap();
    open.execute(1, CreateSessionOptions::default()).await.unwrap();

    let sessions = UserSessionsAction::new(repo.clone());
    let others = sessions.list(1, laptop.id).await.unwrap();
    assert_eq!(others.len(), 2);

    let disabled = sessions.disable_all_other(1, laptop.id).await.unwrap();
    assert_eq!(disabled, 2);

    let authorize = AuthorizeAction::new(repo.clone());
    assert!(authorize
        .execute(laptop.token.expose_secret())
        .await
        .is_ok());
    assert_eq!(
        authorize
            .execute(phone.token.expose_secret())
            .await
            .unwrap_err(),
        SessionError::InvalidSession
    );
}

#[tokio::test]
async fn admin_sessions_survive_ordinary_cleanup() {
    let repo = MockSessionRepository::new();
    let policy = SessionPolicy {
        max_concurrent_sessions: 2,
        ..Default::default()
    };

    let admin = AdminSessionAction::with_policy(repo.clone(), policy.clone());
    let admin_session = admin.upsert(1).await.unwrap();

    let open = OpenSessionAction::with_policy(repo.clone(), policy);
    for _ in 0..5 {
        open.execute(1, CreateSessionOptions::default()).await.unwrap();
    }

    let stored = repo.find_by_id(1, admin_session.id).await.unwrap().unwrap();
    assert!(!stored.disabled);

    // upsert still returns the same admin session
    let again = admin.upsert(1).await.unwrap();
    assert_eq!(again.id, admin_session.id);
}

#[tokio::test]
async fn explicit_cleanup_matches_sign_in_cleanup() {
    let policy = SessionPolicy {
        max_concurrent_sessions: 2,
        max_history_sessions: 3,
        ..Default::default()
    };

    let repo = MockSessionRepository::new();
    let open = OpenSessionAction::with_policy(repo.clone(), policy.clone());
    for _ in 0..6 {
        open.create(1, CreateSessionOptions::default()).await.unwrap();
    }

    let cleanup = CleanupAction::with_policy(repo.clone(), policy.clone());
    let outcome = cleanup.execute(1).await.unwrap();
    assert_eq!(outcome.disabled, 4);

    // a second pass finds nothing left to prune above the caps
    let outcome = cleanup.execute(1).await.unwrap();
    assert_eq!(outcome.disabled, 0);
}
