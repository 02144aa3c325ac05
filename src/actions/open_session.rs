use chrono::Utc;

use crate::config::SessionPolicy;
use crate::crypto::generate_session_token;
use crate::events::{dispatch, SessionEvent};
use crate::repository::CreateSessionOptions;
use crate::{SessionError, SessionRecord, SessionRepository};

use super::cleanup;

/// Shared creation path: collision-checked insert with policy expiry.
///
/// A token that already exists in storage is fatal. The entropy budget
/// makes an honest collision astronomically unlikely, so a hit means the
/// random source is broken and must never be retried silently.
pub(crate) async fn create_session<R: SessionRepository>(
    repository: &R,
    policy: &SessionPolicy,
    user_id: i64,
    token: &str,
    options: CreateSessionOptions,
) -> Result<SessionRecord, SessionError> {
    if repository.find_by_token(token).await?.is_some() {
        log::error!(
            target: "warden",
            "msg=\"token collision on session creation\", user_id={user_id}"
        );
        return Err(SessionError::TokenCollision);
    }

    let expiry = policy.expiry_from(Utc::now());
    let session = repository.insert(user_id, token, expiry, options).await?;

    dispatch(SessionEvent::SessionOpened {
        user_id,
        session_id: session.id,
        cross_site: session.cross_site,
        at: Utc::now(),
    })
    .await;

    log::info!(
        target: "warden",
        "msg=\"session opened\", user_id={user_id}, session_id={}, mub={}",
        session.id,
        session.mub
    );

    Ok(session)
}

/// Creates sessions on successful sign-up or sign-in.
///
/// [`execute`](Self::execute) is the sign-in path: it creates the session
/// and then runs combined cleanup, so the fresh session itself counts
/// toward and is protected by the concurrency cap. [`create`](Self::create)
/// skips cleanup for paths that issue a first session (sign-up) or manage
/// their own pruning.
pub struct OpenSessionAction<R: SessionRepository> {
    repository: R,
    policy: SessionPolicy,
}

impl<R: SessionRepository> OpenSessionAction<R> {
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, SessionPolicy::default())
    }

    pub fn with_policy(repository: R, policy: SessionPolicy) -> Self {
        OpenSessionAction { repository, policy }
    }

    /// Creates a session for the user and prunes their older sessions.
    ///
    /// Cleanup runs after creation as two sequential steps inside the
    /// caller's transaction scope; a failure in either surfaces to the
    /// caller, whose rollback reverts both.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "open_session", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user_id: i64,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError> {
        let session = self.create(user_id, options).await?;
        cleanup::cleanup_by_user(&self.repository, &self.policy, user_id).await?;
        Ok(session)
    }

    /// Creates a session without running cleanup.
    pub async fn create(
        &self,
        user_id: i64,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError> {
        let token = generate_session_token(self.policy.token_randomness, self.policy.token_length);
        self.create_with_token(user_id, &token, options).await
    }

    /// Creates a session with a caller-supplied token, still subject to
    /// the collision check. Intended for imports and test fixtures.
    pub async fn create_with_token(
        &self,
        user_id: i64,
        token: &str,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError> {
        create_session(&self.repository, &self.policy, user_id, token, options).await
    }
}
