use chrono::Utc;

use crate::config::SessionPolicy;
use crate::crypto::generate_session_token;
use crate::events::{dispatch, SessionEvent};
use crate::repository::CreateSessionOptions;
use crate::{SessionError, SessionRecord, SessionRepository};

use super::open_session;

/// Administrative (mub) session management.
///
/// Admin sessions are issued through an internally-authenticated path,
/// carry the `mub` flag, and are excluded from the concurrency cap.
/// This action backs that path: issuance, upsert, full listing, and
/// disable-or-delete by id.
pub struct AdminSessionAction<R: SessionRepository> {
    repository: R,
    policy: SessionPolicy,
}

impl<R: SessionRepository> AdminSessionAction<R> {
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, SessionPolicy::default())
    }

    pub fn with_policy(repository: R, policy: SessionPolicy) -> Self {
        AdminSessionAction { repository, policy }
    }

    /// Creates a fresh administrative session for the user.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_admin_session", skip(self), err)
    )]
    pub async fn create(&self, user_id: i64) -> Result<SessionRecord, SessionError> {
        let token = generate_session_token(self.policy.token_randomness, self.policy.token_length);
        let session = open_session::create_session(
            &self.repository,
            &self.policy,
            user_id,
            &token,
            CreateSessionOptions::admin(),
        )
        .await?;

        dispatch(SessionEvent::AdminSessionIssued {
            user_id,
            session_id: session.id,
            reused: false,
            at: Utc::now(),
        })
        .await;

        Ok(session)
    }

    /// Returns the user's existing valid administrative session, or
    /// creates one if none exists.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "upsert_admin_session", skip(self), err)
    )]
    pub async fn upsert(&self, user_id: i64) -> Result<SessionRecord, SessionError> {
        if let Some(session) = self
            .repository
            .find_active_admin_session(user_id, Utc::now())
            .await?
        {
            dispatch(SessionEvent::AdminSessionIssued {
                user_id,
                session_id: session.id,
                reused: true,
                at: Utc::now(),
            })
            .await;
            return Ok(session);
        }

        self.create(user_id).await
    }

    /// All of the user's sessions, administrative ones included,
    /// most recent first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<SessionRecord>, SessionError> {
        self.repository.list_by_user(user_id).await
    }

    /// Disables or hard-deletes any of the user's sessions by id.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "discard_session", skip(self), err)
    )]
    pub async fn discard(
        &self,
        user_id: i64,
        session_id: i64,
        delete: bool,
    ) -> Result<(), SessionError> {
        let session = self
            .repository
            .find_by_id(user_id, session_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        if delete {
            self.repository.delete(session.id).await?;
        } else {
            self.repository.disable(session.id).await?;
        }

        log::info!(
            target: "warden",
            "msg=\"session discarded\", user_id={user_id}, session_id={session_id}, deleted={delete}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::MockSessionRepository;

    #[tokio::test]
    async fn test_create_sets_admin_flag() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo);

        let session = action.create(1).await.unwrap();
        assert!(session.mub);
        assert!(!session.cross_site);
        assert!(!session.disabled);
    }

    #[tokio::test]
    async fn test_upsert_reuses_valid_admin_session() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo.clone());

        let first = action.upsert(1).await.unwrap();
        let second = action.upsert(1).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_ignores_ordinary_sessions() {
        let repo = MockSessionRepository::new();
        repo.insert(
            1,
            "ordinary",
            Utc::now() + Duration::days(7),
            CreateSessionOptions::default(),
        )
        .await
        .unwrap();

        let action = AdminSessionAction::new(repo);
        let session = action.upsert(1).await.unwrap();
        assert!(session.mub);
        assert_ne!(session.token.expose_secret(), "ordinary");
    }

    #[tokio::test]
    async fn test_upsert_replaces_disabled_admin_session() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo.clone());

        let first = action.create(1).await.unwrap();
        repo.disable(first.id).await.unwrap();

        let second = action.upsert(1).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.mub);
    }

    #[tokio::test]
    async fn test_list_includes_admin_sessions() {
        let repo = MockSessionRepository::new();
        repo.insert(
            1,
            "ordinary",
            Utc::now() + Duration::days(7),
            CreateSessionOptions::default(),
        )
        .await
        .unwrap();

        let action = AdminSessionAction::new(repo);
        action.create(1).await.unwrap();

        let listed = action.list(1).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_discard_disable() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo.clone());
        let session = action.create(1).await.unwrap();

        action.discard(1, session.id, false).await.unwrap();

        let stored = repo.find_by_id(1, session.id).await.unwrap().unwrap();
        assert!(stored.disabled);
    }

    #[tokio::test]
    async fn test_discard_delete() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo.clone());
        let session = action.create(1).await.unwrap();

        action.discard(1, session.id, true).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_discard_missing_session() {
        let repo = MockSessionRepository::new();
        let action = AdminSessionAction::new(repo);

        let result = action.discard(1, 404, true).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionNotFound);
    }
}
