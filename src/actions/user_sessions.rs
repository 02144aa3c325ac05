use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{SessionError, SessionRecord, SessionRepository};

/// A user's view of their own sessions.
///
/// Backs the self-service session management surface: list devices,
/// revoke one, revoke all others. Administrative sessions are never
/// visible or reachable through this action.
pub struct UserSessionsAction<R: SessionRepository> {
    repository: R,
}

impl<R: SessionRepository> UserSessionsAction<R> {
    pub fn new(repository: R) -> Self {
        UserSessionsAction { repository }
    }

    /// Lists the user's ordinary sessions, most recent first, without the
    /// session making the request.
    pub async fn list(
        &self,
        user_id: i64,
        current_session_id: i64,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        self.repository
            .list_ordinary_by_user(user_id, Some(current_session_id))
            .await
    }

    /// Disables one of the user's ordinary sessions by id.
    ///
    /// Administrative sessions are reported as not found rather than
    /// revealed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "disable_session", skip(self), err)
    )]
    pub async fn disable(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<SessionRecord, SessionError> {
        let session = self
            .repository
            .find_by_id(user_id, session_id)
            .await?
            .filter(|session| !session.mub)
            .ok_or(SessionError::SessionNotFound)?;

        let session = self.repository.disable(session.id).await?;

        dispatch(SessionEvent::SessionDisabled {
            user_id,
            session_id: session.id,
            at: Utc::now(),
        })
        .await;

        Ok(session)
    }

    /// Disables every ordinary session of the user except the current
    /// one. Bulk disable only; no pruning happens here.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "disable_other_sessions", skip(self), err)
    )]
    pub async fn disable_all_other(
        &self,
        user_id: i64,
        current_session_id: i64,
    ) -> Result<u64, SessionError> {
        let disabled = self
            .repository
            .disable_all_other(user_id, current_session_id)
            .await?;

        log::info!(
            target: "warden",
            "msg=\"other sessions disabled\", user_id={user_id}, disabled={disabled}"
        );

        Ok(disabled)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::repository::CreateSessionOptions;
    use crate::MockSessionRepository;

    async fn insert(repo: &MockSessionRepository, user_id: i64, token: &str, mub: bool) -> i64 {
        repo.insert(
            user_id,
            token,
            Utc::now() + Duration::days(7),
            CreateSessionOptions {
                cross_site: false,
                mub,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_list_excludes_current_and_admin() {
        let repo = MockSessionRepository::new();
        let current = insert(&repo, 1, "current", false).await;
        insert(&repo, 1, "other", false).await;
        insert(&repo, 1, "admin", true).await;
        insert(&repo, 2, "foreign", false).await;

        let action = UserSessionsAction::new(repo);
        let listed = action.list(1, current).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].token.expose_secret(), "other");
    }

    #[tokio::test]
    async fn test_disable_by_id() {
        let repo = MockSessionRepository::new();
        let id = insert(&repo, 1, "target", false).await;

        let action = UserSessionsAction::new(repo);
        let session = action.disable(1, id).await.unwrap();
        assert!(session.disabled);
    }

    #[tokio::test]
    async fn test_disable_other_users_session_not_found() {
        let repo = MockSessionRepository::new();
        let id = insert(&repo, 2, "foreign", false).await;

        let action = UserSessionsAction::new(repo);
        let result = action.disable(1, id).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionNotFound);
    }

    #[tokio::test]
    async fn test_disable_admin_session_not_found() {
        let repo = MockSessionRepository::new();
        let id = insert(&repo, 1, "admin", true).await;

        let action = UserSessionsAction::new(repo.clone());
        let result = action.disable(1, id).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionNotFound);

        // the admin session is untouched
        assert!(!repo.find_by_id(1, id).await.unwrap().unwrap().disabled);
    }

    #[tokio::test]
    async fn test_disable_all_other_spares_current_and_admin() {
        let repo = MockSessionRepository::new();
        let current = insert(&repo, 1, "current", false).await;
        insert(&repo, 1, "a", false).await;
        insert(&repo, 1, "b", false).await;
        let admin = insert(&repo, 1, "admin", true).await;

        let action = UserSessionsAction::new(repo.clone());
        let disabled = action.disable_all_other(1, current).await.unwrap();

        assert_eq!(disabled, 2);
        assert!(!repo.find_by_id(1, current).await.unwrap().unwrap().disabled);
        assert!(!repo.find_by_id(1, admin).await.unwrap().unwrap().disabled);
    }
}
