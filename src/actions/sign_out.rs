use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{SessionError, SessionRecord, SessionRepository};

/// Disables the session behind a presented token.
///
/// Sign-out disables rather than deletes: the row remains for listings
/// and auditing until history pruning removes it.
pub struct SignOutAction<R: SessionRepository> {
    repository: R,
}

impl<R: SessionRepository> SignOutAction<R> {
    pub fn new(repository: R) -> Self {
        SignOutAction { repository }
    }

    /// Disables the session matching `token`.
    ///
    /// An unknown or already-invalid token reports the same
    /// [`SessionError::InvalidSession`] the authorization path would.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_out", skip_all, err)
    )]
    pub async fn execute(&self, token: &str) -> Result<SessionRecord, SessionError> {
        let session = match self.repository.find_by_token(token).await? {
            Some(session) if !session.is_invalid(Utc::now()) => session,
            _ => return Err(SessionError::InvalidSession),
        };

        let session = self.repository.disable(session.id).await?;

        dispatch(SessionEvent::SessionDisabled {
            user_id: session.user_id,
            session_id: session.id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "warden",
            "msg=\"sign-out\", user_id={}, session_id={}",
            session.user_id,
            session.id
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::repository::CreateSessionOptions;
    use crate::MockSessionRepository;

    #[tokio::test]
    async fn test_sign_out_disables_session() {
        let repo = MockSessionRepository::new();
        repo.insert(
            1,
            "current",
            Utc::now() + Duration::days(7),
            CreateSessionOptions::default(),
        )
        .await
        .unwrap();

        let action = SignOutAction::new(repo.clone());
        let session = action.execute("current").await.unwrap();

        assert!(session.disabled);
        // the row is retained, not deleted
        assert_eq!(repo.len(), 1);
        let stored = repo.find_by_token("current").await.unwrap().unwrap();
        assert!(stored.is_invalid(Utc::now()));
    }

    #[tokio::test]
    async fn test_sign_out_unknown_token() {
        let repo = MockSessionRepository::new();
        let action = SignOutAction::new(repo);

        let result = action.execute("missing").await;
        assert_eq!(result.unwrap_err(), SessionError::InvalidSession);
    }

    #[tokio::test]
    async fn test_sign_out_twice_is_invalid() {
        let repo = MockSessionRepository::new();
        repo.insert(
            1,
            "current",
            Utc::now() + Duration::days(7),
            CreateSessionOptions::default(),
        )
        .await
        .unwrap();

        let action = SignOutAction::new(repo);
        action.execute("current").await.unwrap();

        let result = action.execute("current").await;
        assert_eq!(result.unwrap_err(), SessionError::InvalidSession);
    }
}
