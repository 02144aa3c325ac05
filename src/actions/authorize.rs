use chrono::Utc;

use crate::config::SessionPolicy;
use crate::crypto::generate_session_token;
use crate::events::{dispatch, SessionEvent};
use crate::{SessionError, SessionRecord, SessionRepository};

/// Result of authorizing a request token.
#[derive(Debug, Clone)]
pub struct Authorization {
    /// The authorized session. When `renewed` is set, `token` and
    /// `expiry` are the fresh values and must be propagated to the
    /// client before the response is returned.
    pub session: SessionRecord,
    pub renewed: bool,
}

/// Validates a bearer token and renews the session when it is due.
///
/// Called once per authenticated request by the surrounding middleware.
/// A missing, disabled or expired session uniformly produces
/// [`SessionError::InvalidSession`]; callers learn nothing about which
/// case applied. When the session has entered the renewal window, a new
/// token and a full fresh timeout are written in the same call, so within
/// one request renewal happens at most once and the presented token has
/// already been verified before it is replaced.
pub struct AuthorizeAction<R: SessionRepository> {
    repository: R,
    policy: SessionPolicy,
}

impl<R: SessionRepository> AuthorizeAction<R> {
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, SessionPolicy::default())
    }

    pub fn with_policy(repository: R, policy: SessionPolicy) -> Self {
        AuthorizeAction { repository, policy }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "authorize", skip_all, err)
    )]
    pub async fn execute(&self, token: &str) -> Result<Authorization, SessionError> {
        let now = Utc::now();

        let session = match self.repository.find_by_token(token).await? {
            Some(session) if !session.is_invalid(now) => session,
            _ => return Err(SessionError::InvalidSession),
        };

        if !session.is_renewal_required(now, self.policy.renew_period_length) {
            return Ok(Authorization {
                session,
                renewed: false,
            });
        }

        let fresh_token =
            generate_session_token(self.policy.token_randomness, self.policy.token_length);
        if self.policy.renewal_collision_check
            && self.repository.find_by_token(&fresh_token).await?.is_some()
        {
            log::error!(
                target: "warden",
                "msg=\"token collision on session renewal\", session_id={}",
                session.id
            );
            return Err(SessionError::TokenCollision);
        }

        let expiry = self.policy.expiry_from(now);
        let session = self
            .repository
            .renew(session.id, &fresh_token, expiry)
            .await?;

        dispatch(SessionEvent::SessionRenewed {
            user_id: session.user_id,
            session_id: session.id,
            at: now,
        })
        .await;

        log::debug!(
            target: "warden",
            "msg=\"session renewed\", user_id={}, session_id={}",
            session.user_id,
            session.id
        );

        Ok(Authorization {
            session,
            renewed: true,
        })
    }
}
