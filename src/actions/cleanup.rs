use chrono::Utc;

use crate::config::SessionPolicy;
use crate::events::{dispatch, SessionEvent};
use crate::{SessionError, SessionRepository};

/// Counts of sessions affected by a cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// Sessions disabled by the concurrency cap.
    pub disabled: u64,
    /// Sessions hard-deleted by the history cap.
    pub deleted: u64,
}

impl CleanupOutcome {
    pub fn total(&self) -> u64 {
        self.disabled + self.deleted
    }
}

/// Disables valid ordinary sessions above `max_concurrent_sessions`.
///
/// The cutoff is the expiry of the first valid session past the cap in
/// `expiry`-descending order. Every enabled ordinary session at or below
/// that expiry is disabled, so ties at the boundary go out together: the
/// surviving count can dip slightly below the cap but never exceeds it.
/// Administrative sessions are skipped entirely.
pub(crate) async fn cleanup_concurrent<R: SessionRepository>(
    repository: &R,
    policy: &SessionPolicy,
    user_id: i64,
) -> Result<u64, SessionError> {
    let now = Utc::now();
    match repository
        .first_expiry_outside_cap(user_id, policy.max_concurrent_sessions, now)
        .await?
    {
        Some(cutoff) => repository.disable_up_to_expiry(user_id, cutoff).await,
        None => Ok(0),
    }
}

/// Hard-deletes session history above the count or age limit.
///
/// The two limits collapse into one cutoff: the expiry of the
/// `max_history_sessions`-th-newest session within the age window, or the
/// age boundary itself when the count is not exceeded. Whichever is more
/// restrictive wins, so neither limit resurrects rows the other removed.
/// The cutoff applies to every session regardless of validity state.
pub(crate) async fn cleanup_history<R: SessionRepository>(
    repository: &R,
    policy: &SessionPolicy,
    user_id: i64,
) -> Result<u64, SessionError> {
    let max_outside_timestamp = Utc::now() - policy.max_history_timedelta;
    let outside_limit = repository
        .first_expiry_outside_history(user_id, policy.max_history_sessions, max_outside_timestamp)
        .await?
        .unwrap_or(max_outside_timestamp);

    repository.delete_up_to_expiry(user_id, outside_limit).await
}

/// Concurrency-cap pruning followed by history-cap pruning.
pub(crate) async fn cleanup_by_user<R: SessionRepository>(
    repository: &R,
    policy: &SessionPolicy,
    user_id: i64,
) -> Result<CleanupOutcome, SessionError> {
    let disabled = cleanup_concurrent(repository, policy, user_id).await?;
    let deleted = cleanup_history(repository, policy, user_id).await?;

    let outcome = CleanupOutcome { disabled, deleted };
    if outcome.total() > 0 {
        dispatch(SessionEvent::SessionsPruned {
            user_id,
            disabled,
            deleted,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "warden",
            "msg=\"sessions pruned\", user_id={user_id}, disabled={disabled}, deleted={deleted}"
        );
    }

    Ok(outcome)
}

/// Bounds a user's session footprint after sign-in.
///
/// Runs the concurrency cap (disable valid sessions above the limit) and
/// the history cap (delete stale history above the count or age limit),
/// in that order. Both steps share the caller's transaction scope, so a
/// partial failure rolls back as one unit.
pub struct CleanupAction<R: SessionRepository> {
    repository: R,
    policy: SessionPolicy,
}

impl<R: SessionRepository> CleanupAction<R> {
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, SessionPolicy::default())
    }

    pub fn with_policy(repository: R, policy: SessionPolicy) -> Self {
        CleanupAction { repository, policy }
    }

    /// Runs concurrency-cap and history-cap pruning for the user.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cleanup_sessions", skip(self), err)
    )]
    pub async fn execute(&self, user_id: i64) -> Result<CleanupOutcome, SessionError> {
        cleanup_by_user(&self.repository, &self.policy, user_id).await
    }

    /// Runs only the concurrency cap. Returns the disabled count.
    pub async fn cleanup_concurrent_by_user(&self, user_id: i64) -> Result<u64, SessionError> {
        cleanup_concurrent(&self.repository, &self.policy, user_id).await
    }

    /// Runs only the history cap. Returns the deleted count.
    pub async fn cleanup_history_by_user(&self, user_id: i64) -> Result<u64, SessionError> {
        cleanup_history(&self.repository, &self.policy, user_id).await
    }
}
