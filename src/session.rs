//! The session entity and its pure predicates.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::SecretString;

/// A stored session.
///
/// A session is either valid or invalid; there is no third state:
/// `invalid == disabled || expiry < now`. Sign-out disables a session
/// rather than deleting it, so the row stays visible to listings and to
/// history pruning until the history cap removes it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    /// Owning user. Rows cascade away when the user is deleted.
    pub user_id: i64,
    /// Opaque bearer credential, stored verbatim at a fixed width.
    /// Skipped when serializing so listings never leak it.
    #[serde(skip_serializing)]
    pub token: SecretString,
    /// Absolute timestamp after which the session is unusable.
    pub expiry: DateTime<Utc>,
    /// Set on sign-out, admin action, or concurrency-cap pruning.
    pub disabled: bool,
    /// Creation timestamp, used only for ordering and auditing.
    pub created: DateTime<Utc>,
    /// Whether the session's cookie should be usable cross-site.
    /// Affects cookie attributes only, never lifecycle logic.
    pub cross_site: bool,
    /// Administrative session flag. Admin sessions are pruned
    /// independently and never count against the concurrency cap.
    pub mub: bool,
}

impl SessionRecord {
    /// Whether the session must be rejected at `now`.
    ///
    /// Pure function of stored state and the clock; expired and disabled
    /// sessions are indistinguishable to callers.
    #[inline]
    pub fn is_invalid(&self, now: DateTime<Utc>) -> bool {
        self.disabled || self.expiry < now
    }

    /// Whether the session has entered the final `renew_period_length`
    /// window of its lifetime at `now`.
    #[inline]
    pub fn is_renewal_required(&self, now: DateTime<Utc>, renew_period_length: Duration) -> bool {
        self.expiry - renew_period_length < now
    }
}
