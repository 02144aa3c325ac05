//! Session lifecycle policy configuration.
//!
//! Every knob that used to be a hardcoded constant lives here. Pruning and
//! renewal behavior is controlled entirely by the [`SessionPolicy`] passed
//! into the actions, never by the data model itself.
//!
//! # Example
//!
//! ```rust
//! use chrono::Duration;
//! use warden::SessionPolicy;
//!
//! // Sensible production defaults
//! let policy = SessionPolicy::default();
//!
//! // Or customize
//! let policy = SessionPolicy {
//!     expiry_timeout: Duration::days(14),
//!     max_concurrent_sessions: 5,
//!     ..Default::default()
//! };
//! ```

use chrono::{DateTime, Duration, Utc};

/// Policy knobs for session issuance, renewal and pruning.
///
/// Use `SessionPolicy::default()` for production defaults.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Number of random bytes drawn for each token.
    ///
    /// Default: 40
    pub token_randomness: usize,

    /// Stored token length in characters.
    ///
    /// The URL-safe encoding of `token_randomness` bytes is truncated to
    /// this length. 40 bytes encode to 54 characters, so the default drops
    /// four of them; the fixed width is part of the storage contract and
    /// must not change between releases.
    ///
    /// Default: 50
    pub token_length: usize,

    /// How long a session remains usable after creation or renewal.
    ///
    /// Default: 7 days
    pub expiry_timeout: Duration,

    /// Length of the final window of a session's lifetime during which
    /// authorization triggers a renewal.
    ///
    /// Default: 3 days (renewal fires during the last 3 of 7 days)
    pub renew_period_length: Duration,

    /// Maximum number of simultaneously valid ordinary sessions per user.
    /// Administrative sessions never count against this cap.
    ///
    /// Default: 10
    pub max_concurrent_sessions: i64,

    /// Maximum number of historical sessions retained per user within the
    /// history age window.
    ///
    /// Default: 20
    pub max_history_sessions: i64,

    /// Age past expiry after which a session is purged from history
    /// regardless of how few sessions the user has.
    ///
    /// Default: 7 days
    pub max_history_timedelta: Duration,

    /// Whether renewal re-checks the fresh token for collisions before
    /// writing it. Collision probability at renewal is identical to
    /// creation, so the check is optional.
    ///
    /// Default: false
    pub renewal_collision_check: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            token_randomness: 40,
            token_length: 50,
            expiry_timeout: Duration::days(7),
            renew_period_length: Duration::days(3),
            max_concurrent_sessions: 10,
            max_history_sessions: 20,
            max_history_timedelta: Duration::days(7),
            renewal_collision_check: false,
        }
    }
}

impl SessionPolicy {
    /// Creates a policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy suitable for development and testing.
    ///
    /// Short lifetimes and loose caps, so pruning rarely interferes.
    pub fn development() -> Self {
        Self {
            expiry_timeout: Duration::days(1),
            renew_period_length: Duration::hours(12),
            max_concurrent_sessions: 100,
            max_history_sessions: 100,
            max_history_timedelta: Duration::days(1),
            ..Self::default()
        }
    }

    /// A policy with stricter security settings.
    ///
    /// Short lifetimes, tight caps, and collision re-checks on renewal.
    pub fn strict() -> Self {
        Self {
            expiry_timeout: Duration::days(1),
            renew_period_length: Duration::hours(6),
            max_concurrent_sessions: 3,
            max_history_sessions: 10,
            max_history_timedelta: Duration::days(3),
            renewal_collision_check: true,
            ..Self::default()
        }
    }

    /// Absolute expiry for a session created or renewed at `now`.
    #[inline]
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.expiry_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = SessionPolicy::default();

        assert_eq!(policy.token_randomness, 40);
        assert_eq!(policy.token_length, 50);
        assert_eq!(policy.expiry_timeout, Duration::days(7));
        assert_eq!(policy.renew_period_length, Duration::days(3));
        assert_eq!(policy.max_concurrent_sessions, 10);
        assert_eq!(policy.max_history_sessions, 20);
        assert_eq!(policy.max_history_timedelta, Duration::days(7));
        assert!(!policy.renewal_collision_check);
    }

    #[test]
    fn test_strict_policy() {
        let policy = SessionPolicy::strict();

        assert_eq!(policy.expiry_timeout, Duration::days(1));
        assert_eq!(policy.max_concurrent_sessions, 3);
        assert!(policy.renewal_collision_check);
    }

    #[test]
    fn test_development_policy() {
        let policy = SessionPolicy::development();

        assert_eq!(policy.max_concurrent_sessions, 100);
        assert_eq!(policy.token_length, 50);
    }

    #[test]
    fn test_expiry_from() {
        let policy = SessionPolicy::default();
        let now = Utc::now();
        assert_eq!(policy.expiry_from(now), now + Duration::days(7));
    }
}
