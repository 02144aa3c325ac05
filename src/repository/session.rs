use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{SessionError, SessionRecord};

/// Flags for session creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSessionOptions {
    /// Issue the session cookie for cross-site use.
    pub cross_site: bool,
    /// Create an administrative session.
    pub mub: bool,
}

impl CreateSessionOptions {
    /// Options for an administrative session.
    pub fn admin() -> Self {
        Self {
            cross_site: false,
            mub: true,
        }
    }
}

/// Storage primitives for session records.
///
/// Every mutation takes explicit identifiers and returns the updated
/// record; nothing relies on change tracking or an ambient transaction
/// handle. Listing methods order by `expiry` descending, which the
/// pruning algorithms use as the recency proxy: renewal always extends
/// `expiry`, so a renewed session ranks as more recent than an older
/// unrenewed one regardless of creation order.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts a new enabled session with the given token and expiry.
    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError>;

    /// Looks a session up by its bearer token.
    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Looks a session up by id, scoped to its owning user.
    async fn find_by_id(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<Option<SessionRecord>, SessionError>;

    /// All of a user's sessions, administrative ones included,
    /// ordered by `expiry` descending.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, SessionError>;

    /// A user's ordinary (non-administrative) sessions, ordered by
    /// `expiry` descending, optionally excluding one id.
    async fn list_ordinary_by_user(
        &self,
        user_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Vec<SessionRecord>, SessionError>;

    /// Disables a session and returns the updated record.
    async fn disable(&self, session_id: i64) -> Result<SessionRecord, SessionError>;

    /// Disables every enabled ordinary session of the user except
    /// `keep_id`. Returns the number of sessions disabled.
    async fn disable_all_other(&self, user_id: i64, keep_id: i64) -> Result<u64, SessionError>;

    /// Replaces a session's token and expiry, leaving every other field
    /// untouched. Returns the updated record.
    async fn renew(
        &self,
        session_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<SessionRecord, SessionError>;

    /// Hard-deletes a session.
    async fn delete(&self, session_id: i64) -> Result<(), SessionError>;

    /// The user's most recently expiring valid administrative session,
    /// if any.
    async fn find_active_admin_session(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, SessionError>;

    /// The expiry of the first valid ordinary session past the
    /// concurrency cap: enabled, non-administrative, `expiry >= now`,
    /// ordered by `expiry` descending, skipping `offset` rows.
    async fn first_expiry_outside_cap(
        &self,
        user_id: i64,
        offset: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError>;

    /// Disables every enabled ordinary session of the user with
    /// `expiry <= cutoff`. Returns the number of sessions disabled.
    async fn disable_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError>;

    /// The expiry of the first session past the history cap: any session
    /// with `expiry > min_expiry`, ordered by `expiry` descending,
    /// skipping `offset` rows.
    async fn first_expiry_outside_history(
        &self,
        user_id: i64,
        offset: i64,
        min_expiry: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError>;

    /// Hard-deletes every session of the user with `expiry <= cutoff`,
    /// valid or not. Returns the number of sessions deleted.
    async fn delete_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError>;
}
