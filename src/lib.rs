//! Token-based session lifecycle management.
//!
//! `warden` manages the full lifetime of bearer sessions: issuance with
//! collision-checked opaque tokens, validity checks, sliding renewal, and
//! two pruning policies that bound how many sessions a user can hold at
//! once (concurrency cap) and how much session history is retained
//! (history cap).
//!
//! The crate is storage-agnostic: all state lives behind the
//! [`SessionRepository`] trait, with sqlx-backed Postgres and `SQLite`
//! stores behind the `postgres` and `sqlite` features, and an in-memory
//! mock behind the `mocks` feature.
//!
//! # Actions
//!
//! | Action | Description |
//! |--------|-------------|
//! | [`OpenSessionAction`](actions::OpenSessionAction) | Sign-in: create a session, then run combined cleanup |
//! | [`AuthorizeAction`](actions::AuthorizeAction) | Per-request validity check plus renewal |
//! | [`CleanupAction`](actions::CleanupAction) | Concurrency-cap and history-cap pruning |
//! | [`SignOutAction`](actions::SignOutAction) | Disable the current session |
//! | [`UserSessionsAction`](actions::UserSessionsAction) | List and disable a user's own sessions |
//! | [`AdminSessionAction`](actions::AdminSessionAction) | Administrative (mub) session issuance and purge |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use warden::{AuthorizeAction, CreateSessionOptions, OpenSessionAction};
//!
//! let open = OpenSessionAction::new(repository.clone());
//! let session = open.execute(user_id, CreateSessionOptions::default()).await?;
//!
//! // later, on an authenticated request:
//! let auth = AuthorizeAction::new(repository.clone());
//! let outcome = auth.execute(session.token.expose_secret()).await?;
//! if outcome.renewed {
//!     // propagate outcome.session.token back to the client (cookie or header)
//! }
//! ```

pub mod actions;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod events;
pub mod repository;
pub mod session;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use actions::{
    AdminSessionAction, Authorization, AuthorizeAction, CleanupAction, CleanupOutcome,
    OpenSessionAction, SignOutAction, UserSessionsAction,
};
pub use config::SessionPolicy;
pub use cookie::CookieConfig;
pub use crypto::SecretString;
pub use events::register_event_listeners;
pub use repository::{CreateSessionOptions, SessionRepository};
pub use session::SessionRecord;

#[cfg(any(test, feature = "mocks"))]
pub use repository::MockSessionRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresSessionRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSessionRepository;

use std::fmt;

/// Errors produced by session lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A freshly generated token already exists in storage. With the default
    /// entropy budget this is astronomically unlikely; any occurrence points
    /// at a broken random source, so creation fails instead of retrying.
    TokenCollision,
    /// No session matches the given id for that user.
    SessionNotFound,
    /// The presented token matches no session, or the session is disabled
    /// or expired. The three cases are deliberately indistinguishable.
    InvalidSession,
    DatabaseError(String),
}

impl std::error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::TokenCollision => write!(f, "Generated session token already exists"),
            SessionError::SessionNotFound => write!(f, "Session not found"),
            SessionError::InvalidSession => write!(f, "Session is invalid"),
            SessionError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}
