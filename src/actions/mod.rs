//! Per-use-case session lifecycle actions.
//!
//! Each action owns a repository (and, where policy matters, a
//! [`SessionPolicy`](crate::SessionPolicy)) and exposes an `execute`
//! method plus the narrower operations the surrounding web layer calls.

mod admin_session;
mod authorize;
mod cleanup;
mod open_session;
mod sign_out;
mod user_sessions;

pub use admin_session::AdminSessionAction;
pub use authorize::{Authorization, AuthorizeAction};
pub use cleanup::{CleanupAction, CleanupOutcome};
pub use open_session::OpenSessionAction;
pub use sign_out::SignOutAction;
pub use user_sessions::UserSessionsAction;
