//! Storage abstraction for sessions.
//!
//! The [`SessionRepository`] trait defines the primitives the lifecycle
//! actions compose: scoped reads, read-modify-write commands that return
//! the updated record, and the select-then-write pruning primitives.
//! Implement it to use your own storage backend.
//!
//! # Implementations
//!
//! | Type | Feature | Description |
//! |------|---------|-------------|
//! | [`MockSessionRepository`] | `mocks` | In-memory, for tests |
//! | `PostgresSessionRepository` | `postgres` | sqlx over Postgres |
//! | `SqliteSessionRepository` | `sqlite` | sqlx over `SQLite` |

mod session;

#[cfg(any(test, feature = "mocks"))]
mod session_mock;

pub use session::CreateSessionOptions;
pub use session::SessionRepository;

#[cfg(any(test, feature = "mocks"))]
pub use session_mock::MockSessionRepository;
