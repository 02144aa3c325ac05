//! `SQLite`-backed session storage.

pub mod migrations;
mod session;

pub use session::SqliteSessionRepository;
