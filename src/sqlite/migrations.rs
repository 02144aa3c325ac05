//! Embedded `SQLite` migrations.
//!
//! Migrations are embedded at compile time and tracked in the
//! `_warden_migrations` table, so [`run`] is idempotent.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlx::SqlitePool;
//! use warden::sqlite::migrations;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[(
    "20250301000001_create_sessions_table",
    include_str!("../../migrations_sqlite/20250301000001_create_sessions_table.sql"),
)];

/// Runs all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _warden_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(String,)> =
            sqlx::query_as("SELECT name FROM _warden_migrations WHERE name = ?")
                .bind(name)
                .fetch_optional(pool)
                .await?;

        if applied.is_none() {
            pool.execute(*sql).await?;
            sqlx::query("INSERT INTO _warden_migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await?;

            log::info!(
                target: "warden",
                "msg=\"migration applied\", name=\"{name}\""
            );
        }
    }

    Ok(())
}
