//! Embedded Postgres migrations.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use warden::postgres::migrations;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::PgPool;

/// Creates the `sessions` table and its indexes.
///
/// The `user_id` column references the host application's users table;
/// add the foreign key (with `ON DELETE CASCADE`) in the host schema so
/// sessions disappear with their user.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/postgres").run(pool).await
}
