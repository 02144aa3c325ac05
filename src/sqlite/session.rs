use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{CreateSessionOptions, SessionRepository};
use crate::{SecretString, SessionError, SessionRecord};

/// Session storage over a `SQLite` pool.
///
/// Run [`migrations::run`](super::migrations::run) once at startup to
/// create the `sessions` table.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = "id, user_id, token, expiry, disabled, created, cross_site, mub";

#[derive(FromRow)]
struct SessionRow {
    id: i64,
    user_id: i64,
    token: String,
    expiry: DateTime<Utc>,
    disabled: bool,
    created: DateTime<Utc>,
    cross_site: bool,
    mub: bool,
}

impl SessionRow {
    fn into_record(self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            user_id: self.user_id,
            token: SecretString::new(self.token),
            expiry: self.expiry,
            disabled: self.disabled,
            created: self.created,
            cross_site: self.cross_site,
            mub: self.mub,
        }
    }
}

fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> SessionError {
    move |e| {
        log::error!(
            target: "warden",
            "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
        );
        SessionError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError> {
        let row: SessionRow = sqlx::query_as(
            r"INSERT INTO sessions (user_id, token, expiry, cross_site, mub)
               VALUES (?, ?, ?, ?, ?)
               RETURNING id, user_id, token, expiry, disabled, created, cross_site, mub",
        )
        .bind(user_id)
        .bind(token)
        .bind(expiry)
        .bind(options.cross_site)
        .bind(options.mub)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // a lost race on the unique token column is still a collision
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                return SessionError::TokenCollision;
            }
            db_err("insert")(e)
        })?;

        Ok(row.into_record())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("find_by_token"))?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn find_by_id(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ? AND user_id = ?"
        ))
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("find_by_id"))?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, SessionError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ? ORDER BY expiry DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("list_by_user"))?;

        Ok(rows.into_iter().map(SessionRow::into_record).collect())
    }

    async fn list_ordinary_by_user(
        &self,
        user_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        let rows: Vec<SessionRow> = match exclude_id {
            Some(exclude_id) => {
                sqlx::query_as(&format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                      WHERE user_id = ? AND mub = FALSE AND id <> ?
                      ORDER BY expiry DESC"
                ))
                .bind(user_id)
                .bind(exclude_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                      WHERE user_id = ? AND mub = FALSE
                      ORDER BY expiry DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err("list_ordinary_by_user"))?;

        Ok(rows.into_iter().map(SessionRow::into_record).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn disable(&self, session_id: i64) -> Result<SessionRecord, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r"UPDATE sessions SET disabled = TRUE WHERE id = ?
               RETURNING id, user_id, token, expiry, disabled, created, cross_site, mub",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("disable"))?;

        row.map(SessionRow::into_record)
            .ok_or(SessionError::SessionNotFound)
    }

    async fn disable_all_other(&self, user_id: i64, keep_id: i64) -> Result<u64, SessionError> {
        let result = sqlx::query(
            r"UPDATE sessions SET disabled = TRUE
               WHERE user_id = ? AND id <> ? AND mub = FALSE AND disabled = FALSE",
        )
        .bind(user_id)
        .bind(keep_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("disable_all_other"))?;

        Ok(result.rows_affected())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn renew(
        &self,
        session_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<SessionRecord, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r"UPDATE sessions SET token = ?, expiry = ? WHERE id = ?
               RETURNING id, user_id, token, expiry, disabled, created, cross_site, mub",
        )
        .bind(token)
        .bind(expiry)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("renew"))?;

        row.map(SessionRow::into_record)
            .ok_or(SessionError::SessionNotFound)
    }

    async fn delete(&self, session_id: i64) -> Result<(), SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("delete"))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::SessionNotFound);
        }
        Ok(())
    }

    async fn find_active_admin_session(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
              WHERE user_id = ? AND mub = TRUE AND disabled = FALSE AND expiry > ?
              ORDER BY expiry DESC
              LIMIT 1"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("find_active_admin_session"))?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn first_expiry_outside_cap(
        &self,
        user_id: i64,
        offset: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError> {
        sqlx::query_scalar(
            r"SELECT expiry FROM sessions
               WHERE user_id = ? AND mub = FALSE AND disabled = FALSE AND expiry >= ?
               ORDER BY expiry DESC
               LIMIT 1 OFFSET ?",
        )
        .bind(user_id)
        .bind(now)
        .bind(offset)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("first_expiry_outside_cap"))
    }

    async fn disable_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        let result = sqlx::query(
            r"UPDATE sessions SET disabled = TRUE
               WHERE user_id = ? AND mub = FALSE AND disabled = FALSE AND expiry <= ?",
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_err("disable_up_to_expiry"))?;

        Ok(result.rows_affected())
    }

    async fn first_expiry_outside_history(
        &self,
        user_id: i64,
        offset: i64,
        min_expiry: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError> {
        sqlx::query_scalar(
            r"SELECT expiry FROM sessions
               WHERE user_id = ? AND expiry > ?
               ORDER BY expiry DESC
               LIMIT 1 OFFSET ?",
        )
        .bind(user_id)
        .bind(min_expiry)
        .bind(offset)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("first_expiry_outside_history"))
    }

    async fn delete_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND expiry <= ?")
            .bind(user_id)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_up_to_expiry"))?;

        Ok(result.rows_affected())
    }
}
