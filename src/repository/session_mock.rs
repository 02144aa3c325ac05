#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{SecretString, SessionError, SessionRecord};

use super::session::{CreateSessionOptions, SessionRepository};

/// In-memory session repository for tests.
///
/// The `sessions` vector is public so tests can seed records directly;
/// use [`next_id`](Self::next_id) to keep seeded ids unique.
#[derive(Clone)]
pub struct MockSessionRepository {
    pub sessions: Arc<Mutex<Vec<SessionRecord>>>,
    id_sequence: Arc<AtomicI64>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(vec![])),
            id_sequence: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Allocates the next session id.
    pub fn next_id(&self) -> i64 {
        self.id_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Seeds a record directly, bypassing creation checks.
    pub fn seed(&self, record: SessionRecord) {
        self.sessions.lock().unwrap().push(record);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted_by_expiry_desc(&self, filter: impl Fn(&SessionRecord) -> bool) -> Vec<SessionRecord> {
        let sessions = self.sessions.lock().unwrap();
        let mut matched: Vec<SessionRecord> = sessions.iter().filter(|s| filter(s)).cloned().collect();
        matched.sort_by(|a, b| b.expiry.cmp(&a.expiry));
        matched
    }
}

impl Default for MockSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn insert(
        &self,
        user_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
        options: CreateSessionOptions,
    ) -> Result<SessionRecord, SessionError> {
        let record = SessionRecord {
            id: self.next_id(),
            user_id,
            token: SecretString::new(token),
            expiry,
            disabled: false,
            created: Utc::now(),
            cross_site: options.cross_site,
            mub: options.mub,
        };
        self.sessions.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .iter()
            .find(|s| s.token.expose_secret() == token)
            .cloned())
    }

    async fn find_by_id(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self.sorted_by_expiry_desc(|s| s.user_id == user_id))
    }

    async fn list_ordinary_by_user(
        &self,
        user_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self.sorted_by_expiry_desc(|s| {
            s.user_id == user_id && !s.mub && Some(s.id) != exclude_id
        }))
    }

    async fn disable(&self, session_id: i64) -> Result<SessionRecord, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(SessionError::SessionNotFound)?;
        session.disabled = true;
        Ok(session.clone())
    }

    async fn disable_all_other(&self, user_id: i64, keep_id: i64) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut disabled = 0;
        for session in sessions.iter_mut() {
            if session.user_id == user_id && session.id != keep_id && !session.mub && !session.disabled
            {
                session.disabled = true;
                disabled += 1;
            }
        }
        Ok(disabled)
    }

    async fn renew(
        &self,
        session_id: i64,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<SessionRecord, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(SessionError::SessionNotFound)?;
        session.token = SecretString::new(token);
        session.expiry = expiry;
        Ok(session.clone())
    }

    async fn delete(&self, session_id: i64) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        if sessions.len() == before {
            return Err(SessionError::SessionNotFound);
        }
        Ok(())
    }

    async fn find_active_admin_session(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self
            .sorted_by_expiry_desc(|s| {
                s.user_id == user_id && s.mub && !s.disabled && s.expiry > now
            })
            .into_iter()
            .next())
    }

    async fn first_expiry_outside_cap(
        &self,
        user_id: i64,
        offset: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError> {
        Ok(self
            .sorted_by_expiry_desc(|s| {
                s.user_id == user_id && !s.mub && !s.disabled && s.expiry >= now
            })
            .into_iter()
            .nth(offset as usize)
            .map(|s| s.expiry))
    }

    async fn disable_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut disabled = 0;
        for session in sessions.iter_mut() {
            if session.user_id == user_id && !session.mub && !session.disabled && session.expiry <= cutoff
            {
                session.disabled = true;
                disabled += 1;
            }
        }
        Ok(disabled)
    }

    async fn first_expiry_outside_history(
        &self,
        user_id: i64,
        offset: i64,
        min_expiry: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, SessionError> {
        Ok(self
            .sorted_by_expiry_desc(|s| s.user_id == user_id && s.expiry > min_expiry)
            .into_iter()
            .nth(offset as usize)
            .map(|s| s.expiry))
    }

    async fn delete_up_to_expiry(
        &self,
        user_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.user_id != user_id || s.expiry > cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = MockSessionRepository::new();
        let expiry = Utc::now() + Duration::days(7);

        let first = repo
            .insert(1, "a", expiry, CreateSessionOptions::default())
            .await
            .unwrap();
        let second = repo
            .insert(1, "b", expiry, CreateSessionOptions::default())
            .await
            .unwrap();

        assert_eq!(second.id, first.id + 1);
        assert!(!first.disabled);
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let repo = MockSessionRepository::new();
        let expiry = Utc::now() + Duration::days(7);
        repo.insert(1, "needle", expiry, CreateSessionOptions::default())
            .await
            .unwrap();

        let found = repo.find_by_token("needle").await.unwrap();
        assert!(found.is_some());
        assert!(repo.find_by_token("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_expiry_desc() {
        let repo = MockSessionRepository::new();
        let now = Utc::now();
        repo.insert(1, "a", now + Duration::days(1), CreateSessionOptions::default())
            .await
            .unwrap();
        repo.insert(1, "b", now + Duration::days(3), CreateSessionOptions::default())
            .await
            .unwrap();
        repo.insert(1, "c", now + Duration::days(2), CreateSessionOptions::default())
            .await
            .unwrap();

        let listed = repo.list_by_user(1).await.unwrap();
        let tokens: Vec<&str> = listed.iter().map(|s| s.token.expose_secret()).collect();
        assert_eq!(tokens, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_disable_missing_session() {
        let repo = MockSessionRepository::new();
        let result = repo.disable(404).await;
        assert_eq!(result.unwrap_err(), SessionError::SessionNotFound);
    }
}
