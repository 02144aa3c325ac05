use chrono::{DateTime, Utc};

/// Events emitted by session lifecycle actions.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new session was created.
    SessionOpened {
        user_id: i64,
        session_id: i64,
        cross_site: bool,
        at: DateTime<Utc>,
    },
    /// An existing session received a fresh token and expiry.
    SessionRenewed {
        user_id: i64,
        session_id: i64,
        at: DateTime<Utc>,
    },
    /// A session was disabled by sign-out or an explicit request.
    SessionDisabled {
        user_id: i64,
        session_id: i64,
        at: DateTime<Utc>,
    },
    /// Combined cleanup changed state for a user.
    SessionsPruned {
        user_id: i64,
        /// Sessions disabled by the concurrency cap.
        disabled: u64,
        /// Sessions hard-deleted by the history cap.
        deleted: u64,
        at: DateTime<Utc>,
    },
    /// An administrative session was created or reused.
    AdminSessionIssued {
        user_id: i64,
        session_id: i64,
        /// Whether an existing valid admin session was returned.
        reused: bool,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Stable event name, useful for logging and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SessionOpened { .. } => "session_opened",
            SessionEvent::SessionRenewed { .. } => "session_renewed",
            SessionEvent::SessionDisabled { .. } => "session_disabled",
            SessionEvent::SessionsPruned { .. } => "sessions_pruned",
            SessionEvent::AdminSessionIssued { .. } => "admin_session_issued",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = SessionEvent::SessionOpened {
            user_id: 1,
            session_id: 2,
            cross_site: false,
            at: Utc::now(),
        };
        assert_eq!(event.name(), "session_opened");

        let event = SessionEvent::SessionsPruned {
            user_id: 1,
            disabled: 3,
            deleted: 2,
            at: Utc::now(),
        };
        assert_eq!(event.name(), "sessions_pruned");
    }
}
