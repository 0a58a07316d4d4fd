use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::threadrand::SecureRng;

#[derive(Debug)]
pub enum SessionError {
    StorePoisoned,
}

impl std::error::Error for SessionError {}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::StorePoisoned => write!(f, "SessionError: Session store lock poisoned"),
        }
    }
}

pub trait SessionStore: Send + Sync {
    /// Starts a session for `username` and returns its id.
    fn create_session(&self, username: &str, lifetime: Duration) -> Result<String, SessionError>;
    /// The username a live session belongs to. Expired sessions yield `None`.
    fn get_session_user(&self, session_id: &str) -> Result<Option<String>, SessionError>;
    fn remove_session(&self, session_id: &str) -> Result<(), SessionError>;
}

struct SessionRecord {
    username: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(&self, username: &str, lifetime: Duration) -> Result<String, SessionError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionError::StorePoisoned)?;

        let now = Instant::now();
        sessions.retain(|_, s| s.expires_at > now);

        let session_id = SecureRng::session_id();
        sessions.insert(
            session_id.clone(),
            SessionRecord {
                username: String::from(username),
                expires_at: now + lifetime,
            },
        );

        Ok(session_id)
    }

    fn get_session_user(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionError::StorePoisoned)?;

        let Some(record) = sessions.get(session_id) else {
            return Ok(None);
        };

        if record.expires_at <= Instant::now() {
            sessions.remove(session_id);
            return Ok(None);
        }

        Ok(Some(record.username.clone()))
    }

    fn remove_session(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::StorePoisoned)?
            .remove(session_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = InMemorySessionStore::new();
        let id = store
            .create_session("alice", Duration::from_secs(60))
            .unwrap();

        assert_eq!(
            store.get_session_user(&id).unwrap().as_deref(),
            Some("alice")
        );
        assert!(store.get_session_user("unknown").unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let store = InMemorySessionStore::new();
        let id = store
            .create_session("alice", Duration::from_secs(60))
            .unwrap();

        store.remove_session(&id).unwrap();
        assert!(store.get_session_user(&id).unwrap().is_none());

        // Removing twice is fine
        store.remove_session(&id).unwrap();
    }

    #[test]
    fn test_expired_session() {
        let store = InMemorySessionStore::new();
        let id = store.create_session("alice", Duration::ZERO).unwrap();

        assert!(store.get_session_user(&id).unwrap().is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = InMemorySessionStore::new();
        let a = store
            .create_session("alice", Duration::from_secs(60))
            .unwrap();
        let b = store
            .create_session("bob", Duration::from_secs(60))
            .unwrap();

        store.remove_session(&a).unwrap();
        assert_eq!(store.get_session_user(&b).unwrap().as_deref(), Some("bob"));
    }
}
