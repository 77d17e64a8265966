use crate::models::{SessionDetail, SessionId, SessionSummary};

use super::{SessionStore, StoreError};

/// A fixed corpus held in memory, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Vec<(SessionId, SessionDetail)>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from details, assigning ids to those without one.
    pub fn from_sessions(sessions: impl IntoIterator<Item = SessionDetail>) -> Self {
        let mut store = Self::new();
        for detail in sessions {
            store.insert(detail);
        }
        store
    }

    /// Adds a session and returns its id. A detail without an id gets the
    /// next one after the current maximum.
    pub fn insert(&mut self, mut detail: SessionDetail) -> SessionId {
        let id = detail.session_id.unwrap_or_else(|| {
            self.sessions.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1
        });
        detail.session_id = Some(id);
        self.sessions.retain(|(existing, _)| *existing != id);
        self.sessions.push((id, detail));
        id
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .map(|(id, detail)| SessionSummary {
                session_id: *id,
                date: detail.date.clone(),
            })
            .collect())
    }

    async fn get_session_detail(&self, session_id: SessionId) -> Result<SessionDetail, StoreError> {
        self.sessions
            .iter()
            .find(|(id, _)| *id == session_id)
            .map(|(_, detail)| detail.clone())
            .ok_or(StoreError::NotFound(session_id))
    }
}
