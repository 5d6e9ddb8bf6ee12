use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use fieldtrack_core::{ActiveOwner, OwnerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque server-side session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Per-session state: currently just the active owner (`current_owner_id`).
pub trait SessionStore: Send + Sync {
    fn create(&self) -> SessionId;

    fn exists(&self, id: SessionId) -> bool;

    /// Active owner for the session; `ActiveOwner::none()` for unknown or
    /// expired sessions.
    fn current_owner(&self, id: SessionId) -> ActiveOwner;

    /// Returns `false` when the session does not exist or has expired.
    fn set_current_owner(&self, id: SessionId, owner: Option<OwnerId>) -> bool;

    fn remove(&self, id: SessionId) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct SessionState {
    current_owner_id: Option<OwnerId>,
    expires_at: DateTime<Utc>,
}

impl SessionState {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local sessions.
///
/// A session lives as long as the token issued for it (`ttl`). Expired
/// entries read as absent and are swept on the next `create`.
#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn create_at(&self, now: DateTime<Utc>) -> SessionId {
        let id = SessionId::new();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, state| state.is_live(now));
        sessions.insert(
            id,
            SessionState {
                current_owner_id: None,
                expires_at: now + self.ttl,
            },
        );
        id
    }

    fn live(&self, id: SessionId, now: DateTime<Utc>) -> Option<SessionState> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.get(&id).copied().filter(|state| state.is_live(now))
    }

    fn set_current_owner_at(&self, id: SessionId, owner: Option<OwnerId>, now: DateTime<Utc>) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        match sessions.get_mut(&id).filter(|state| state.is_live(now)) {
            Some(state) => {
                state.current_owner_id = owner;
                true
            }
            None => false,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> SessionId {
        self.create_at(Utc::now())
    }

    fn exists(&self, id: SessionId) -> bool {
        self.live(id, Utc::now()).is_some()
    }

    fn current_owner(&self, id: SessionId) -> ActiveOwner {
        ActiveOwner::from(self.live(id, Utc::now()).and_then(|s| s.current_owner_id))
    }

    fn set_current_owner(&self, id: SessionId, owner: Option<OwnerId>) -> bool {
        self.set_current_owner_at(id, owner, Utc::now())
    }

    fn remove(&self, id: SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some()
    }
}

impl<S> SessionStore for std::sync::Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn create(&self) -> SessionId {
        (**self).create()
    }

    fn exists(&self, id: SessionId) -> bool {
        (**self).exists(id)
    }

    fn current_owner(&self, id: SessionId) -> ActiveOwner {
        (**self).current_owner(id)
    }

    fn set_current_owner(&self, id: SessionId, owner: Option<OwnerId>) -> bool {
        (**self).set_current_owner(id, owner)
    }

    fn remove(&self, id: SessionId) -> bool {
        (**self).remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new(Duration::minutes(10))
    }

    #[test]
    fn new_session_has_no_owner() {
        let store = store();
        let id = store.create();
        assert!(store.exists(id));
        assert_eq!(store.current_owner(id), ActiveOwner::none());
    }

    #[test]
    fn owner_can_be_set_and_cleared() {
        let store = store();
        let id = store.create();

        assert!(store.set_current_owner(id, Some(OwnerId::new(7))));
        assert_eq!(store.current_owner(id).owner_id(), Some(OwnerId::new(7)));

        assert!(store.set_current_owner(id, None));
        assert_eq!(store.current_owner(id).owner_id(), None);
    }

    #[test]
    fn unknown_session_is_rejected() {
        let store = store();
        let id = SessionId::new();
        assert!(!store.set_current_owner(id, Some(OwnerId::new(1))));
        assert_eq!(store.current_owner(id), ActiveOwner::none());
    }

    #[test]
    fn removed_session_forgets_owner() {
        let store = store();
        let id = store.create();
        store.set_current_owner(id, Some(OwnerId::new(3)));
        assert!(store.remove(id));
        assert!(!store.exists(id));
        assert_eq!(store.current_owner(id), ActiveOwner::none());
    }

    #[test]
    fn expired_session_reads_as_absent() {
        let store = store();
        let start = Utc::now();
        let id = store.create_at(start);
        assert!(store.set_current_owner_at(id, Some(OwnerId::new(4)), start));

        let later = start + Duration::minutes(10);
        assert!(store.live(id, later).is_none());
        assert!(!store.set_current_owner_at(id, None, later));
    }

    #[test]
    fn expired_sessions_are_swept_on_create() {
        let store = store();
        let start = Utc::now();
        for _ in 0..1000 {
            store.create_at(start);
        }
        assert_eq!(store.sessions.read().unwrap().len(), 1000);

        let fresh = store.create_at(start + Duration::minutes(11));
        let sessions = store.sessions.read().unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&fresh));
    }
}
