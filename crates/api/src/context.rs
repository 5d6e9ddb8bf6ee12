use fieldtrack_auth::SessionId;
use fieldtrack_core::ActiveOwner;

/// Session context for a request.
///
/// Injected by the auth middleware; the active owner is read from the
/// session store on every request, never from the request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: SessionId,
    active_owner: ActiveOwner,
}

impl SessionContext {
    pub fn new(session_id: SessionId, active_owner: ActiveOwner) -> Self {
        Self {
            session_id,
            active_owner,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn active_owner(&self) -> ActiveOwner {
        self.active_owner
    }
}
