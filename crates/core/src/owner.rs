//! Active owner scope.
//!
//! Every inventory read and write takes an `ActiveOwner` explicitly instead of
//! looking up ambient session state. The value is derived server-side from the
//! authenticated session; request bodies never choose it.

use crate::error::{DomainError, DomainResult};
use crate::id::OwnerId;

/// The owner selected for the current session, if any.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActiveOwner(Option<OwnerId>);

impl ActiveOwner {
    /// No owner selected: reads see nothing and writes are refused.
    pub const fn none() -> Self {
        Self(None)
    }

    pub const fn of(owner_id: OwnerId) -> Self {
        Self(Some(owner_id))
    }

    pub fn owner_id(&self) -> Option<OwnerId> {
        self.0
    }

    /// Whether a record owned by `owner` is visible in this scope.
    ///
    /// Unowned records are never visible, not even without an active owner.
    pub fn permits(&self, owner: Option<OwnerId>) -> bool {
        match (self.0, owner) {
            (Some(active), Some(owner)) => active == owner,
            _ => false,
        }
    }

    /// The owner to stamp on a write.
    ///
    /// A `requested` owner is accepted only when it equals the active owner;
    /// anything else is an isolation violation, as is writing without an active
    /// owner.
    pub fn resolve_write_owner(&self, requested: Option<OwnerId>) -> DomainResult<OwnerId> {
        let active = self
            .0
            .ok_or_else(|| DomainError::owner_isolation("no active owner selected for this session"))?;

        match requested {
            None => Ok(active),
            Some(owner) if owner == active => Ok(active),
            Some(owner) => Err(DomainError::owner_isolation(format!(
                "owner_id {owner} does not match the active owner {active}"
            ))),
        }
    }
}

impl From<Option<OwnerId>> for ActiveOwner {
    fn from(value: Option<OwnerId>) -> Self {
        Self(value)
    }
}
