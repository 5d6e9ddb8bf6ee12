use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use fieldtrack_core::{DomainError, OwnerId};
use fieldtrack_inventory::{AuditEntry, InventoryItem, InventoryItemId, ItemUpdate, ListFilter, NewItem};

/// Storage failure (connection, transaction, row decoding), or a domain
/// rule that could only be checked against the locked row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("update rejected: {0}")]
    Rejected(DomainError),
}

/// Persistence for owner-scoped inventory and its audit trail.
///
/// Every mutating method commits the row change and its audit entry as one
/// atomic unit. Scoped methods match on `owner`; rows owned by anyone else
/// (or by no one) behave as if they did not exist.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert an item and its `create` audit entry.
    async fn insert(&self, item: NewItem, at: DateTime<Utc>) -> Result<(InventoryItem, AuditEntry), StoreError>;

    /// Apply `update` to the scoped item and append an `update` entry.
    /// `None` when no such item is visible to `owner`; `Rejected` (and no
    /// audit entry) when the update cannot be applied to the stored row.
    async fn update(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        update: &ItemUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<(InventoryItem, AuditEntry)>, StoreError>;

    /// Remove the scoped item and append a `delete` entry.
    async fn delete(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        at: DateTime<Utc>,
    ) -> Result<Option<AuditEntry>, StoreError>;

    async fn get(&self, id: InventoryItemId, owner: OwnerId) -> Result<Option<InventoryItem>, StoreError>;

    /// Items for `owner` matching `filter`, ordered by id.
    async fn list(&self, owner: OwnerId, filter: &ListFilter) -> Result<Vec<InventoryItem>, StoreError>;

    /// Audit entries recorded for `owner`, oldest first.
    async fn audit_trail(
        &self,
        owner: OwnerId,
        item_id: Option<InventoryItemId>,
    ) -> Result<Vec<AuditEntry>, StoreError>;

    /// Largest owner id referenced by any item or audit row, across all owners.
    async fn highest_owner_id(&self) -> Result<Option<OwnerId>, StoreError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn insert(&self, item: NewItem, at: DateTime<Utc>) -> Result<(InventoryItem, AuditEntry), StoreError> {
        (**self).insert(item, at).await
    }

    async fn update(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        update: &ItemUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<(InventoryItem, AuditEntry)>, StoreError> {
        (**self).update(id, owner, update, at).await
    }

    async fn delete(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        at: DateTime<Utc>,
    ) -> Result<Option<AuditEntry>, StoreError> {
        (**self).delete(id, owner, at).await
    }

    async fn get(&self, id: InventoryItemId, owner: OwnerId) -> Result<Option<InventoryItem>, StoreError> {
        (**self).get(id, owner).await
    }

    async fn list(&self, owner: OwnerId, filter: &ListFilter) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list(owner, filter).await
    }

    async fn audit_trail(
        &self,
        owner: OwnerId,
        item_id: Option<InventoryItemId>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        (**self).audit_trail(owner, item_id).await
    }

    async fn highest_owner_id(&self) -> Result<Option<OwnerId>, StoreError> {
        (**self).highest_owner_id().await
    }
}
