use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fieldtrack_core::OwnerId;
use fieldtrack_inventory::{
    AuditAction, AuditEntry, AuditEntryId, InventoryItem, InventoryItemId, ItemUpdate, ListFilter, NewItem,
};

use super::store::{LedgerStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<InventoryItemId, InventoryItem>,
    audit: Vec<AuditEntry>,
    last_item_id: i64,
    last_audit_id: i64,
}

impl Tables {
    fn append_audit(
        &mut self,
        item_id: InventoryItemId,
        action: AuditAction,
        owner_id: OwnerId,
        at: DateTime<Utc>,
    ) -> AuditEntry {
        self.last_audit_id += 1;
        let entry = AuditEntry {
            id: AuditEntryId::new(self.last_audit_id),
            item_id,
            action,
            owner_id,
            timestamp: at,
        };
        self.audit.push(entry.clone());
        entry
    }

    fn scoped_mut(&mut self, id: InventoryItemId, owner: OwnerId) -> Option<&mut InventoryItem> {
        self.items
            .get_mut(&id)
            .filter(|item| item.owner_id == Some(owner))
    }
}

/// In-memory ledger store for tests/dev.
///
/// Items and audit entries sit behind one lock, so a mutation and its audit
/// append are observed together or not at all.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row as-is, bypassing owner stamping and the audit trail.
    /// Only for simulating legacy rows (e.g. `owner_id = NULL`) in tests.
    pub fn seed_raw(&self, item: InventoryItem) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.last_item_id = tables.last_item_id.max(item.id.get());
        tables.items.insert(item.id, item);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert(&self, item: NewItem, at: DateTime<Utc>) -> Result<(InventoryItem, AuditEntry), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());

        tables.last_item_id += 1;
        let id = InventoryItemId::new(tables.last_item_id);
        let owner = item.owner_id;
        let item = item.into_item(id, at);
        tables.items.insert(id, item.clone());

        let entry = tables.append_audit(id, AuditAction::Create, owner, at);
        Ok((item, entry))
    }

    async fn update(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        update: &ItemUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<(InventoryItem, AuditEntry)>, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());

        let Some(item) = tables.scoped_mut(id, owner) else {
            return Ok(None);
        };
        update.apply(item).map_err(StoreError::Rejected)?;
        let item = item.clone();

        let entry = tables.append_audit(id, AuditAction::Update, owner, at);
        Ok(Some((item, entry)))
    }

    async fn delete(
        &self,
        id: InventoryItemId,
        owner: OwnerId,
        at: DateTime<Utc>,
    ) -> Result<Option<AuditEntry>, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());

        if tables.scoped_mut(id, owner).is_none() {
            return Ok(None);
        }
        tables.items.remove(&id);

        Ok(Some(tables.append_audit(id, AuditAction::Delete, owner, at)))
    }

    async fn get(&self, id: InventoryItemId, owner: OwnerId) -> Result<Option<InventoryItem>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables
            .items
            .get(&id)
            .filter(|item| item.owner_id == Some(owner))
            .cloned())
    }

    async fn list(&self, owner: OwnerId, filter: &ListFilter) -> Result<Vec<InventoryItem>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables
            .items
            .values()
            .filter(|item| item.owner_id == Some(owner) && filter.matches(item))
            .cloned()
            .collect())
    }

    async fn audit_trail(
        &self,
        owner: OwnerId,
        item_id: Option<InventoryItemId>,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables
            .audit
            .iter()
            .filter(|e| e.owner_id == owner && item_id.is_none_or(|id| e.item_id == id))
            .cloned()
            .collect())
    }

    async fn highest_owner_id(&self) -> Result<Option<OwnerId>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let from_items = tables.items.values().filter_map(|item| item.owner_id);
        let from_audit = tables.audit.iter().map(|e| e.owner_id);
        Ok(from_items.chain(from_audit).max())
    }
}
