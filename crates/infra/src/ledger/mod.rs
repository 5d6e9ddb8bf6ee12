//! Owner-scoped inventory ledger.
//!
//! `InventoryLedger` is the only write path for inventory. Every call takes
//! the session's [`ActiveOwner`] explicitly; the store appends the audit entry
//! in the same atomic unit as the mutation.

mod memory;
mod postgres;
mod store;

pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use store::{LedgerStore, StoreError};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use fieldtrack_core::{ActiveOwner, DomainError, OwnerId};
use fieldtrack_inventory::{AuditEntry, InventoryItem, InventoryItemId, ItemFields, ItemUpdate, ListFilter};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("inventory item not found")]
    NotFound,

    #[error("owner isolation violation: {0}")]
    OwnerIsolation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) | DomainError::Conflict(msg) => {
                LedgerError::Validation(msg)
            }
            DomainError::NotFound => LedgerError::NotFound,
            DomainError::OwnerIsolation(msg) => LedgerError::OwnerIsolation(msg),
        }
    }
}

/// Inventory operations scoped to an active owner.
#[derive(Debug, Clone)]
pub struct InventoryLedger<S> {
    store: S,
}

impl<S: LedgerStore> InventoryLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Items of the active owner. No active owner means an empty list.
    #[instrument(skip(self, filter), fields(owner = ?active.owner_id()), err)]
    pub async fn list_items(&self, active: ActiveOwner, filter: &ListFilter) -> LedgerResult<Vec<InventoryItem>> {
        let Some(owner) = active.owner_id() else {
            return Ok(Vec::new());
        };
        Ok(self.store.list(owner, filter).await?)
    }

    /// Single scoped read; items of other owners are reported as not found.
    #[instrument(skip(self), fields(owner = ?active.owner_id()), err)]
    pub async fn get_item(&self, id: InventoryItemId, active: ActiveOwner) -> LedgerResult<InventoryItem> {
        let Some(owner) = active.owner_id() else {
            return Err(LedgerError::NotFound);
        };
        self.store.get(id, owner).await?.ok_or(LedgerError::NotFound)
    }

    #[instrument(skip(self, fields), fields(owner = ?active.owner_id()), err)]
    pub async fn create_item(&self, fields: ItemFields, active: ActiveOwner) -> LedgerResult<InventoryItem> {
        let new_item = fields.into_new_item(active).inspect_err(|e| {
            if matches!(e, DomainError::OwnerIsolation(_)) {
                warn!(error = %e, "rejected inventory create");
            }
        })?;

        let (item, audit) = self.store.insert(new_item, Utc::now()).await?;
        info!(item_id = %item.id, audit_id = %audit.id, "inventory item created");
        Ok(item)
    }

    /// Overwrite the fields present in `fields`; the owner never changes.
    #[instrument(skip(self, fields), fields(owner = ?active.owner_id()), err)]
    pub async fn update_item(
        &self,
        id: InventoryItemId,
        fields: ItemFields,
        active: ActiveOwner,
    ) -> LedgerResult<InventoryItem> {
        let patch = fields.into_patch(active).inspect_err(|e| {
            if matches!(e, DomainError::OwnerIsolation(_)) {
                warn!(error = %e, "rejected inventory update");
            }
        })?;
        self.apply(id, ItemUpdate::Patch(patch), active).await
    }

    /// Relative stock change, audited as an update.
    #[instrument(skip(self), fields(owner = ?active.owner_id()), err)]
    pub async fn adjust_quantity(
        &self,
        id: InventoryItemId,
        adjustment: f64,
        active: ActiveOwner,
    ) -> LedgerResult<InventoryItem> {
        active.resolve_write_owner(None)?;
        if !adjustment.is_finite() {
            return Err(LedgerError::Validation("adjustment must be numeric".to_string()));
        }
        self.apply(id, ItemUpdate::AdjustQuantity(adjustment), active).await
    }

    #[instrument(skip(self), fields(owner = ?active.owner_id()), err)]
    pub async fn delete_item(&self, id: InventoryItemId, active: ActiveOwner) -> LedgerResult<AuditEntry> {
        let owner = active.resolve_write_owner(None)?;

        let audit = self
            .store
            .delete(id, owner, Utc::now())
            .await?
            .ok_or(LedgerError::NotFound)?;

        info!(item_id = %id, audit_id = %audit.id, "inventory item deleted");
        Ok(audit)
    }

    /// Audit entries of the active owner, including those of deleted items.
    #[instrument(skip(self), fields(owner = ?active.owner_id()), err)]
    pub async fn audit_trail(
        &self,
        active: ActiveOwner,
        item_id: Option<InventoryItemId>,
    ) -> LedgerResult<Vec<AuditEntry>> {
        let Some(owner) = active.owner_id() else {
            return Ok(Vec::new());
        };
        Ok(self.store.audit_trail(owner, item_id).await?)
    }

    /// Largest owner id the ledger has ever recorded, for any owner.
    ///
    /// Owner records kept outside the ledger must hand out ids above this so
    /// a new owner never inherits rows left by an earlier one.
    pub async fn highest_owner_id(&self) -> LedgerResult<Option<OwnerId>> {
        Ok(self.store.highest_owner_id().await?)
    }

    async fn apply(&self, id: InventoryItemId, update: ItemUpdate, active: ActiveOwner) -> LedgerResult<InventoryItem> {
        let owner = active.resolve_write_owner(None)?;

        let (item, audit) = self
            .store
            .update(id, owner, &update, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::Rejected(err) => LedgerError::from(err),
                other => LedgerError::Store(other),
            })?
            .ok_or(LedgerError::NotFound)?;

        debug!(item_id = %item.id, audit_id = %audit.id, quantity = item.quantity, "inventory item updated");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fieldtrack_core::Numeric;
    use fieldtrack_inventory::AuditAction;

    use super::*;

    const OWNER: OwnerId = OwnerId::new(7);

    fn ledger() -> (InventoryLedger<Arc<InMemoryLedgerStore>>, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        (InventoryLedger::new(store.clone()), store)
    }

    fn ladder() -> ItemFields {
        ItemFields {
            name: Some("Ladder".to_string()),
            quantity: Some(Numeric::from(2.0)),
            unit: Some("each".to_string()),
            unit_cost: Some(Numeric::from(50.0)),
            location: Some("truck1".to_string()),
            ..ItemFields::default()
        }
    }

    fn as_owner(owner: OwnerId) -> ActiveOwner {
        ActiveOwner::of(owner)
    }

    #[tokio::test]
    async fn create_stamps_active_owner_and_audits() {
        let (ledger, _) = ledger();

        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();
        assert_eq!(item.owner_id, Some(OWNER));
        assert_eq!(item.name, "Ladder");
        assert_eq!(item.low_stock_alert, 0.0);
        assert_eq!(item.notes, "");

        let trail = ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::Create);
        assert_eq!(trail[0].owner_id, OWNER);
        assert_eq!(trail[0].item_id, item.id);
    }

    #[tokio::test]
    async fn numeric_strings_are_accepted() {
        let (ledger, _) = ledger();
        let fields = ItemFields {
            quantity: Some(Numeric::from("3")),
            unit_cost: Some(Numeric::from("12.50")),
            ..ladder()
        };
        let item = ledger.create_item(fields, as_owner(OWNER)).await.unwrap();
        assert_eq!(item.quantity, 3.0);
        assert_eq!(item.unit_cost, 12.5);
    }

    #[tokio::test]
    async fn missing_or_non_numeric_fields_are_rejected_without_audit() {
        let (ledger, _) = ledger();

        let missing_name = ItemFields { name: None, ..ladder() };
        assert!(matches!(
            ledger.create_item(missing_name, as_owner(OWNER)).await,
            Err(LedgerError::Validation(_))
        ));

        let bad_quantity = ItemFields {
            quantity: Some(Numeric::from("lots")),
            ..ladder()
        };
        assert!(matches!(
            ledger.create_item(bad_quantity, as_owner(OWNER)).await,
            Err(LedgerError::Validation(_))
        ));

        assert!(ledger.audit_trail(as_owner(OWNER), None).await.unwrap().is_empty());
        assert!(ledger.list_items(as_owner(OWNER), &ListFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_owner_on_create_is_rejected() {
        let (ledger, _) = ledger();
        let fields = ItemFields {
            owner_id: Some(OwnerId::new(99)),
            ..ladder()
        };

        let err = ledger.create_item(fields, as_owner(OWNER)).await.unwrap_err();
        assert!(matches!(err, LedgerError::OwnerIsolation(_)));

        assert!(ledger.list_items(as_owner(OwnerId::new(99)), &ListFilter::default()).await.unwrap().is_empty());
        assert!(ledger.audit_trail(as_owner(OWNER), None).await.unwrap().is_empty());
        assert!(ledger.audit_trail(as_owner(OwnerId::new(99)), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn matching_owner_on_create_is_accepted() {
        let (ledger, _) = ledger();
        let fields = ItemFields {
            owner_id: Some(OWNER),
            ..ladder()
        };
        let item = ledger.create_item(fields, as_owner(OWNER)).await.unwrap();
        assert_eq!(item.owner_id, Some(OWNER));
    }

    #[tokio::test]
    async fn writes_without_active_owner_are_rejected() {
        let (ledger, _) = ledger();
        assert!(matches!(
            ledger.create_item(ladder(), ActiveOwner::none()).await,
            Err(LedgerError::OwnerIsolation(_))
        ));
        assert!(matches!(
            ledger.delete_item(InventoryItemId::new(1), ActiveOwner::none()).await,
            Err(LedgerError::OwnerIsolation(_))
        ));
    }

    #[tokio::test]
    async fn update_overwrites_only_present_fields() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let patch = ItemFields {
            quantity: Some(Numeric::from(5.0)),
            ..ItemFields::default()
        };
        let updated = ledger.update_item(item.id, patch, as_owner(OWNER)).await.unwrap();
        assert_eq!(updated.name, "Ladder");
        assert_eq!(updated.quantity, 5.0);
        assert_eq!(updated.owner_id, Some(OWNER));

        let actions: Vec<_> = ledger
            .audit_trail(as_owner(OWNER), Some(item.id))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![AuditAction::Create, AuditAction::Update]);
    }

    #[tokio::test]
    async fn update_with_blank_name_is_rejected() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();
        let patch = ItemFields {
            name: Some("   ".to_string()),
            ..ItemFields::default()
        };
        assert!(matches!(
            ledger.update_item(item.id, patch, as_owner(OWNER)).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_owners_items_are_invisible() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();
        let other = as_owner(OwnerId::new(8));

        assert!(ledger.list_items(other, &ListFilter::default()).await.unwrap().is_empty());
        assert_eq!(ledger.get_item(item.id, other).await, Err(LedgerError::NotFound));

        let patch = ItemFields {
            quantity: Some(Numeric::from(0.0)),
            ..ItemFields::default()
        };
        assert_eq!(ledger.update_item(item.id, patch, other).await, Err(LedgerError::NotFound));
        assert_eq!(ledger.delete_item(item.id, other).await, Err(LedgerError::NotFound));
        assert_eq!(ledger.adjust_quantity(item.id, -1.0, other).await, Err(LedgerError::NotFound));

        assert_eq!(ledger.get_item(item.id, as_owner(OWNER)).await.unwrap().quantity, 2.0);
        assert!(ledger.audit_trail(other, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_active_owner_lists_nothing() {
        let (ledger, store) = ledger();
        ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let mut legacy = ledger.get_item(InventoryItemId::new(1), as_owner(OWNER)).await.unwrap();
        legacy.id = InventoryItemId::new(50);
        legacy.owner_id = None;
        store.seed_raw(legacy);

        assert!(ledger.list_items(ActiveOwner::none(), &ListFilter::default()).await.unwrap().is_empty());
        assert!(ledger.audit_trail(ActiveOwner::none(), None).await.unwrap().is_empty());
        assert_eq!(ledger.list_items(as_owner(OWNER), &ListFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found_without_audit() {
        let (ledger, _) = ledger();
        assert_eq!(
            ledger.delete_item(InventoryItemId::new(999), as_owner(OWNER)).await,
            Err(LedgerError::NotFound)
        );
        assert!(ledger.audit_trail(as_owner(OWNER), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn audit_survives_deletion() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let audit = ledger.delete_item(item.id, as_owner(OWNER)).await.unwrap();
        assert_eq!(audit.action, AuditAction::Delete);
        assert_eq!(audit.item_id, item.id);
        assert_eq!(ledger.get_item(item.id, as_owner(OWNER)).await, Err(LedgerError::NotFound));

        let trail = ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[1].action, AuditAction::Delete);
    }

    #[tokio::test]
    async fn adjust_quantity_is_relative_and_audited() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let item = ledger.adjust_quantity(item.id, 3.0, as_owner(OWNER)).await.unwrap();
        assert_eq!(item.quantity, 5.0);
        let item = ledger.adjust_quantity(item.id, -4.5, as_owner(OWNER)).await.unwrap();
        assert_eq!(item.quantity, 0.5);

        assert!(matches!(
            ledger.adjust_quantity(item.id, f64::NAN, as_owner(OWNER)).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn adjustment_overflowing_quantity_is_rejected_without_audit() {
        let (ledger, _) = ledger();
        let huge = ItemFields {
            quantity: Some(Numeric::from(1e308)),
            ..ladder()
        };
        let item = ledger.create_item(huge, as_owner(OWNER)).await.unwrap();

        assert!(matches!(
            ledger.adjust_quantity(item.id, 1e308, as_owner(OWNER)).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.get_item(item.id, as_owner(OWNER)).await.unwrap().quantity, 1e308);
        assert_eq!(ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn foreign_owner_on_update_is_rejected_without_audit() {
        let (ledger, _) = ledger();
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let patch = ItemFields {
            quantity: Some(Numeric::from(0.0)),
            owner_id: Some(OwnerId::new(99)),
            ..ItemFields::default()
        };
        let err = ledger.update_item(item.id, patch, as_owner(OWNER)).await.unwrap_err();
        assert!(matches!(err, LedgerError::OwnerIsolation(_)));

        let stored = ledger.get_item(item.id, as_owner(OWNER)).await.unwrap();
        assert_eq!(stored, item);
        let actions: Vec<_> = ledger
            .audit_trail(as_owner(OWNER), Some(item.id))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec![AuditAction::Create]);
    }

    #[tokio::test]
    async fn list_filters_by_location_and_low_stock() {
        let (ledger, _) = ledger();
        ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();
        let gutter = ItemFields {
            name: Some("5in gutter".to_string()),
            quantity: Some(Numeric::from(4.0)),
            unit: Some("ft".to_string()),
            location: Some("shop".to_string()),
            low_stock_alert: Some(Numeric::from(10.0)),
            ..ladder()
        };
        ledger.create_item(gutter, as_owner(OWNER)).await.unwrap();

        let in_shop = ListFilter {
            location: Some("shop".to_string()),
            low_stock: false,
        };
        let items = ledger.list_items(as_owner(OWNER), &in_shop).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "5in gutter");

        let low = ListFilter {
            location: None,
            low_stock: true,
        };
        let items = ledger.list_items(as_owner(OWNER), &low).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].location, "shop");
    }

    #[tokio::test]
    async fn highest_owner_id_covers_items_and_deleted_items() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.highest_owner_id().await.unwrap(), None);

        ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();
        let later = ledger.create_item(ladder(), as_owner(OwnerId::new(12))).await.unwrap();
        ledger.delete_item(later.id, as_owner(OwnerId::new(12))).await.unwrap();

        assert_eq!(ledger.highest_owner_id().await.unwrap(), Some(OwnerId::new(12)));
    }

    #[tokio::test]
    async fn concurrent_adjustments_are_not_lost() {
        let (ledger, _) = ledger();
        let ledger = Arc::new(ledger);
        let item = ledger.create_item(ladder(), as_owner(OWNER)).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            tasks.push(tokio::spawn(async move {
                ledger.adjust_quantity(item.id, 1.0, as_owner(OWNER)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(ledger.get_item(item.id, as_owner(OWNER)).await.unwrap().quantity, 22.0);
        assert_eq!(ledger.audit_trail(as_owner(OWNER), Some(item.id)).await.unwrap().len(), 21);
    }
}
