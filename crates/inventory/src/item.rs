use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldtrack_core::{impl_record_id, Entity, OwnerId};

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(i64);

impl_record_id!(InventoryItemId, "InventoryItemId");

/// A stocked item held for one owner (truck, shop or job-site stock).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    /// Not clamped at zero; adjustments may take it negative.
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub location: String,
    pub low_stock_alert: f64,
    pub notes: String,
    pub created: DateTime<Utc>,
    /// Nullable in storage for rows written before owner scoping existed.
    pub owner_id: Option<OwnerId>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_alert
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Optional list filters (location match, low-stock only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub location: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

impl ListFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            if item.location != location {
                return false;
            }
        }
        !self.low_stock || item.is_low_stock()
    }
}
