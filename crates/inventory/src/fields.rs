//! Write-side input for inventory items.
//!
//! `ItemFields` is what a caller sends; it is validated into a `NewItem` (create)
//! or an `ItemPatch` (update) together with the owner resolved from the
//! `ActiveOwner` scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldtrack_core::numeric::{self, Numeric};
use fieldtrack_core::{ActiveOwner, DomainError, DomainResult, OwnerId};

use crate::item::{InventoryItem, InventoryItemId};

/// Raw, partially-present item fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: Option<String>,
    pub quantity: Option<Numeric>,
    pub unit: Option<String>,
    pub unit_cost: Option<Numeric>,
    pub location: Option<String>,
    pub low_stock_alert: Option<Numeric>,
    pub notes: Option<String>,
    /// Accepted only when it equals the active owner.
    pub owner_id: Option<OwnerId>,
}

/// A validated item ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub location: String,
    pub low_stock_alert: f64,
    pub notes: String,
    pub owner_id: OwnerId,
}

impl NewItem {
    pub fn into_item(self, id: InventoryItemId, created: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            unit_cost: self.unit_cost,
            location: self.location,
            low_stock_alert: self.low_stock_alert,
            notes: self.notes,
            created,
            owner_id: Some(self.owner_id),
        }
    }
}

/// Validated partial update; `None` keeps the stored value.
///
/// No owner field: an update never moves an item to a
/// different owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub unit_cost: Option<f64>,
    pub location: Option<String>,
    pub low_stock_alert: Option<f64>,
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn apply(&self, item: &mut InventoryItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = &self.unit {
            item.unit = unit.clone();
        }
        if let Some(unit_cost) = self.unit_cost {
            item.unit_cost = unit_cost;
        }
        if let Some(location) = &self.location {
            item.location = location.clone();
        }
        if let Some(alert) = self.low_stock_alert {
            item.low_stock_alert = alert;
        }
        if let Some(notes) = &self.notes {
            item.notes = notes.clone();
        }
    }
}

/// A mutation applied to an existing item under the store's lock/transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpdate {
    Patch(ItemPatch),
    /// Relative stock change (positive restocks, negative consumes).
    AdjustQuantity(f64),
}

impl ItemUpdate {
    /// Apply to `item`. An adjustment whose result is not a finite quantity
    /// is rejected and leaves `item` untouched.
    pub fn apply(&self, item: &mut InventoryItem) -> DomainResult<()> {
        match self {
            ItemUpdate::Patch(patch) => patch.apply(item),
            ItemUpdate::AdjustQuantity(delta) => {
                let quantity = item.quantity + delta;
                if !quantity.is_finite() {
                    return Err(DomainError::validation(format!(
                        "adjusting quantity {} by {delta} does not leave a finite quantity",
                        item.quantity
                    )));
                }
                item.quantity = quantity;
            }
        }
        Ok(())
    }
}

impl ItemFields {
    /// Validate for creation and stamp the owner.
    pub fn into_new_item(self, active: ActiveOwner) -> DomainResult<NewItem> {
        let owner_id = active.resolve_write_owner(self.owner_id)?;

        Ok(NewItem {
            name: required_text(self.name, "name")?,
            quantity: numeric::required(self.quantity.as_ref(), "quantity")?,
            unit: required_text(self.unit, "unit")?,
            unit_cost: numeric::required(self.unit_cost.as_ref(), "unit_cost")?,
            location: required_text(self.location, "location")?,
            low_stock_alert: numeric::optional(self.low_stock_alert.as_ref(), "low_stock_alert")?
                .unwrap_or(0.0),
            notes: self.notes.unwrap_or_default(),
            owner_id,
        })
    }

    /// Validate for update. Only present fields end up in the patch.
    pub fn into_patch(self, active: ActiveOwner) -> DomainResult<ItemPatch> {
        active.resolve_write_owner(self.owner_id)?;

        Ok(ItemPatch {
            name: self.name.map(|v| required_text(Some(v), "name")).transpose()?,
            quantity: numeric::optional(self.quantity.as_ref(), "quantity")?,
            unit: self.unit.map(|v| required_text(Some(v), "unit")).transpose()?,
            unit_cost: numeric::optional(self.unit_cost.as_ref(), "unit_cost")?,
            location: self
                .location
                .map(|v| required_text(Some(v), "location"))
                .transpose()?,
            low_stock_alert: numeric::optional(self.low_stock_alert.as_ref(), "low_stock_alert")?,
            notes: self.notes,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(DomainError::validation(format!("{field} cannot be empty"))),
        None => Err(DomainError::validation(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owner(id: i64) -> ActiveOwner {
        ActiveOwner::of(OwnerId::new(id))
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

    fn stored(new: NewItem) -> InventoryItem {
        new.into_item(InventoryItemId::new(3), Utc::now())
    }

    #[test]
    fn create_defaults_owner_to_active_owner() {
        let new = ladder().into_new_item(owner(7)).unwrap();
        assert_eq!(new.owner_id, OwnerId::new(7));
        assert_eq!(new.low_stock_alert, 0.0);
        assert_eq!(new.notes, "");
    }

    #[test]
    fn create_rejects_foreign_owner() {
        let fields = ItemFields {
            owner_id: Some(OwnerId::new(99)),
            ..ladder()
        };
        let err = fields.into_new_item(owner(7)).unwrap_err();
        assert!(matches!(err, DomainError::OwnerIsolation(_)));
    }

    #[test]
    fn create_requires_every_mandatory_field() {
        for strip in ["name", "quantity", "unit", "unit_cost", "location"] {
            let mut fields = ladder();
            match strip {
                "name" => fields.name = None,
                "quantity" => fields.quantity = None,
                "unit" => fields.unit = None,
                "unit_cost" => fields.unit_cost = None,
                _ => fields.location = None,
            }
            let err = fields.into_new_item(owner(7)).unwrap_err();
            assert_eq!(err, DomainError::validation(format!("{strip} is required")));
        }
    }

    #[test]
    fn create_rejects_non_numeric_quantity() {
        let fields = ItemFields {
            quantity: Some("two".into()),
            ..ladder()
        };
        assert!(matches!(
            fields.into_new_item(owner(7)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn create_accepts_numeric_strings() {
        let fields = ItemFields {
            quantity: Some("2".into()),
            unit_cost: Some("49.99".into()),
            low_stock_alert: Some("1".into()),
            ..ladder()
        };
        let new = fields.into_new_item(owner(7)).unwrap();
        assert_eq!(new.quantity, 2.0);
        assert_eq!(new.unit_cost, 49.99);
        assert_eq!(new.low_stock_alert, 1.0);
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut item = stored(ladder().into_new_item(owner(7)).unwrap());
        let patch = ItemFields {
            quantity: Some(Numeric::from(5.0)),
            ..ItemFields::default()
        }
        .into_patch(owner(7))
        .unwrap();

        patch.apply(&mut item);

        assert_eq!(item.name, "Ladder");
        assert_eq!(item.quantity, 5.0);
        assert_eq!(item.owner_id, Some(OwnerId::new(7)));
    }

    #[test]
    fn patch_rejects_blank_name() {
        let err = ItemFields {
            name: Some("   ".to_string()),
            ..ItemFields::default()
        }
        .into_patch(owner(7))
        .unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
    }

    #[test]
    fn adjust_is_relative() {
        let mut item = stored(ladder().into_new_item(owner(7)).unwrap());
        ItemUpdate::AdjustQuantity(-3.0).apply(&mut item).unwrap();
        assert_eq!(item.quantity, -1.0);
    }

    #[test]
    fn adjust_rejects_overflowing_result() {
        let mut item = stored(ladder().into_new_item(owner(7)).unwrap());
        item.quantity = 1e308;

        let err = ItemUpdate::AdjustQuantity(1e308).apply(&mut item).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(item.quantity, 1e308);
    }

    #[test]
    fn fields_deserialize_from_form_like_json() {
        let fields: ItemFields = serde_json::from_str(
            r#"{"name":"Gutter guard","quantity":"10","unit":"ft","unit_cost":3,"location":"shop"}"#,
        )
        .unwrap();
        assert!(fields.into_new_item(owner(1)).is_ok());
    }

    proptest! {
        #[test]
        fn quantity_patch_keeps_every_other_field(q in -1_000.0f64..1_000.0) {
            let original = stored(ladder().into_new_item(owner(7)).unwrap());
            let mut item = original.clone();
            let patch = ItemFields { quantity: Some(q.into()), ..ItemFields::default() }
                .into_patch(owner(7))
                .unwrap();
            patch.apply(&mut item);

            prop_assert_eq!(item.quantity, q);
            prop_assert_eq!(&item.name, &original.name);
            prop_assert_eq!(&item.unit, &original.unit);
            prop_assert_eq!(item.unit_cost, original.unit_cost);
            prop_assert_eq!(&item.location, &original.location);
            prop_assert_eq!(item.owner_id, original.owner_id);
        }
    }
}
