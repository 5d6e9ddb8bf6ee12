use chrono::NaiveDate;
use serde::Deserialize;

use fieldtrack_core::numeric::{self, Numeric};
use fieldtrack_core::{DomainError, DomainResult, OwnerId};
use fieldtrack_inventory::{InventoryItemId, ListFilter};
use fieldtrack_jobs::{JobFields, NewPhoto};
use fieldtrack_materials::MaterialId;

use crate::app::services::LineRequest;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// `owner_id: null` clears the active owner.
#[derive(Debug, Deserialize)]
pub struct SetOwnerRequest {
    pub owner_id: Option<OwnerId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub location: Option<String>,
    pub low_stock: Option<String>,
}

impl InventoryQuery {
    pub fn into_filter(self) -> ListFilter {
        ListFilter {
            location: self.location.filter(|l| !l.trim().is_empty()),
            low_stock: self.low_stock.as_deref().is_some_and(is_truthy),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub adjustment: Option<Numeric>,
}

impl AdjustRequest {
    pub fn adjustment(&self) -> DomainResult<f64> {
        numeric::required(self.adjustment.as_ref(), "adjustment")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub item_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub fields: JobFields,
    #[serde(default)]
    pub use_ai_estimate: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: String,
}

/// Exactly one of `material_id` / `inventory_item_id`.
#[derive(Debug, Deserialize)]
pub struct AddMaterialRequest {
    pub material_id: Option<MaterialId>,
    pub inventory_item_id: Option<InventoryItemId>,
    pub quantity: Option<Numeric>,
}

impl AddMaterialRequest {
    pub fn into_line(self) -> DomainResult<LineRequest> {
        let quantity = numeric::required(self.quantity.as_ref(), "quantity")?;
        match (self.material_id, self.inventory_item_id) {
            (Some(material_id), None) => Ok(LineRequest::Library { material_id, quantity }),
            (None, Some(item_id)) => Ok(LineRequest::Inventory { item_id, quantity }),
            _ => Err(DomainError::validation(
                "exactly one of material_id or inventory_item_id is required",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub photo_data: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub analyze_photo: bool,
}

impl AddPhotoRequest {
    pub fn into_photo(self) -> (NewPhoto, bool) {
        (
            NewPhoto {
                photo_data: self.photo_data,
                caption: self.caption,
            },
            self.analyze_photo,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `YYYY-MM-DD`; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EstimateRequest {
    pub description: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotoRequest {
    pub photo_data: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequest {
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HelpRequest {
    pub question: Option<String>,
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_flag_accepts_common_truthy_values() {
        for v in ["1", "true", "on", " YES "] {
            let q = InventoryQuery {
                location: None,
                low_stock: Some(v.to_string()),
            };
            assert!(q.into_filter().low_stock, "{v}");
        }
        let q = InventoryQuery {
            location: Some("  ".to_string()),
            low_stock: Some("0".to_string()),
        };
        let filter = q.into_filter();
        assert!(!filter.low_stock);
        assert_eq!(filter.location, None);
    }

    #[test]
    fn material_line_needs_exactly_one_source() {
        let both = AddMaterialRequest {
            material_id: Some(MaterialId::new(1)),
            inventory_item_id: Some(InventoryItemId::new(1)),
            quantity: Some(Numeric::from(1.0)),
        };
        assert!(both.into_line().is_err());

        let library = AddMaterialRequest {
            material_id: Some(MaterialId::new(1)),
            inventory_item_id: None,
            quantity: Some(Numeric::from("2.5")),
        };
        assert_eq!(
            library.into_line().unwrap(),
            LineRequest::Library {
                material_id: MaterialId::new(1),
                quantity: 2.5
            }
        );
    }
}
