use serde::{Deserialize, Serialize};

use fieldtrack_core::{DomainError, DomainResult};

/// Where a job line was priced from.
///
/// Ids are kept as plain integers: lines are a historical record and must not
/// break when the library entry or inventory item is later removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum LineSource {
    Material(i64),
    InventoryItem(i64),
}

/// A priced quantity of material used on a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMaterialLine {
    pub source: LineSource,
    pub name: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
}

impl JobMaterialLine {
    pub fn new(source: LineSource, name: impl Into<String>, quantity: f64, unit_cost: f64) -> DomainResult<Self> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(DomainError::validation("quantity must be a positive number"));
        }
        Ok(Self {
            source,
            name: name.into(),
            quantity,
            unit_cost,
            total_cost: quantity * unit_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_quantity_times_unit_cost() {
        let line = JobMaterialLine::new(LineSource::Material(1), "Hanger", 12.0, 1.5).unwrap();
        assert_eq!(line.total_cost, 18.0);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(JobMaterialLine::new(LineSource::Material(1), "Hanger", 0.0, 1.5).is_err());
        assert!(JobMaterialLine::new(LineSource::Material(1), "Hanger", -2.0, 1.5).is_err());
    }
}
