use serde::{Deserialize, Serialize};

use fieldtrack_core::numeric::{self, Numeric};
use fieldtrack_core::{impl_record_id, DomainError, DomainResult, Entity};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(i64);

impl_record_id!(MaterialId, "MaterialId");

/// A standard material with supplier pricing, used to price job lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: String,
    pub notes: String,
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFields {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<Numeric>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterial {
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: String,
    pub notes: String,
}

impl MaterialFields {
    pub fn into_new(self) -> DomainResult<NewMaterial> {
        let name = match self.name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => return Err(DomainError::validation("name is required")),
        };

        Ok(NewMaterial {
            name,
            unit: self.unit.unwrap_or_default(),
            unit_cost: numeric::required(self.unit_cost.as_ref(), "unit_cost")?,
            supplier: self.supplier.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl NewMaterial {
    pub fn into_material(self, id: MaterialId) -> Material {
        Material {
            id,
            name: self.name,
            unit: self.unit,
            unit_cost: self.unit_cost,
            supplier: self.supplier,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_material_from_form_values() {
        let material = MaterialFields {
            name: Some("K-style gutter 5in".to_string()),
            unit: Some("ft".to_string()),
            unit_cost: Some(Numeric::from("3.25")),
            supplier: Some("ABC Supply".to_string()),
            notes: None,
        }
        .into_new()
        .unwrap()
        .into_material(MaterialId::new(1));

        assert_eq!(material.unit_cost, 3.25);
        assert_eq!(material.notes, "");
    }

    #[test]
    fn unit_cost_must_be_numeric() {
        let err = MaterialFields {
            name: Some("Hanger".to_string()),
            unit_cost: Some(Numeric::from("cheap")),
            ..MaterialFields::default()
        }
        .into_new()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
