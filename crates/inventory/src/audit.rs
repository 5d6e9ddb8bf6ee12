use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldtrack_core::{impl_record_id, DomainError, Entity, OwnerId};

use crate::item::InventoryItemId;

/// Audit entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(i64);

impl_record_id!(AuditEntryId, "AuditEntryId");

/// Kind of inventory mutation recorded in the audit trail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            other => Err(DomainError::validation(format!("unknown audit action '{other}'"))),
        }
    }
}

/// Immutable record of one inventory mutation.
///
/// `item_id` is a plain id, not a reference: the entry outlives the item when
/// the item is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub item_id: InventoryItemId,
    pub action: AuditAction,
    pub owner_id: OwnerId,
    pub timestamp: DateTime<Utc>,
}

impl Entity for AuditEntry {
    type Id = AuditEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_text() {
        for action in [AuditAction::Create, AuditAction::Update, AuditAction::Delete] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert!("archive".parse::<AuditAction>().is_err());
    }

    #[test]
    fn action_serializes_lowercase() {
        let json = serde_json::to_string(&AuditAction::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
    }
}
