//! Inventory domain module.
//!
//! Owner-scoped inventory records, write validation and the audit trail model.
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod audit;
pub mod fields;
pub mod item;

pub use audit::{AuditAction, AuditEntry, AuditEntryId};
pub use fields::{ItemFields, ItemPatch, ItemUpdate, NewItem};
pub use item::{InventoryItem, InventoryItemId, ListFilter};
