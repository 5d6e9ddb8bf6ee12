//! Infrastructure layer: inventory ledger and its stores, in-memory record
//! stores, reporting and configuration.

pub mod config;
pub mod ledger;
pub mod records;
pub mod reports;

pub use config::AppConfig;
pub use ledger::{
    InMemoryLedgerStore, InventoryLedger, LedgerError, LedgerResult, LedgerStore, PostgresLedgerStore, StoreError,
};
pub use records::InMemoryRecords;
