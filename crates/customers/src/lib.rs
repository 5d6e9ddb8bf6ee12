//! Customer directory domain module.
//!
//! Customers are the owners that scope inventory; their id is the `OwnerId`.

pub mod customer;

pub use customer::{Customer, CustomerFields, CustomerId, CustomerPatch, NewCustomer};
