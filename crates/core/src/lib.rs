//! `fieldtrack-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! errors, identifiers, the active-owner scope and loose numeric input.

pub mod entity;
pub mod error;
pub mod id;
pub mod numeric;
pub mod owner;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::OwnerId;
pub use numeric::Numeric;
pub use owner::ActiveOwner;
