//! Materials price library (standard materials with unit pricing).

pub mod material;

pub use material::{Material, MaterialFields, MaterialId, NewMaterial};
