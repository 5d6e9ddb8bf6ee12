//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Record stores key entities by this id; ids are assigned by the store on
/// insert and never change afterwards.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
