//! Entity trait: identity that survives state changes.

/// Entity marker + minimal interface.
///
/// Stores key their rows by `Entity::Id`, so mutations must never change it.
pub trait Entity {
    /// Strongly-typed entity identifier (usually a composite key value type).
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
