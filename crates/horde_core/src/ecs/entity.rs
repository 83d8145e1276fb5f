//! # Entity Identifiers
//!
//! Entities are opaque positive integers handed out by the [`World`](super::World).
//! Ids are allocated from a monotonic counter and never reused within a run,
//! so a stale id can never alias a newer entity.

use std::fmt;

/// Unique identifier for an entity.
///
/// Zero is reserved as [`EntityId::NULL`]; the first allocated id is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Null/invalid entity id. Never allocated.
    pub const NULL: Self = Self(0);

    /// Creates an entity id from its raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the slot of this entity in sparse lookup arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this entity id is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic entity id allocator.
#[derive(Debug)]
pub(crate) struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    pub(crate) const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocates the next id. Ids are never handed out twice.
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        // u32 exhaustion would take years at any realistic spawn rate
        self.next = self.next.saturating_add(1);
        id
    }

    /// Number of ids handed out so far.
    pub(crate) const fn allocated(&self) -> u32 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_zero() {
        assert!(EntityId::NULL.is_null());
        assert!(EntityId::default().is_null());
        assert!(!EntityId::from_raw(1).is_null());
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();

        assert_eq!(a.raw(), 1);
        assert!(a < b && b < c);
        assert_eq!(alloc.allocated(), 3);
    }
}
