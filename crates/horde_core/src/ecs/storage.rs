//! # Component Storage
//!
//! Sparse-set storage for a single component type.
//!
//! The storage keeps three arrays:
//! - `dense_ids` / `dense_data`: packed, index-aligned columns (iteration order)
//! - `sparse`: entity slot -> dense index, `EMPTY` when absent
//!
//! Lookup, insert and remove are O(1). Removal swap-removes, so dense order is
//! implementation-defined and changes across structural mutations.
//!
//! The dense columns are the "fast path" view for hot loops. Because they are
//! handed out as borrowed slices, the borrow checker already guarantees that
//! no caller holds a view across an insert or remove.

use std::any::Any;

use super::component::Component;
use super::entity::EntityId;

/// Sparse slot value meaning "no component for this entity".
const EMPTY: u32 = u32::MAX;

/// Storage for a single component type.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new();
/// storage.insert(id, Position::new(1.0, 2.0));
/// let (ids, positions) = storage.as_slices();
/// ```
#[derive(Debug)]
pub struct ComponentStorage<C: Component> {
    /// Entity owning each dense slot.
    dense_ids: Vec<EntityId>,
    /// Component values, index-aligned with `dense_ids`.
    dense_data: Vec<C>,
    /// Entity slot -> dense index.
    sparse: Vec<u32>,
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dense_ids: Vec::new(),
            dense_data: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Creates an empty storage with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense_ids: Vec::with_capacity(capacity),
            dense_data: Vec::with_capacity(capacity),
            sparse: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn dense_index(&self, id: EntityId) -> Option<usize> {
        match self.sparse.get(id.index()) {
            Some(&slot) if slot != EMPTY => Some(slot as usize),
            _ => None,
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense_ids.len()
    }

    /// Returns true when no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense_ids.is_empty()
    }

    /// Checks whether `id` has a component in this storage. O(1).
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.dense_index(id).is_some()
    }

    /// Inserts or overwrites the component for `id`.
    ///
    /// Returns the previous value when one was overwritten.
    pub fn insert(&mut self, id: EntityId, component: C) -> Option<C> {
        if let Some(idx) = self.dense_index(id) {
            return Some(std::mem::replace(&mut self.dense_data[idx], component));
        }

        let slot = id.index();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, EMPTY);
        }
        // Dense length is bounded by the number of live entities, far below u32::MAX
        #[allow(clippy::cast_possible_truncation)]
        let dense = self.dense_ids.len() as u32;
        self.sparse[slot] = dense;
        self.dense_ids.push(id);
        self.dense_data.push(component);
        None
    }

    /// Gets a reference to the component for `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        self.dense_index(id).map(|idx| &self.dense_data[idx])
    }

    /// Gets a mutable reference to the component for `id`.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        let idx = self.dense_index(id)?;
        Some(&mut self.dense_data[idx])
    }

    /// Copies the component out, or returns the type default when absent.
    #[inline]
    #[must_use]
    pub fn get_or_default(&self, id: EntityId) -> C
    where
        C: Clone,
    {
        self.get(id).cloned().unwrap_or_default()
    }

    /// Removes the component for `id`. No-op when absent.
    ///
    /// The last dense element is moved into the freed slot.
    pub fn remove(&mut self, id: EntityId) -> Option<C> {
        let idx = self.dense_index(id)?;
        self.sparse[id.index()] = EMPTY;

        let last = self.dense_ids.len() - 1;
        if idx != last {
            let moved = self.dense_ids[last];
            // idx < len <= u32::MAX, see insert
            #[allow(clippy::cast_possible_truncation)]
            {
                self.sparse[moved.index()] = idx as u32;
            }
        }
        self.dense_ids.swap_remove(idx);
        Some(self.dense_data.swap_remove(idx))
    }

    /// Removes every component. Keeps allocated capacity.
    pub fn clear(&mut self) {
        for id in &self.dense_ids {
            self.sparse[id.index()] = EMPTY;
        }
        self.dense_ids.clear();
        self.dense_data.clear();
    }

    /// Entity ids in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.dense_ids
    }

    /// Raw dense view: `(ids, values)`, index-aligned.
    ///
    /// Useful for batch processing.
    #[inline]
    #[must_use]
    pub fn as_slices(&self) -> (&[EntityId], &[C]) {
        (&self.dense_ids, &self.dense_data)
    }

    /// Mutable raw dense view: ids stay read-only, values are writable.
    #[inline]
    pub fn as_slices_mut(&mut self) -> (&[EntityId], &mut [C]) {
        (&self.dense_ids, &mut self.dense_data)
    }

    /// Iterates over all `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.dense_ids.iter().copied().zip(self.dense_data.iter())
    }

    /// Iterates mutably over all `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.dense_ids.iter().copied().zip(self.dense_data.iter_mut())
    }
}

/// Type-erased view of a [`ComponentStorage`], used by the world registry.
pub trait ErasedStorage: Any {
    /// Removes the entity's component, if any.
    fn remove_entity(&mut self, id: EntityId);

    /// Checks whether the entity has a component in this storage.
    fn contains_entity(&self, id: EntityId) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Returns true when the storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name of the stored component, for diagnostics.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete storage.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete storage.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, id: EntityId) {
        self.remove(id);
    }

    fn contains_entity(&self, id: EntityId) -> bool {
        self.contains(id)
    }

    fn len(&self) -> usize {
        self.dense_ids.len()
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Position;

    fn id(raw: u32) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn test_storage_insert_get() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new();

        let pos = Position::new(1.0, 2.0);
        assert!(storage.insert(id(50), pos).is_none());

        assert_eq!(storage.get(id(50)), Some(&pos));
        assert!(storage.contains(id(50)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_storage_overwrite_returns_previous() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new();
        storage.insert(id(1), Position::new(1.0, 1.0));

        let previous = storage.insert(id(1), Position::new(2.0, 2.0));
        assert_eq!(previous, Some(Position::new(1.0, 1.0)));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(id(1)), Some(&Position::new(2.0, 2.0)));
    }

    #[test]
    fn test_storage_absent_lookups() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new();
        assert!(storage.get(id(7)).is_none());
        assert!(!storage.contains(id(7)));
        assert_eq!(storage.get_or_default(id(7)), Position::default());
        assert!(storage.remove(id(7)).is_none());
    }

    #[test]
    fn test_storage_swap_remove_keeps_lookup_valid() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new();
        for raw in 1..=4 {
            storage.insert(id(raw), Position::new(raw as f32, 0.0));
        }

        assert_eq!(storage.remove(id(2)), Some(Position::new(2.0, 0.0)));
        assert_eq!(storage.len(), 3);
        assert!(!storage.contains(id(2)));

        // The element moved into the hole must still be reachable.
        for raw in [1, 3, 4] {
            assert_eq!(storage.get(id(raw)).map(|p| p.x), Some(raw as f32));
        }

        let (ids, values) = storage.as_slices();
        assert_eq!(ids.len(), values.len());
        for (e, v) in ids.iter().zip(values) {
            assert_eq!(e.raw() as f32, v.x);
        }
    }

    #[test]
    fn test_storage_dense_mut_view() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new();
        storage.insert(id(3), Position::new(0.0, 0.0));
        storage.insert(id(9), Position::new(0.0, 0.0));

        let (_, values) = storage.as_slices_mut();
        for v in values.iter_mut() {
            v.y += 1.0;
        }

        assert!(storage.iter().all(|(_, p)| (p.y - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_storage_clear() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::with_capacity(8);
        storage.insert(id(1), Position::default());
        storage.insert(id(2), Position::default());
        storage.clear();

        assert!(storage.is_empty());
        assert!(!storage.contains(id(1)));
        storage.insert(id(2), Position::new(5.0, 5.0));
        assert_eq!(storage.get(id(2)).map(|p| p.x), Some(5.0));
    }
}
