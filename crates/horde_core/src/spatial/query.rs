//! Reusable fixed-capacity buffer for neighbor queries.

use super::grid::{Neighbors, SpatialIndex};
use crate::ecs::EntityId;
use crate::error::{CoreError, CoreResult};

/// Caller-owned result buffer for [`SpatialIndex::query_neighbors`].
///
/// Systems keep one of these between frames so queries never allocate.
#[derive(Clone, Debug)]
pub struct QueryBuffer {
    ids: Vec<EntityId>,
    len: usize,
}

impl QueryBuffer {
    /// Creates a buffer holding up to `capacity` ids.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ZeroQueryCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroQueryCapacity);
        }
        Ok(Self {
            ids: vec![EntityId::NULL; capacity],
            len: 0,
        })
    }

    /// Maximum number of ids one query can return.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ids.len()
    }

    /// Runs a query, replacing the previous contents.
    pub fn fill<I: SpatialIndex + ?Sized>(
        &mut self,
        index: &I,
        x: f32,
        y: f32,
        radius: f32,
    ) -> Neighbors {
        let found = index.query_neighbors(x, y, radius, &mut self.ids);
        self.len = found.count;
        found
    }

    /// Ids returned by the last query.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.ids[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SpatialHashGrid;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(QueryBuffer::new(0).err(), Some(CoreError::ZeroQueryCapacity));
    }

    #[test]
    fn test_fill_replaces_previous_result() -> CoreResult<()> {
        let mut grid = SpatialHashGrid::new(1.0)?;
        grid.insert(EntityId::from_raw(1), 0.0, 0.0);
        grid.insert(EntityId::from_raw(2), 0.2, 0.0);

        let mut buf = QueryBuffer::new(8)?;
        assert_eq!(buf.fill(&grid, 0.0, 0.0, 1.0).count, 2);
        assert_eq!(buf.as_slice().len(), 2);

        assert_eq!(buf.fill(&grid, 100.0, 100.0, 1.0).count, 0);
        assert!(buf.as_slice().is_empty());
        assert_eq!(buf.capacity(), 8);
        Ok(())
    }
}
