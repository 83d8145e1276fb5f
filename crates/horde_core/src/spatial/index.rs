//! # Per-Population Indices
//!
//! A simulation keeps one grid per tracked population (for example hostiles
//! and pickups), each tuned to its own cell size. [`LayerIndex<L>`] wraps a
//! grid and is registered as a world service, so every population gets its
//! own capability key. [`IndexBuilderSystem<L>`] rebuilds it once per frame.

use std::fmt;
use std::marker::PhantomData;

use super::grid::{GridStats, Neighbors, SpatialHashGrid, SpatialIndex};
use crate::ecs::{Component, EntityId, Position, System, World};
use crate::error::CoreResult;

/// Describes one indexed population.
///
/// # Example
///
/// ```rust,ignore
/// pub struct Hostiles;
///
/// impl IndexLayer for Hostiles {
///     type Member = Hostile;
///     const NAME: &'static str = "hostiles";
///     const BUILDER_NAME: &'static str = "index_builder_hostiles";
///     const CAPABILITY: &'static [&'static str] = &["index:hostiles"];
/// }
/// ```
pub trait IndexLayer: 'static {
    /// Marker component that puts an entity in this population.
    type Member: Component;

    /// Population name, for logs.
    const NAME: &'static str;

    /// Name of the builder system.
    const BUILDER_NAME: &'static str;

    /// Capability label provided by the builder and required by consumers.
    const CAPABILITY: &'static [&'static str];
}

/// Grid service for population `L`.
pub struct LayerIndex<L: IndexLayer> {
    grid: SpatialHashGrid,
    _layer: PhantomData<fn() -> L>,
}

impl<L: IndexLayer> fmt::Debug for LayerIndex<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerIndex")
            .field("layer", &L::NAME)
            .field("grid", &self.grid)
            .finish()
    }
}

impl<L: IndexLayer> LayerIndex<L> {
    /// Creates an empty index.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCellSize` for a non-positive cell size.
    pub fn new(cell_size: f32) -> CoreResult<Self> {
        Ok(Self {
            grid: SpatialHashGrid::new(cell_size)?,
            _layer: PhantomData,
        })
    }

    /// The underlying grid.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    /// The underlying grid, mutably.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut SpatialHashGrid {
        &mut self.grid
    }

    /// Grid diagnostics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> GridStats {
        self.grid.stats()
    }
}

impl<L: IndexLayer> SpatialIndex for LayerIndex<L> {
    #[inline]
    fn query_neighbors(&self, x: f32, y: f32, radius: f32, out: &mut [EntityId]) -> Neighbors {
        self.grid.query_neighbors(x, y, radius, out)
    }

    #[inline]
    fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }
}

/// Rebuilds `LayerIndex<L>` from every live entity carrying `L::Member` and
/// a [`Position`].
///
/// Entities already destroyed this frame are left out. Does nothing when no
/// `LayerIndex<L>` service is registered.
pub struct IndexBuilderSystem<L: IndexLayer> {
    _layer: PhantomData<fn() -> L>,
}

impl<L: IndexLayer> Default for IndexBuilderSystem<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: IndexLayer> IndexBuilderSystem<L> {
    /// Creates the builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _layer: PhantomData,
        }
    }
}

impl<L: IndexLayer> System for IndexBuilderSystem<L> {
    fn name(&self) -> &'static str {
        L::BUILDER_NAME
    }

    fn provides(&self) -> &'static [&'static str] {
        L::CAPABILITY
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let Some(mut index) = world.take_service::<LayerIndex<L>>() else {
            tracing::debug!(layer = L::NAME, "no index service registered");
            return;
        };

        index.grid.clear();
        if let (Some(members), Some(positions)) =
            (world.storage::<L::Member>(), world.storage::<Position>())
        {
            for &id in members.entities() {
                if world.is_pending_destroy(id) {
                    continue;
                }
                if let Some(pos) = positions.get(id) {
                    index.grid.insert(id, pos.x, pos.y);
                }
            }
        }

        let stats = index.grid.stats();
        tracing::trace!(
            layer = L::NAME,
            inserted = stats.inserted,
            cells = stats.occupied_cells,
            "index rebuilt"
        );
        world.register_service(index);
    }
}
