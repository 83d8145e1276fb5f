//! # Uniform Spatial Hash Grid
//!
//! Buckets entity ids by integer cell coordinate. Rebuilt from scratch every
//! frame: `clear()` then one `insert()` per entity.
//!
//! ## Query Contract
//!
//! `query_neighbors(x, y, radius, out)` scans the square block of cells
//! within `ceil(radius / cell_size) + 1` of the center cell and copies every
//! id it finds into `out` until `out` is full. The result is a superset of
//! the disc of `radius`; callers do the exact distance test.
//!
//! The block is clipped to the bounding box of occupied cells, so a huge or
//! infinite radius returns every entity. When the clipped block still holds
//! more cells than the grid has buckets, the occupied cells are visited
//! instead, in the same row-major order. NaN and negative radii scan the
//! adjacent cells only.
//!
//! ```text
//!   radius = 1.5, cell = 2.0  ->  cell radius = ceil(0.75) + 1 = 2
//!
//!   ┌──┬──┬──┬──┬──┐
//!   │  │  │  │  │  │
//!   ├──┼──┼──┼──┼──┤
//!   │  │  │  │  │  │
//!   ├──┼──┼──┼──┼──┤
//!   │  │  │()│  │  │   5x5 cells scanned
//!   ├──┼──┼──┼──┼──┤
//!   │  │  │  │  │  │
//!   ├──┼──┼──┼──┼──┤
//!   │  │  │  │  │  │
//!   └──┴──┴──┴──┴──┘
//! ```

use std::collections::HashMap;

use crate::ecs::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::memory::BufferPool;

/// Integer grid coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Result of a neighbor query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Ids written to the front of the output buffer.
    pub count: usize,
    /// Candidates that did not fit in the output buffer.
    pub missed: usize,
}

impl Neighbors {
    /// True when candidates were dropped because the buffer was full.
    #[inline]
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.missed > 0
    }
}

/// Grid diagnostics.
///
/// `inserted` and `occupied_cells` describe the current build; the query
/// counters accumulate until [`SpatialHashGrid::reset_stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Entities inserted since the last clear.
    pub inserted: usize,
    /// Non-empty cells since the last clear.
    pub occupied_cells: usize,
    /// Queries served.
    pub queries: u64,
    /// Queries that filled their buffer and dropped candidates.
    pub truncated_queries: u64,
    /// Total candidates dropped by truncated queries.
    pub dropped_candidates: u64,
}

/// Narrow proximity-query capability.
pub trait SpatialIndex {
    /// Copies candidate ids near `(x, y)` into `out`.
    ///
    /// The candidates cover every entity within `radius` of the point, plus
    /// possibly some farther ones. At most `out.len()` ids are written.
    fn query_neighbors(&self, x: f32, y: f32, radius: f32, out: &mut [EntityId]) -> Neighbors;

    /// Edge length of one cell in world units.
    fn cell_size(&self) -> f32;
}

/// Uniform spatial hash grid.
///
/// # Example
///
/// ```rust,ignore
/// let mut grid = SpatialHashGrid::new(2.0)?;
/// grid.insert(id, 1.0, 1.0);
///
/// let mut buf = [EntityId::NULL; 64];
/// let found = grid.query_neighbors(0.0, 0.0, 1.5, &mut buf);
/// for &candidate in &buf[..found.count] { /* exact distance test */ }
/// ```
#[derive(Debug)]
pub struct SpatialHashGrid {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<Cell, Vec<EntityId>>,
    // Inclusive (min, max) of occupied cells.
    bounds: Option<(Cell, Cell)>,
    pool: BufferPool<EntityId>,
    // Interior mutability so that queries stay `&self`.
    stats: std::cell::Cell<GridStats>,
}

impl SpatialHashGrid {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCellSize` unless `cell_size` is finite and
    /// positive.
    pub fn new(cell_size: f32) -> CoreResult<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CoreError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            bounds: None,
            pool: BufferPool::new(),
            stats: std::cell::Cell::new(GridStats::default()),
        })
    }

    /// Edge length of one cell.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a world position (floor division).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, x: f32, y: f32) -> Cell {
        Cell::new(
            (x * self.inv_cell_size).floor() as i32,
            (y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Empties every cell. Buckets go back to the pool.
    pub fn clear(&mut self) {
        for (_, bucket) in self.cells.drain() {
            self.pool.release(bucket);
        }
        self.bounds = None;
        let mut stats = self.stats.get();
        stats.inserted = 0;
        stats.occupied_cells = 0;
        self.stats.set(stats);
    }

    /// Appends an entity to the bucket of the cell containing `(x, y)`.
    pub fn insert(&mut self, id: EntityId, x: f32, y: f32) {
        let cell = self.cell_of(x, y);
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (
                Cell::new(lo.x.min(cell.x), lo.y.min(cell.y)),
                Cell::new(hi.x.max(cell.x), hi.y.max(cell.y)),
            ),
            None => (cell, cell),
        });
        let mut stats = self.stats.get();
        let bucket = self.cells.entry(cell).or_insert_with(|| {
            stats.occupied_cells += 1;
            self.pool.acquire()
        });
        bucket.push(id);
        stats.inserted += 1;
        self.stats.set(stats);
    }

    /// Number of entities inserted since the last clear.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.get().inserted
    }

    /// True when nothing was inserted since the last clear.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current diagnostics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> GridStats {
        self.stats.get()
    }

    /// Zeroes the cumulative query counters.
    pub fn reset_stats(&self) {
        let mut stats = self.stats.get();
        stats.queries = 0;
        stats.truncated_queries = 0;
        stats.dropped_candidates = 0;
        self.stats.set(stats);
    }

    /// Cell radius scanned for a query radius. Saturates for huge or
    /// infinite radii.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn cell_radius(&self, radius: f32) -> i64 {
        let radius = if radius > 0.0 { radius } else { 0.0 };
        // Float to int `as` saturates, +inf included.
        ((radius * self.inv_cell_size).ceil() as i64).saturating_add(1)
    }

    /// Inclusive block of cells to scan, clipped to the occupied bounds.
    #[allow(clippy::cast_possible_truncation)]
    fn scan_block(&self, center: Cell, reach: i64) -> Option<(Cell, Cell)> {
        let (lo, hi) = self.bounds?;
        let clip = |c: i32, lo: i32, hi: i32| -> (i64, i64) {
            let c = i64::from(c);
            (
                c.saturating_sub(reach).max(i64::from(lo)),
                c.saturating_add(reach).min(i64::from(hi)),
            )
        };
        let (x0, x1) = clip(center.x, lo.x, hi.x);
        let (y0, y1) = clip(center.y, lo.y, hi.y);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        // Clipped to i32 bounds above.
        Some((
            Cell::new(x0 as i32, y0 as i32),
            Cell::new(x1 as i32, y1 as i32),
        ))
    }

    fn take_bucket(bucket: &[EntityId], out: &mut [EntityId], result: &mut Neighbors) {
        let room = out.len() - result.count;
        let take = bucket.len().min(room);
        out[result.count..result.count + take].copy_from_slice(&bucket[..take]);
        result.count += take;
        result.missed += bucket.len() - take;
    }

    /// See [`SpatialIndex::query_neighbors`].
    pub fn query_neighbors(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        out: &mut [EntityId],
    ) -> Neighbors {
        let center = self.cell_of(x, y);
        let reach = self.cell_radius(radius);
        let mut result = Neighbors::default();

        if let Some((lo, hi)) = self.scan_block(center, reach) {
            let width = i64::from(hi.x) - i64::from(lo.x) + 1;
            let height = i64::from(hi.y) - i64::from(lo.y) + 1;
            let block_cells = usize::try_from(width.saturating_mul(height)).unwrap_or(usize::MAX);

            if block_cells > self.cells.len() {
                let mut occupied: Vec<Cell> = self
                    .cells
                    .keys()
                    .filter(|c| (lo.x..=hi.x).contains(&c.x) && (lo.y..=hi.y).contains(&c.y))
                    .copied()
                    .collect();
                occupied.sort_unstable_by_key(|c| (c.y, c.x));
                for cell in occupied {
                    if let Some(bucket) = self.cells.get(&cell) {
                        Self::take_bucket(bucket, out, &mut result);
                    }
                }
            } else {
                for cy in lo.y..=hi.y {
                    for cx in lo.x..=hi.x {
                        if let Some(bucket) = self.cells.get(&Cell::new(cx, cy)) {
                            Self::take_bucket(bucket, out, &mut result);
                        }
                    }
                }
            }
        }

        let mut stats = self.stats.get();
        stats.queries += 1;
        if result.is_truncated() {
            stats.truncated_queries += 1;
            stats.dropped_candidates += result.missed as u64;
            tracing::debug!(
                x,
                y,
                radius,
                capacity = out.len(),
                missed = result.missed,
                "neighbor query truncated"
            );
        }
        self.stats.set(stats);

        result
    }
}

impl SpatialIndex for SpatialHashGrid {
    #[inline]
    fn query_neighbors(&self, x: f32, y: f32, radius: f32, out: &mut [EntityId]) -> Neighbors {
        Self::query_neighbors(self, x, y, radius, out)
    }

    #[inline]
    fn cell_size(&self) -> f32 {
        self.cell_size
    }
}
