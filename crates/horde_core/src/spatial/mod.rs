//! # Spatial Indexing
//!
//! Uniform hash grids for bounded-radius neighbor queries, rebuilt from
//! scratch every frame by dedicated builder systems.
//!
//! Consumers must run after the builder of the index they read; use
//! [`IndexLayer::CAPABILITY`] in [`System::requires`](crate::System::requires)
//! so [`World::validate_schedule`](crate::World::validate_schedule) can check it.

mod grid;
mod index;
mod query;

pub use grid::{Cell, GridStats, Neighbors, SpatialHashGrid, SpatialIndex};
pub use index::{IndexBuilderSystem, IndexLayer, LayerIndex};
pub use query::QueryBuffer;
