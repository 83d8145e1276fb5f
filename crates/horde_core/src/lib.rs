//! # HORDE Core Runtime
//!
//! Data-oriented simulation core for a real-time action game:
//! - Sparse-set component storage, one column per component type
//! - A `World` with monotonic entity ids and end-of-frame destruction
//! - A fixed, manually ordered, single-threaded system list
//! - A capability-keyed service registry (no global singletons)
//! - A uniform spatial hash grid rebuilt from scratch every frame
//!
//! ## Architecture Rules
//!
//! 1. **Absence is not an error** - every lookup returns `Option`/`bool`
//! 2. **Destruction is deferred** - entities leave the stores only in the flush
//!    that follows the last system of the frame
//! 3. **Order is a contract** - index builders before consumers, decay before
//!    hit detection, dirty producers before the consumer that clears the flag
//!
//! ## Example
//!
//! ```rust,ignore
//! use horde_core::{World, Position};
//!
//! let mut world = World::new();
//! let e = world.create_entity();
//! world.add_component(e, Position::new(1.0, 2.0));
//! world.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod ecs;
pub mod error;
pub mod memory;
pub mod spatial;

pub use ecs::{
    Component, ComponentStorage, EntityId, ErasedStorage, FrameStats, Position, System, Velocity,
    World,
};
pub use error::{CoreError, CoreResult};
pub use memory::BufferPool;
pub use spatial::{
    Cell, GridStats, IndexBuilderSystem, IndexLayer, LayerIndex, Neighbors, QueryBuffer,
    SpatialHashGrid, SpatialIndex,
};
