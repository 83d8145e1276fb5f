//! # Entity Component System
//!
//! A small single-threaded ECS for simulations with thousands of short-lived
//! entities.
//!
//! ## Design Philosophy
//!
//! - One sparse-set column per component type, created on first use
//! - Entity ids are monotonic integers, never reused
//! - Destruction is deferred to the end of the frame
//! - Systems run one after another in a fixed, curated order

mod component;
mod entity;
mod storage;
mod system;
mod world;

pub use component::{Component, Position, Velocity};
pub use entity::EntityId;
pub use storage::{ComponentStorage, ErasedStorage};
pub use system::System;
pub use world::{FrameStats, World};
