//! # Per-Frame Systems
//!
//! Every system follows the same shape: collect the ids it will touch into
//! a scratch vector owned by the system, then read, modify and write back
//! one entity at a time. Scratch vectors keep their capacity between frames.
//!
//! Services a system needs alongside component access (the weapon database,
//! the experience sink) are taken out of the world for the duration of the
//! update and registered again before returning.

mod attributes;
mod combat;
mod lifetime;
mod movement;
mod pickups;
mod weapons;

pub use attributes::{AttributeAggregationSystem, AttributePropagationSystem};
pub use combat::{ContactDamageSystem, CooldownDecaySystem, DeathSystem, HitDetectionSystem};
pub use lifetime::LifetimeSystem;
pub use movement::{ChaseSystem, MovementSystem, OrbitSystem};
pub use pickups::PickupMagnetSystem;
pub use weapons::WeaponFireSystem;

use horde_core::{Component, EntityId, World};

/// Refills `out` with every entity that has a `T`.
pub(crate) fn collect_ids<T: Component>(world: &World, out: &mut Vec<EntityId>) {
    out.clear();
    if let Some(storage) = world.storage::<T>() {
        out.extend_from_slice(storage.entities());
    }
}
