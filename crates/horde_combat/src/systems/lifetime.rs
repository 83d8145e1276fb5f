//! Entity expiry.

use horde_core::{EntityId, System, World};

use crate::components::Lifetime;

/// Counts down `Lifetime` and destroys entities that reach zero.
#[derive(Default)]
pub struct LifetimeSystem {
    expired: Vec<EntityId>,
}

impl LifetimeSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &'static str {
        "lifetime"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        self.expired.clear();
        let (ids, lifetimes) = world.storage_mut::<Lifetime>().as_slices_mut();
        for (&id, lifetime) in ids.iter().zip(lifetimes.iter_mut()) {
            lifetime.remaining -= dt;
            if lifetime.remaining <= 0.0 {
                self.expired.push(id);
            }
        }

        for &id in &self.expired {
            world.destroy_entity(id);
        }
    }
}
