//! Chasing, integration and orbiting.

use horde_core::{EntityId, Position, System, Velocity, World};

use crate::components::{ChaseTarget, Hostile, Mover, Orbit};
use crate::layers::capability;

use super::collect_ids;

/// Points every chasing hostile at its target.
///
/// Hostiles whose target is gone stop moving.
#[derive(Default)]
pub struct ChaseSystem {
    chasers: Vec<EntityId>,
}

impl ChaseSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for ChaseSystem {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[capability::PROPAGATED_ATTRIBUTES]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<ChaseTarget>(world, &mut self.chasers);

        for &id in &self.chasers {
            if !world.has_component::<Hostile>(id) {
                continue;
            }
            let (Some(&ChaseTarget(target)), Some(&from)) = (
                world.get_component::<ChaseTarget>(id),
                world.get_component::<Position>(id),
            ) else {
                continue;
            };
            let speed = world.component_or_default::<Mover>(id).speed;

            let velocity = match world.get_component::<Position>(target) {
                Some(&to) if world.is_alive(target) => Velocity::towards(from, to, speed),
                _ => Velocity::default(),
            };
            world.set_component(id, velocity);
        }
    }
}

/// Integrates `Position += Velocity * dt` over the dense columns.
#[derive(Default)]
pub struct MovementSystem {
    velocities: Vec<(EntityId, Velocity)>,
}

impl MovementSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        self.velocities.clear();
        if let Some(storage) = world.storage::<Velocity>() {
            let (ids, values) = storage.as_slices();
            self.velocities
                .extend(ids.iter().copied().zip(values.iter().copied()));
        }
        if self.velocities.is_empty() || dt == 0.0 {
            return;
        }

        let positions = world.storage_mut::<Position>();
        for &(id, vel) in &self.velocities {
            if let Some(pos) = positions.get_mut(id) {
                pos.x += vel.x * dt;
                pos.y += vel.y * dt;
            }
        }
    }
}

/// Moves orbiting hitboxes around their center entity.
///
/// An orbit whose center is gone is destroyed.
#[derive(Default)]
pub struct OrbitSystem {
    orbiters: Vec<EntityId>,
}

impl OrbitSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for OrbitSystem {
    fn name(&self) -> &'static str {
        "orbit"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        collect_ids::<Orbit>(world, &mut self.orbiters);

        for &id in &self.orbiters {
            let Some(mut orbit) = world.get_component::<Orbit>(id).copied() else {
                continue;
            };
            let center = match world.get_component::<Position>(orbit.center) {
                Some(&pos) if world.is_alive(orbit.center) && !world.is_pending_destroy(orbit.center) => pos,
                _ => {
                    world.destroy_entity(id);
                    continue;
                }
            };

            orbit.angle = (orbit.angle + orbit.angular_speed * dt) % std::f32::consts::TAU;
            let (sin, cos) = orbit.angle.sin_cos();
            world.set_component(
                id,
                Position::new(center.x + cos * orbit.radius, center.y + sin * orbit.radius),
            );
            world.set_component(id, orbit);
        }
    }
}
