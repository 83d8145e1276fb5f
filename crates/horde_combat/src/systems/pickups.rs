//! Pickup attraction and collection.

use horde_core::{EntityId, LayerIndex, Position, QueryBuffer, System, Velocity, World};

use crate::components::{Attracted, Magnet, Pickup};
use crate::config::SimulationConfig;
use crate::error::CombatResult;
use crate::experience::SharedExperienceSink;
use crate::layers::{capability, Pickups};

use super::collect_ids;

/// Pulls pickups towards collectors and forwards their value on contact.
///
/// A pickup inside a collector's `Magnet` radius is tagged `Attracted` and
/// flies towards that collector until it is within the collect radius.
/// Collection adds the pickup's value to the registered
/// [`SharedExperienceSink`] and destroys the pickup. Without a sink the
/// pickup is still consumed.
pub struct PickupMagnetSystem {
    collectors: Vec<EntityId>,
    attracted: Vec<EntityId>,
    buffer: QueryBuffer,
    collect_radius: f32,
    attract_speed: f32,
}

impl PickupMagnetSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// `Core(ZeroQueryCapacity)` when the configured query capacity is zero.
    pub fn new(config: &SimulationConfig) -> CombatResult<Self> {
        Ok(Self {
            collectors: Vec::new(),
            attracted: Vec::new(),
            buffer: QueryBuffer::new(config.query_capacity)?,
            collect_radius: config.pickup_collect_radius,
            attract_speed: config.pickup_attract_speed,
        })
    }

    fn attract(&mut self, world: &mut World) {
        collect_ids::<Magnet>(world, &mut self.collectors);

        for &collector in &self.collectors {
            if world.is_pending_destroy(collector) {
                continue;
            }
            let (Some(&center), Some(magnet)) = (
                world.get_component::<Position>(collector),
                world.get_component::<Magnet>(collector).copied(),
            ) else {
                continue;
            };
            let Some(index) = world.try_service::<LayerIndex<Pickups>>() else {
                tracing::debug!("pickup index missing; attraction skipped");
                return;
            };

            let found = self.buffer.fill(index, center.x, center.y, magnet.radius);
            if found.is_truncated() {
                tracing::debug!(%collector, missed = found.missed, "pickup candidates truncated");
            }

            let reach = magnet.radius * magnet.radius;
            for &pickup in self.buffer.as_slice() {
                if world.is_pending_destroy(pickup) || world.has_component::<Attracted>(pickup) {
                    continue;
                }
                let in_reach = world
                    .get_component::<Position>(pickup)
                    .is_some_and(|p| p.distance_squared(center) <= reach);
                if in_reach {
                    world.add_component(pickup, Attracted { target: collector });
                }
            }
        }
    }
}

impl System for PickupMagnetSystem {
    fn name(&self) -> &'static str {
        "pickup_magnet"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[capability::PICKUP_INDEX]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        self.attract(world);

        collect_ids::<Attracted>(world, &mut self.attracted);
        if self.attracted.is_empty() {
            return;
        }
        let mut sink = world.take_service::<SharedExperienceSink>();
        let step = self.attract_speed * dt;

        for &pickup in &self.attracted {
            if world.is_pending_destroy(pickup) {
                continue;
            }
            let Some(Attracted { target }) = world.get_component::<Attracted>(pickup).copied() else {
                continue;
            };
            if !world.is_alive(target) || world.is_pending_destroy(target) {
                world.remove_component::<Attracted>(pickup);
                continue;
            }
            let (Some(&from), Some(&to)) = (
                world.get_component::<Position>(pickup),
                world.get_component::<Position>(target),
            ) else {
                continue;
            };

            let next = if from.distance(to) <= step {
                to
            } else {
                let v = Velocity::towards(from, to, step);
                Position::new(from.x + v.x, from.y + v.y)
            };
            world.set_component(pickup, next);

            if next.distance(to) <= self.collect_radius {
                let value = world.component_or_default::<Pickup>(pickup).value;
                match sink.as_mut() {
                    Some(sink) => sink.add_amount(value),
                    None => tracing::debug!(%pickup, value, "no experience sink registered"),
                }
                world.destroy_entity(pickup);
            }
        }

        if let Some(sink) = sink {
            world.register_service(sink);
        }
    }
}
