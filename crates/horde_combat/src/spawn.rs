//! Entity templates for hosts and tests.

use horde_core::{EntityId, Position, Velocity, World};
use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeKind, Attributes, AttributesDirty, BaseAttributes};
use crate::components::{
    ChaseTarget, Collider, ContactDamage, DropsExperience, Health, Hostile, Magnet, Mover, Player,
};

/// Collider radius of the player body.
pub const PLAYER_RADIUS: f32 = 0.5;

/// Stats shared by every hostile spawned from the template.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileTemplate {
    /// Walk speed.
    pub speed: f32,
    /// Collider radius.
    pub radius: f32,
    /// Hit points.
    pub health: f32,
    /// Damage per touch.
    pub contact_damage: f32,
    /// Value of the pickup dropped on death; zero drops nothing.
    pub experience: f32,
}

impl Default for HostileTemplate {
    fn default() -> Self {
        Self {
            speed: 2.0,
            radius: 0.4,
            health: 10.0,
            contact_damage: 5.0,
            experience: 1.0,
        }
    }
}

/// Spawns the player at `position` with `base` attributes.
///
/// Movement speed, magnet radius and health are filled in from the final
/// attributes on the first frame.
pub fn spawn_player(world: &mut World, position: Position, base: Attributes) -> EntityId {
    let player = world.create_entity();
    let max_health = base.get(AttributeKind::MaxHealth);
    world.add_component(player, Player);
    world.add_component(player, position);
    world.add_component(player, Velocity::default());
    world.add_component(player, Collider { radius: PLAYER_RADIUS });
    world.add_component(player, Health::full(max_health));
    world.add_component(player, Mover::default());
    world.add_component(player, Magnet::default());
    world.add_component(player, BaseAttributes(base));
    world.add_component(player, AttributesDirty);
    player
}

/// Spawns one hostile chasing `target`.
pub fn spawn_hostile(
    world: &mut World,
    position: Position,
    target: EntityId,
    template: &HostileTemplate,
) -> EntityId {
    let hostile = world.create_entity();
    world.add_component(hostile, Hostile);
    world.add_component(hostile, position);
    world.add_component(hostile, Velocity::default());
    world.add_component(hostile, ChaseTarget(target));
    world.add_component(hostile, Mover { speed: template.speed });
    world.add_component(hostile, Collider { radius: template.radius });
    world.add_component(hostile, Health::full(template.health));
    world.add_component(
        hostile,
        ContactDamage {
            amount: template.contact_damage,
        },
    );
    if template.experience > 0.0 {
        world.add_component(
            hostile,
            DropsExperience {
                amount: template.experience,
            },
        );
    }
    hostile
}

/// Spawns `count` hostiles evenly spaced on a circle around `center`.
#[allow(clippy::cast_precision_loss)]
pub fn spawn_hostile_ring(
    world: &mut World,
    center: Position,
    radius: f32,
    count: u32,
    target: EntityId,
    template: &HostileTemplate,
) -> Vec<EntityId> {
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            let (sin, cos) = angle.sin_cos();
            let at = Position::new(center.x + cos * radius, center.y + sin * radius);
            spawn_hostile(world, at, target, template)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_player_starts_dirty_with_full_health() {
        let mut world = World::new();
        let player = spawn_player(&mut world, Position::new(1.0, 2.0), Attributes::baseline());

        assert!(world.has_component::<AttributesDirty>(player));
        assert_eq!(world.get_component::<Health>(player), Some(&Health::full(100.0)));
        assert_eq!(world.get_component::<Position>(player), Some(&Position::new(1.0, 2.0)));
    }

    #[test]
    fn test_ring_spacing() {
        let mut world = World::new();
        let player = world.create_entity();
        let ring = spawn_hostile_ring(
            &mut world,
            Position::new(0.0, 0.0),
            10.0,
            4,
            player,
            &HostileTemplate::default(),
        );

        assert_eq!(ring.len(), 4);
        for id in &ring {
            let pos = world.component_or_default::<Position>(*id);
            assert_relative_eq!(pos.distance(Position::new(0.0, 0.0)), 10.0, epsilon = 1e-4);
            assert_eq!(world.get_component::<ChaseTarget>(*id), Some(&ChaseTarget(player)));
        }
    }

    #[test]
    fn test_zero_experience_drops_nothing() {
        let mut world = World::new();
        let target = world.create_entity();
        let template = HostileTemplate {
            experience: 0.0,
            ..HostileTemplate::default()
        };
        let h = spawn_hostile(&mut world, Position::default(), target, &template);
        assert!(!world.has_component::<DropsExperience>(h));
    }
}
