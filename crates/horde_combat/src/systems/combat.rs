//! Timers, hits, contact damage and death.
//!
//! ```text
//! CooldownDecay -> WeaponFire -> HitDetection -> ContactDamage -> Death
//! ```
//!
//! Decay runs first so a cooldown that expires this frame lets this frame's
//! hit through, and a cooldown set by a hit this frame is not shortened in
//! the same pass.

use horde_core::{EntityId, LayerIndex, Position, QueryBuffer, System, Velocity, World};

use crate::attributes::{final_attribute, AttributeKind};
use crate::components::{
    Collider, ContactDamage, DropsExperience, HitCooldowns, Hitbox, Health, Hostile,
    Invulnerability, Lifetime, Pickup, Player,
};
use crate::config::SimulationConfig;
use crate::error::CombatResult;
use crate::layers::{capability, Hostiles};
use crate::weapons::WeaponTimer;

use super::collect_ids;

/// Advances hit cooldowns, invulnerability windows and weapon timers.
#[derive(Default)]
pub struct CooldownDecaySystem;

impl CooldownDecaySystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl System for CooldownDecaySystem {
    fn name(&self) -> &'static str {
        "cooldown_decay"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[capability::DECAYED_COOLDOWNS]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let (_, cooldowns) = world.storage_mut::<HitCooldowns>().as_slices_mut();
        for cd in cooldowns {
            cd.tick(dt);
        }

        let (_, windows) = world.storage_mut::<Invulnerability>().as_slices_mut();
        for window in windows {
            window.remaining = (window.remaining - dt).max(0.0);
        }

        let (_, timers) = world.storage_mut::<WeaponTimer>().as_slices_mut();
        for timer in timers {
            timer.cooldown = (timer.cooldown - dt).max(0.0);
        }
    }
}

/// Largest collider radius among live hostiles.
fn max_hostile_radius(world: &World) -> f32 {
    let Some(hostiles) = world.storage::<Hostile>() else {
        return 0.0;
    };
    hostiles
        .entities()
        .iter()
        .filter_map(|&id| world.get_component::<Collider>(id))
        .fold(0.0_f32, |acc, c| acc.max(c.radius))
}

/// Applies hitbox damage, knockback and pierce against hostiles.
pub struct HitDetectionSystem {
    hitboxes: Vec<EntityId>,
    buffer: QueryBuffer,
    hit_cooldown: f32,
}

impl HitDetectionSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// `Core(ZeroQueryCapacity)` when the configured query capacity is zero.
    pub fn new(config: &SimulationConfig) -> CombatResult<Self> {
        Ok(Self {
            hitboxes: Vec::new(),
            buffer: QueryBuffer::new(config.query_capacity)?,
            hit_cooldown: config.hit_cooldown,
        })
    }
}

impl System for HitDetectionSystem {
    fn name(&self) -> &'static str {
        "hit_detection"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[capability::HOSTILE_INDEX, capability::DECAYED_COOLDOWNS]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<Hitbox>(world, &mut self.hitboxes);
        if self.hitboxes.is_empty() {
            return;
        }
        let reach = max_hostile_radius(world);

        for &hitbox_id in &self.hitboxes {
            if world.is_pending_destroy(hitbox_id) {
                continue;
            }
            let (Some(&origin), Some(&hitbox)) = (
                world.get_component::<Position>(hitbox_id),
                world.get_component::<Hitbox>(hitbox_id),
            ) else {
                continue;
            };

            let found = match world.try_service::<LayerIndex<Hostiles>>() {
                Some(index) => self.buffer.fill(index, origin.x, origin.y, hitbox.radius + reach),
                None => {
                    tracing::debug!("hostile index missing; hit detection skipped");
                    return;
                }
            };
            if found.is_truncated() {
                tracing::debug!(hitbox = %hitbox_id, missed = found.missed, "hit candidates truncated");
            }

            let mut cooldowns = world.component_or_default::<HitCooldowns>(hitbox_id);
            let mut remaining = hitbox.pierce;

            for &target in self.buffer.as_slice() {
                if remaining == Some(0) {
                    break;
                }
                if world.is_pending_destroy(target) || cooldowns.is_blocked(target) {
                    continue;
                }
                let (Some(&pos), Some(mut health)) = (
                    world.get_component::<Position>(target),
                    world.get_component::<Health>(target).copied(),
                ) else {
                    continue;
                };
                // Already killed this frame; the death pass has not run yet.
                if health.is_dead() {
                    continue;
                }
                let body = world.component_or_default::<Collider>(target).radius;
                if pos.distance(origin) > hitbox.radius + body {
                    continue;
                }

                health.current -= hitbox.damage;
                world.set_component(target, health);

                if hitbox.knockback > 0.0 {
                    let push = Velocity::towards(origin, pos, hitbox.knockback);
                    world.set_component(target, Position::new(pos.x + push.x, pos.y + push.y));
                }

                // Piercing projectiles never hit the same target twice.
                let block_for = if hitbox.pierce.is_some() {
                    f32::INFINITY
                } else {
                    self.hit_cooldown
                };
                cooldowns.block(target, block_for);
                remaining = remaining.map(|n| n.saturating_sub(1));
            }

            if remaining != hitbox.pierce {
                world.set_component(hitbox_id, Hitbox { pierce: remaining, ..hitbox });
            }
            world.set_component(hitbox_id, cooldowns);
            if remaining == Some(0) {
                world.destroy_entity(hitbox_id);
            }
        }
    }
}

/// Damages players touched by hostiles.
///
/// Armor reduces each hit; the player regenerates `Recovery` health per
/// second. A hit grants an invulnerability window during which further
/// contacts are ignored.
pub struct ContactDamageSystem {
    players: Vec<EntityId>,
    buffer: QueryBuffer,
    invulnerability: f32,
}

impl ContactDamageSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// `Core(ZeroQueryCapacity)` when the configured query capacity is zero.
    pub fn new(config: &SimulationConfig) -> CombatResult<Self> {
        Ok(Self {
            players: Vec::new(),
            buffer: QueryBuffer::new(config.query_capacity)?,
            invulnerability: config.player_invulnerability,
        })
    }

    /// Highest contact damage among hostiles touching the player, or `None`
    /// when nothing touches it or the hostile index is missing.
    fn strongest_contact(
        &mut self,
        world: &World,
        player: EntityId,
        pos: Position,
        reach: f32,
    ) -> Option<f32> {
        let body = world.component_or_default::<Collider>(player).radius;
        let Some(index) = world.try_service::<LayerIndex<Hostiles>>() else {
            tracing::debug!("hostile index missing; contact damage skipped");
            return None;
        };
        let found = self.buffer.fill(index, pos.x, pos.y, body + reach);
        if found.is_truncated() {
            tracing::debug!(%player, missed = found.missed, "contact candidates truncated");
        }

        self.buffer
            .as_slice()
            .iter()
            .filter(|&&h| !world.is_pending_destroy(h))
            .filter_map(|&h| {
                let hpos = world.get_component::<Position>(h)?;
                let damage = world.get_component::<ContactDamage>(h)?.amount;
                let radius = world.component_or_default::<Collider>(h).radius;
                (hpos.distance(pos) <= body + radius).then_some(damage)
            })
            .fold(None, |best: Option<f32>, d| Some(best.map_or(d, |b| b.max(d))))
    }
}

impl System for ContactDamageSystem {
    fn name(&self) -> &'static str {
        "contact_damage"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[capability::HOSTILE_INDEX, capability::DECAYED_COOLDOWNS]
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        collect_ids::<Player>(world, &mut self.players);
        let reach = max_hostile_radius(world);

        for i in 0..self.players.len() {
            let player = self.players[i];
            let (Some(&pos), Some(mut health)) = (
                world.get_component::<Position>(player),
                world.get_component::<Health>(player).copied(),
            ) else {
                continue;
            };
            if health.is_dead() {
                continue;
            }

            let recovery = final_attribute(world, player, AttributeKind::Recovery, 0.0);
            health.current = (health.current + recovery * dt).min(health.max);

            let invulnerable = world
                .get_component::<Invulnerability>(player)
                .is_some_and(|i| i.remaining > 0.0);
            if !invulnerable {
                if let Some(damage) = self.strongest_contact(world, player, pos, reach) {
                    let armor = final_attribute(world, player, AttributeKind::Armor, 0.0);
                    health.current -= (damage - armor).max(0.0);
                    world.set_component(
                        player,
                        Invulnerability {
                            remaining: self.invulnerability,
                        },
                    );
                    tracing::debug!(%player, damage, armor, hp = health.current, "player hit");
                }
            }

            world.set_component(player, health);
        }
    }
}

/// Destroys entities at zero health and drops their experience.
pub struct DeathSystem {
    candidates: Vec<EntityId>,
    pickup_lifetime: f32,
}

impl DeathSystem {
    /// Creates the system.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            candidates: Vec::new(),
            pickup_lifetime: config.pickup_lifetime,
        }
    }
}

impl System for DeathSystem {
    fn name(&self) -> &'static str {
        "death"
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<Health>(world, &mut self.candidates);

        for &id in &self.candidates {
            if world.is_pending_destroy(id)
                || !world.get_component::<Health>(id).is_some_and(Health::is_dead)
            {
                continue;
            }

            if let (Some(drop), Some(&pos)) = (
                world.get_component::<DropsExperience>(id).copied(),
                world.get_component::<Position>(id),
            ) {
                let gem = world.create_entity();
                world.add_component(gem, Pickup { value: drop.amount });
                world.add_component(gem, pos);
                if self.pickup_lifetime > 0.0 {
                    world.add_component(
                        gem,
                        Lifetime {
                            remaining: self.pickup_lifetime,
                        },
                    );
                }
            }

            if world.has_component::<Player>(id) {
                tracing::info!(player = %id, frame = world.frame(), "player died");
            }
            world.destroy_entity(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attributes, FinalAttributes};
    use approx::assert_relative_eq;
    use horde_core::IndexBuilderSystem;

    fn arena() -> CombatResult<(World, SimulationConfig)> {
        let config = SimulationConfig::default();
        let mut world = World::new();
        world.register_service(LayerIndex::<Hostiles>::new(config.hostile_cell_size)?);
        world.register_system(IndexBuilderSystem::<Hostiles>::new());
        world.register_system(CooldownDecaySystem::new());
        Ok((world, config))
    }

    fn hostile(world: &mut World, x: f32, y: f32, hp: f32) -> EntityId {
        let e = world.create_entity();
        world.add_component(e, Hostile);
        world.add_component(e, Position::new(x, y));
        world.add_component(e, Collider { radius: 0.5 });
        world.add_component(e, Health::full(hp));
        e
    }

    fn hitbox(world: &mut World, x: f32, y: f32, pierce: Option<u32>) -> EntityId {
        let e = world.create_entity();
        world.add_component(e, Position::new(x, y));
        world.add_component(
            e,
            Hitbox {
                damage: 10.0,
                knockback: 0.0,
                radius: 0.5,
                pierce,
            },
        );
        e
    }

    #[test]
    fn test_cooldown_decay_clamps_at_zero() {
        let mut world = World::new();
        world.register_system(CooldownDecaySystem::new());
        let e = world.create_entity();
        world.add_component(e, WeaponTimer { cooldown: 0.3 });
        world.add_component(e, Invulnerability { remaining: 0.1 });

        world.update(0.2);
        assert_relative_eq!(world.component_or_default::<WeaponTimer>(e).cooldown, 0.1, epsilon = 1e-6);
        assert_relative_eq!(world.component_or_default::<Invulnerability>(e).remaining, 0.0);
    }

    #[test]
    fn test_projectile_pierce_consumed_then_destroyed() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(HitDetectionSystem::new(&config)?);

        let a = hostile(&mut world, 0.0, 0.0, 100.0);
        let b = hostile(&mut world, 0.3, 0.0, 100.0);
        let shot = hitbox(&mut world, 0.1, 0.0, Some(1));

        world.update(0.016);

        let hp_a = world.component_or_default::<Health>(a).current;
        let hp_b = world.component_or_default::<Health>(b).current;
        assert_relative_eq!(hp_a + hp_b, 190.0);
        assert!(!world.is_alive(shot));
        Ok(())
    }

    #[test]
    fn test_second_shot_skips_target_killed_this_frame() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(HitDetectionSystem::new(&config)?);

        let a = hostile(&mut world, 0.0, 0.0, 10.0);
        let b = hostile(&mut world, 0.3, 0.0, 10.0);
        hitbox(&mut world, 0.1, 0.0, Some(1));
        hitbox(&mut world, 0.1, 0.0, Some(1));

        world.update(0.016);

        assert_relative_eq!(world.component_or_default::<Health>(a).current, 0.0);
        assert_relative_eq!(world.component_or_default::<Health>(b).current, 0.0);
        Ok(())
    }

    #[test]
    fn test_persistent_hitbox_respects_cooldown() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(HitDetectionSystem::new(&config)?);

        let target = hostile(&mut world, 0.0, 0.0, 100.0);
        let blade = hitbox(&mut world, 0.0, 0.0, None);

        world.update(0.1);
        assert_relative_eq!(world.component_or_default::<Health>(target).current, 90.0);

        // Still blocked: 0.5s cooldown, 0.2s elapsed.
        world.update(0.1);
        assert_relative_eq!(world.component_or_default::<Health>(target).current, 90.0);

        for _ in 0..5 {
            world.update(0.1);
        }
        assert_relative_eq!(world.component_or_default::<Health>(target).current, 80.0);
        assert!(world.is_alive(blade));
        Ok(())
    }

    #[test]
    fn test_far_hostile_not_hit() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(HitDetectionSystem::new(&config)?);

        let far = hostile(&mut world, 2.5, 0.0, 100.0);
        hitbox(&mut world, 0.0, 0.0, None);
        world.update(0.016);
        assert_relative_eq!(world.component_or_default::<Health>(far).current, 100.0);
        Ok(())
    }

    #[test]
    fn test_knockback_pushes_away() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(HitDetectionSystem::new(&config)?);

        let target = hostile(&mut world, 0.5, 0.0, 100.0);
        let shot = hitbox(&mut world, 0.0, 0.0, Some(3));
        world.set_component(
            shot,
            Hitbox {
                damage: 1.0,
                knockback: 2.0,
                radius: 0.5,
                pierce: Some(3),
            },
        );
        world.update(0.016);
        assert_relative_eq!(world.component_or_default::<Position>(target).x, 2.5);
        assert_eq!(world.get_component::<Hitbox>(shot).and_then(|h| h.pierce), Some(2));
        Ok(())
    }

    fn player_at_origin(world: &mut World, armor: f32) -> EntityId {
        let p = world.create_entity();
        world.add_component(p, Player);
        world.add_component(p, Position::new(0.0, 0.0));
        world.add_component(p, Collider { radius: 0.5 });
        world.add_component(p, Health::full(100.0));
        world.add_component(
            p,
            FinalAttributes(Attributes::baseline().with(AttributeKind::Armor, armor)),
        );
        p
    }

    #[test]
    fn test_contact_damage_with_armor_and_invulnerability() -> CombatResult<()> {
        let (mut world, config) = arena()?;
        world.register_system(ContactDamageSystem::new(&config)?);

        let player = player_at_origin(&mut world, 2.0);
        let weak = hostile(&mut world, 0.5, 0.0, 10.0);
        world.add_component(weak, ContactDamage { amount: 5.0 });
        let strong = hostile(&mut world, -0.5, 0.0, 10.0);
        world.add_component(strong, ContactDamage { amount: 12.0 });

        world.update(0.1);
        assert_relative_eq!(world.component_or_default::<Health>(player).current, 90.0);

        // Inside the 0.5s window.
        world.update(0.1);
        assert_relative_eq!(world.component_or_default::<Health>(player).current, 90.0);

        for _ in 0..5 {
            world.update(0.1);
        }
        assert_relative_eq!(world.component_or_default::<Health>(player).current, 80.0);
        Ok(())
    }

    #[test]
    fn test_recovery_ticks_without_hostile_index() -> CombatResult<()> {
        let mut world = World::new();
        world.register_system(ContactDamageSystem::new(&SimulationConfig::default())?);

        let regen = FinalAttributes(Attributes::baseline().with(AttributeKind::Recovery, 10.0));
        let players: Vec<EntityId> = (0..2)
            .map(|_| {
                let p = player_at_origin(&mut world, 0.0);
                world.set_component(p, Health { current: 50.0, max: 100.0 });
                world.set_component(p, regen);
                p
            })
            .collect();

        world.update(0.5);

        for p in players {
            assert_relative_eq!(world.component_or_default::<Health>(p).current, 55.0);
        }
        Ok(())
    }

    #[test]
    fn test_death_drops_experience() {
        let mut world = World::new();
        world.register_system(DeathSystem::new(&SimulationConfig::default()));

        let doomed = world.create_entity();
        world.add_component(doomed, Health { current: 0.0, max: 10.0 });
        world.add_component(doomed, Position::new(4.0, 2.0));
        world.add_component(doomed, DropsExperience { amount: 3.0 });

        let fine = world.create_entity();
        world.add_component(fine, Health::full(10.0));

        world.update(0.016);

        assert!(!world.is_alive(doomed));
        assert!(world.is_alive(fine));
        let gems: Vec<_> = world
            .storage::<Pickup>()
            .map(|s| s.iter().map(|(id, p)| (id, *p)).collect())
            .unwrap_or_default();
        assert_eq!(gems.len(), 1);
        assert_relative_eq!(gems[0].1.value, 3.0);
        assert_eq!(world.get_component::<Position>(gems[0].0), Some(&Position::new(4.0, 2.0)));
        assert!(world.has_component::<Lifetime>(gems[0].0));
    }
}
