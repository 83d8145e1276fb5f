//! Weapon firing.
//!
//! Each ready weapon combines its runtime stats with its owner's final
//! attributes at fire time:
//!
//! | attribute         | scales            |
//! |-------------------|-------------------|
//! | `Might`           | damage            |
//! | `Area`            | hitbox radius     |
//! | `Cooldown`        | interval          |
//! | `ProjectileSpeed` | projectile speed  |
//! | `Duration`        | orbit lifetime    |
//!
//! Owner attributes never touch the weapon's accumulators.

use std::f32::consts::TAU;

use horde_core::{EntityId, LayerIndex, Position, QueryBuffer, System, Velocity, World};

use crate::attributes::{final_attribute, AttributeKind};
use crate::components::{HitCooldowns, Hitbox, Lifetime, Orbit, Owner};
use crate::config::SimulationConfig;
use crate::error::CombatResult;
use crate::layers::{capability, Hostiles};
use crate::weapons::{WeaponDatabase, WeaponKind, WeaponRuntimeStats, WeaponStats, WeaponTimer};

use super::collect_ids;

/// Angle between neighboring projectiles of one volley, radians.
const VOLLEY_SPREAD: f32 = 0.15;

/// Fires every ready weapon and restarts its timer.
///
/// Projectile weapons wait (timer stays at zero) until a hostile is in
/// range. Weapons whose owner is gone are destroyed.
pub struct WeaponFireSystem {
    weapons: Vec<EntityId>,
    buffer: QueryBuffer,
}

impl WeaponFireSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// `Core(ZeroQueryCapacity)` when the configured query capacity is zero.
    pub fn new(config: &SimulationConfig) -> CombatResult<Self> {
        Ok(Self {
            weapons: Vec::new(),
            buffer: QueryBuffer::new(config.query_capacity)?,
        })
    }
}

impl System for WeaponFireSystem {
    fn name(&self) -> &'static str {
        "weapon_fire"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[
            capability::FINAL_ATTRIBUTES,
            capability::HOSTILE_INDEX,
            capability::DECAYED_COOLDOWNS,
        ]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<WeaponRuntimeStats>(world, &mut self.weapons);
        if self.weapons.is_empty() {
            return;
        }
        let Some(db) = world.take_service::<WeaponDatabase>() else {
            tracing::debug!("weapon database missing; nothing fires");
            return;
        };

        for &weapon in &self.weapons {
            fire_weapon(world, &db, &mut self.buffer, weapon);
        }

        world.register_service(db);
    }
}

fn fire_weapon(world: &mut World, db: &WeaponDatabase, buffer: &mut QueryBuffer, weapon: EntityId) {
    if world.is_pending_destroy(weapon)
        || world.component_or_default::<WeaponTimer>(weapon).cooldown > 0.0
    {
        return;
    }
    let Some(stats) = world.get_component::<WeaponRuntimeStats>(weapon) else {
        return;
    };
    let owner = stats.owner;
    let Some(config) = db.get(&stats.weapon_id) else {
        tracing::warn!(%weapon, weapon_id = %stats.weapon_id, "weapon has no definition");
        return;
    };
    let mut fs = stats.final_stats(config);

    if !world.is_alive(owner) {
        world.destroy_entity(weapon);
        return;
    }
    if world.is_pending_destroy(owner) {
        return;
    }
    let Some(&origin) = world.get_component::<Position>(owner) else {
        return;
    };

    fs.damage *= final_attribute(world, owner, AttributeKind::Might, 1.0);
    fs.radius *= final_attribute(world, owner, AttributeKind::Area, 1.0);
    fs.interval *= final_attribute(world, owner, AttributeKind::Cooldown, 1.0);

    let fired = match config.kind {
        WeaponKind::Projectile { .. } => {
            fs.speed *= final_attribute(world, owner, AttributeKind::ProjectileSpeed, 1.0);
            if fs.speed > 0.0 {
                fs.duration = fs.range / fs.speed;
            }
            fire_projectiles(world, buffer, owner, origin, &fs)
        }
        WeaponKind::Orbit { .. } => {
            fs.duration *= final_attribute(world, owner, AttributeKind::Duration, 1.0);
            spawn_orbit_wave(world, owner, origin, &fs);
            true
        }
    };

    if fired {
        world.set_component(weapon, WeaponTimer { cooldown: fs.interval });
        tracing::trace!(%weapon, count = fs.count, damage = fs.damage, "weapon fired");
    }
}

fn nearest_hostile(
    world: &World,
    buffer: &mut QueryBuffer,
    origin: Position,
    range: f32,
) -> Option<Position> {
    let index = world.try_service::<LayerIndex<Hostiles>>()?;
    let found = buffer.fill(index, origin.x, origin.y, range);
    if found.is_truncated() {
        tracing::debug!(missed = found.missed, "targeting candidates truncated");
    }

    buffer
        .as_slice()
        .iter()
        .filter(|&&h| !world.is_pending_destroy(h))
        .filter_map(|&h| world.get_component::<Position>(h).copied())
        .map(|p| (p, p.distance_squared(origin)))
        .filter(|&(_, d2)| d2 <= range * range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

#[allow(clippy::cast_precision_loss)]
fn fire_projectiles(
    world: &mut World,
    buffer: &mut QueryBuffer,
    owner: EntityId,
    origin: Position,
    fs: &WeaponStats,
) -> bool {
    let Some(target) = nearest_hostile(world, buffer, origin, fs.range) else {
        return false;
    };

    let aim = Velocity::towards(origin, target, 1.0);
    let heading = if aim == Velocity::default() {
        0.0
    } else {
        aim.y.atan2(aim.x)
    };
    let center = fs.count.saturating_sub(1) as f32 / 2.0;

    for i in 0..fs.count {
        let (sin, cos) = (heading + (i as f32 - center) * VOLLEY_SPREAD).sin_cos();
        let shot = world.create_entity();
        world.add_component(shot, origin);
        world.add_component(shot, Velocity::new(cos * fs.speed, sin * fs.speed));
        world.add_component(
            shot,
            Hitbox {
                damage: fs.damage,
                knockback: fs.knockback,
                radius: fs.radius,
                pierce: fs.pierce,
            },
        );
        world.add_component(shot, HitCooldowns::default());
        world.add_component(shot, Owner(owner));
        world.add_component(shot, Lifetime { remaining: fs.duration });
    }
    true
}

#[allow(clippy::cast_precision_loss)]
fn spawn_orbit_wave(world: &mut World, owner: EntityId, origin: Position, fs: &WeaponStats) {
    let count = fs.count.max(1);
    for i in 0..count {
        let angle = TAU * i as f32 / count as f32;
        let (sin, cos) = angle.sin_cos();
        let blade = world.create_entity();
        world.add_component(
            blade,
            Position::new(origin.x + cos * fs.range, origin.y + sin * fs.range),
        );
        world.add_component(
            blade,
            Orbit {
                center: owner,
                radius: fs.range,
                angular_speed: fs.speed,
                angle,
            },
        );
        world.add_component(
            blade,
            Hitbox {
                damage: fs.damage,
                knockback: fs.knockback,
                radius: fs.radius,
                pierce: None,
            },
        );
        world.add_component(blade, HitCooldowns::default());
        world.add_component(blade, Owner(owner));
        world.add_component(blade, Lifetime { remaining: fs.duration });
    }
}
