//! # Weapon Stat Aggregation
//!
//! A weapon's combat numbers come from three layers:
//!
//! 1. its static [`WeaponConfig`]
//! 2. its level
//! 3. add/multiply accumulators fed by upgrade rules
//!
//! ```text
//! damage   = (base_damage × level + damage_add) × damage_mul
//! count    =  base_count + count_add
//! interval =  base_interval × interval_mul
//! other    = (base + add) × mul
//! ```
//!
//! Accumulators only move when an upgrade is applied and only reset through
//! [`WeaponRuntimeStats::reset_modifiers`].

use horde_core::{Component, EntityId};

use super::config::{UpgradeOp, WeaponConfig, WeaponKind, WeaponStat};
use crate::error::{CombatError, CombatResult};

/// Per-(owner, weapon) runtime record.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponRuntimeStats {
    /// Entity wielding the weapon.
    pub owner: EntityId,
    /// Id into the weapon database.
    pub weapon_id: String,
    /// Current level, starting at 1.
    pub level: u32,
    /// Flat damage bonus.
    pub damage_add: f32,
    /// Damage factor.
    pub damage_mul: f32,
    /// Extra projectiles or hitboxes.
    pub count_add: u32,
    /// Interval factor.
    pub interval_mul: f32,
    /// Flat speed bonus.
    pub speed_add: f32,
    /// Speed factor.
    pub speed_mul: f32,
    /// Flat range bonus.
    pub range_add: f32,
    /// Range factor.
    pub range_mul: f32,
    /// Flat knockback bonus.
    pub knockback_add: f32,
    /// Knockback factor.
    pub knockback_mul: f32,
    /// Flat radius bonus.
    pub radius_add: f32,
    /// Radius factor.
    pub radius_mul: f32,
}

impl Default for WeaponRuntimeStats {
    fn default() -> Self {
        Self::new(EntityId::NULL, String::new())
    }
}

impl Component for WeaponRuntimeStats {}

/// Final numbers consumed by spawn logic.
///
/// For orbit weapons `speed` is the angular speed, `range` the orbit radius
/// and `duration` the wave lifetime. For projectiles `duration` is the time
/// needed to cover `range`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeaponStats {
    /// Damage per hit.
    pub damage: f32,
    /// Projectiles per volley or hitboxes per wave.
    pub count: u32,
    /// Seconds between volleys or waves.
    pub interval: f32,
    /// Knockback distance.
    pub knockback: f32,
    /// Projectile speed or angular speed.
    pub speed: f32,
    /// Projectile range or orbit radius.
    pub range: f32,
    /// Hitbox radius.
    pub radius: f32,
    /// Seconds a spawned hitbox lives.
    pub duration: f32,
    /// Targets one hitbox may hit; `None` never runs out.
    pub pierce: Option<u32>,
}

impl WeaponRuntimeStats {
    /// Level 1 record with neutral accumulators.
    #[must_use]
    pub fn new(owner: EntityId, weapon_id: impl Into<String>) -> Self {
        Self {
            owner,
            weapon_id: weapon_id.into(),
            level: 1,
            damage_add: 0.0,
            damage_mul: 1.0,
            count_add: 0,
            interval_mul: 1.0,
            speed_add: 0.0,
            speed_mul: 1.0,
            range_add: 0.0,
            range_mul: 1.0,
            knockback_add: 0.0,
            knockback_mul: 1.0,
            radius_add: 0.0,
            radius_mul: 1.0,
        }
    }

    /// Returns every accumulator to neutral. Owner, id and level are kept.
    pub fn reset_modifiers(&mut self) {
        let level = self.level;
        *self = Self::new(self.owner, std::mem::take(&mut self.weapon_id));
        self.level = level;
    }

    /// Combines config, level and accumulators.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn final_stats(&self, config: &WeaponConfig) -> WeaponStats {
        let damage = (config.base_damage * self.level as f32 + self.damage_add) * self.damage_mul;
        let count = config.base_count.saturating_add(self.count_add);
        let knockback = (config.base_knockback + self.knockback_add) * self.knockback_mul;
        let scaled = |base: f32, add: f32, mul: f32| (base + add) * mul;

        match config.kind {
            WeaponKind::Projectile {
                speed,
                range,
                interval,
                radius,
                pierce,
            } => {
                let speed = scaled(speed, self.speed_add, self.speed_mul);
                let range = scaled(range, self.range_add, self.range_mul);
                WeaponStats {
                    damage,
                    count,
                    interval: interval * self.interval_mul,
                    knockback,
                    speed,
                    range,
                    radius: scaled(radius, self.radius_add, self.radius_mul),
                    duration: if speed > 0.0 { range / speed } else { 0.0 },
                    pierce: Some(pierce),
                }
            }
            WeaponKind::Orbit {
                radius,
                angular_speed,
                interval,
                duration,
                hitbox_radius,
            } => WeaponStats {
                damage,
                count,
                interval: interval * self.interval_mul,
                knockback,
                speed: scaled(angular_speed, self.speed_add, self.speed_mul),
                range: scaled(radius, self.range_add, self.range_mul),
                radius: scaled(hitbox_radius, self.radius_add, self.radius_mul),
                duration,
                pierce: None,
            },
        }
    }

    fn accumulate(&mut self, stat: WeaponStat, op: UpgradeOp, value: f32) -> bool {
        let (add, mul) = match stat {
            WeaponStat::Damage => (&mut self.damage_add, &mut self.damage_mul),
            WeaponStat::Speed => (&mut self.speed_add, &mut self.speed_mul),
            WeaponStat::Range => (&mut self.range_add, &mut self.range_mul),
            WeaponStat::Knockback => (&mut self.knockback_add, &mut self.knockback_mul),
            WeaponStat::Radius => (&mut self.radius_add, &mut self.radius_mul),
            WeaponStat::Count => {
                if op != UpgradeOp::Add || !value.is_finite() || value < 0.0 {
                    return false;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    self.count_add = self.count_add.saturating_add(value.round() as u32);
                }
                return true;
            }
            WeaponStat::FireRate => {
                if op != UpgradeOp::Multiply {
                    return false;
                }
                self.interval_mul *= value;
                return true;
            }
        };
        match op {
            UpgradeOp::Add => *add += value,
            UpgradeOp::Multiply => *mul *= value,
        }
        true
    }
}

/// Raises a weapon one level, applying every rule gated on the new level.
///
/// Rules naming an unknown stat, or using an operation the stat does not
/// support, are logged and skipped. Returns the new level.
///
/// # Errors
///
/// `MaxLevelReached` when the weapon is already at `config.max_level`; the
/// record is left untouched.
pub fn upgrade(stats: &mut WeaponRuntimeStats, config: &WeaponConfig) -> CombatResult<u32> {
    if stats.level >= config.max_level {
        return Err(CombatError::MaxLevelReached {
            weapon: stats.weapon_id.clone(),
            level: stats.level,
        });
    }

    let level = stats.level + 1;
    for rule in config.upgrades.iter().filter(|r| r.applies_at(level)) {
        let Ok(stat) = rule.stat.parse::<WeaponStat>() else {
            tracing::warn!(weapon = %config.id, stat = %rule.stat, "skipping rule with unknown stat");
            continue;
        };
        if !stats.accumulate(stat, rule.op, rule.value) {
            tracing::warn!(
                weapon = %config.id,
                %stat,
                op = ?rule.op,
                "skipping rule with unsupported operation"
            );
        }
    }
    stats.level = level;
    Ok(level)
}
