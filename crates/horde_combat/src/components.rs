//! # Combat Components
//!
//! Plain data. Any subset may be attached to an entity; systems check for
//! each component they need and skip entities that lack one.

use horde_core::{Component, EntityId};

/// The player character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Player;
impl Component for Player {}

/// Enemy unit, tracked by the hostile index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hostile;
impl Component for Hostile {}

/// Collectible, tracked by the pickup index.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pickup {
    /// Amount forwarded to the experience sink on collection.
    pub value: f32,
}
impl Component for Pickup {}

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Health {
    /// Current hit points.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
}
impl Component for Health {}

impl Health {
    /// Full health.
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// True at or below zero.
    #[inline]
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Circular body used for contact tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Collider {
    /// Radius in world units.
    pub radius: f32,
}
impl Component for Collider {}

/// Self-propelled movement speed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mover {
    /// World units per second.
    pub speed: f32,
}
impl Component for Mover {}

/// Entity this unit walks towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChaseTarget(pub EntityId);
impl Component for ChaseTarget {}

/// Damage dealt to the player on touch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactDamage {
    /// Damage per touch.
    pub amount: f32,
}
impl Component for ContactDamage {}

/// Remaining immunity to contact damage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Invulnerability {
    /// Seconds left.
    pub remaining: f32,
}
impl Component for Invulnerability {}

/// Damaging area carried by projectiles and orbiting weapons.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hitbox {
    /// Damage per hit.
    pub damage: f32,
    /// Push distance applied to the target.
    pub knockback: f32,
    /// Radius in world units.
    pub radius: f32,
    /// Targets this hitbox may still hit; `None` never runs out.
    pub pierce: Option<u32>,
}
impl Component for Hitbox {}

/// Entity that spawned this one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Owner(pub EntityId);
impl Component for Owner {}

/// Per-target re-trigger timers of a persistent hitbox.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitCooldowns {
    entries: Vec<(EntityId, f32)>,
}
impl Component for HitCooldowns {}

impl HitCooldowns {
    /// True while `target` may not be hit again.
    #[must_use]
    pub fn is_blocked(&self, target: EntityId) -> bool {
        self.entries.iter().any(|&(id, _)| id == target)
    }

    /// Blocks `target` for `seconds`.
    pub fn block(&mut self, target: EntityId, seconds: f32) {
        match self.entries.iter_mut().find(|(id, _)| *id == target) {
            Some(entry) => entry.1 = seconds,
            None => self.entries.push((target, seconds)),
        }
    }

    /// Advances every timer and drops the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for entry in &mut self.entries {
            entry.1 -= dt;
        }
        self.entries.retain(|&(_, remaining)| remaining > 0.0);
    }

    /// Number of blocked targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no target is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Time until the entity expires.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lifetime {
    /// Seconds left.
    pub remaining: f32,
}
impl Component for Lifetime {}

/// Circular motion around another entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orbit {
    /// Entity at the center.
    pub center: EntityId,
    /// Distance from the center.
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
    /// Current angle, radians.
    pub angle: f32,
}
impl Component for Orbit {}

/// Pickup attraction radius of a collector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Magnet {
    /// Radius in world units.
    pub radius: f32,
}
impl Component for Magnet {}

/// Experience dropped on death.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DropsExperience {
    /// Value of the dropped pickup.
    pub amount: f32,
}
impl Component for DropsExperience {}

/// Pickup flying towards a collector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attracted {
    /// Collector.
    pub target: EntityId,
}
impl Component for Attracted {}
