//! # HORDE Combat Layer
//!
//! Gameplay on top of `horde_core`:
//! - Combat components (health, hitboxes, pickups, orbits)
//! - Attribute aggregation: `(base + Σadd) × (1 + Σmul)`
//! - Weapon stats from config, level and upgrade accumulators
//! - The fixed per-frame system list ([`install_default_systems`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use horde_combat::*;
//!
//! let mut world = World::new();
//! install_default_systems(&mut world, &SimulationConfig::default(), WeaponDatabase::builtin()?)?;
//! let ledger = ExperienceLedger::default();
//! world.register_service::<SharedExperienceSink>(Box::new(ledger.clone()));
//!
//! let player = spawn_player(&mut world, Position::new(0.0, 0.0), Attributes::baseline());
//! equip_weapon(&mut world, player, "magic_wand")?;
//! world.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod components;
pub mod config;
pub mod error;
pub mod experience;
pub mod layers;
pub mod schedule;
pub mod spawn;
pub mod systems;
pub mod weapons;

pub use attributes::{
    aggregate, apply_modifier_source, final_attribute, remove_modifier_source, AttributeKind,
    Attributes, AttributesDirty, BaseAttributes, FinalAttributes, Modifier, ModifierOp,
    ModifierSet, SourceId,
};
pub use components::{
    Attracted, ChaseTarget, Collider, ContactDamage, DropsExperience, Health, HitCooldowns, Hitbox,
    Hostile, Invulnerability, Lifetime, Magnet, Mover, Orbit, Owner, Pickup, Player,
};
pub use config::SimulationConfig;
pub use error::{CombatError, CombatResult};
pub use experience::{ExperienceLedger, ExperienceSink, SharedExperienceSink};
pub use layers::{capability, Hostiles, Pickups};
pub use schedule::install_default_systems;
pub use spawn::{spawn_hostile, spawn_hostile_ring, spawn_player, HostileTemplate};
pub use weapons::{
    equip_weapon, upgrade_weapon, WeaponConfig, WeaponDatabase, WeaponRuntimeStats, WeaponStats,
    WeaponTimer,
};

pub use horde_core::{EntityId, Position, Velocity, World};
