//! # Weapons
//!
//! Static definitions, runtime stat aggregation and the equip/upgrade
//! entry points used by progression code.

mod config;
mod equip;
mod stats;

pub use config::{UpgradeOp, UpgradeRule, WeaponConfig, WeaponDatabase, WeaponKind, WeaponStat};
pub use equip::{equip_weapon, upgrade_weapon, WeaponTimer};
pub use stats::{upgrade, WeaponRuntimeStats, WeaponStats};
