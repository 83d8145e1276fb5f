//! # Weapon Definitions
//!
//! Static per-weapon data plus declarative upgrade rules, loaded from TOML
//! into a [`WeaponDatabase`] that is registered as a world service.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{load_toml, parse_toml};
use crate::error::{CombatError, CombatResult};

/// Definitions shipped with the crate.
const BUILTIN_WEAPONS: &str = include_str!("../../data/weapons.toml");

/// Behavior-specific weapon data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaponKind {
    /// Fires projectiles at the nearest hostile.
    Projectile {
        /// World units per second.
        speed: f32,
        /// Maximum travel distance; also the targeting range.
        range: f32,
        /// Seconds between volleys.
        interval: f32,
        /// Hitbox radius.
        radius: f32,
        /// Hostiles one projectile can hit.
        pierce: u32,
    },
    /// Spawns hitboxes circling the owner.
    Orbit {
        /// Distance from the owner.
        radius: f32,
        /// Radians per second.
        angular_speed: f32,
        /// Seconds between waves.
        interval: f32,
        /// Seconds a wave lasts.
        duration: f32,
        /// Radius of each orbiting hitbox.
        hitbox_radius: f32,
    },
}

/// How an upgrade rule changes its accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeOp {
    /// Added to the `add` accumulator.
    Add,
    /// Multiplied into the `mul` accumulator.
    Multiply,
}

/// Weapon dimension an upgrade rule targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponStat {
    /// Damage per hit.
    Damage,
    /// Projectiles per volley or hitboxes per wave. Additive only.
    Count,
    /// Scales the interval. Multiplicative only.
    FireRate,
    /// Projectile speed or orbit angular speed.
    Speed,
    /// Projectile range or orbit radius.
    Range,
    /// Knockback distance.
    Knockback,
    /// Hitbox radius.
    Radius,
}

impl WeaponStat {
    /// Name used in data files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Count => "count",
            Self::FireRate => "fire_rate",
            Self::Speed => "speed",
            Self::Range => "range",
            Self::Knockback => "knockback",
            Self::Radius => "radius",
        }
    }
}

impl fmt::Display for WeaponStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeaponStat {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "damage" => Ok(Self::Damage),
            "count" | "amount" => Ok(Self::Count),
            "fire_rate" | "interval" | "cooldown" => Ok(Self::FireRate),
            "speed" => Ok(Self::Speed),
            "range" => Ok(Self::Range),
            "knockback" => Ok(Self::Knockback),
            "radius" | "area" => Ok(Self::Radius),
            other => Err(CombatError::UnknownStat(other.to_string())),
        }
    }
}

/// One declarative level-up effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRule {
    /// Stat name, see [`WeaponStat`].
    pub stat: String,
    /// Combine rule.
    pub op: UpgradeOp,
    /// Amount.
    pub value: f32,
    /// Only applies on levels divisible by this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every: Option<u32>,
}

impl UpgradeRule {
    /// True when the rule fires on reaching `level`.
    #[inline]
    #[must_use]
    pub const fn applies_at(&self, level: u32) -> bool {
        match self.every {
            None | Some(0) => true,
            Some(n) => level % n == 0,
        }
    }
}

const fn default_count() -> u32 {
    1
}

const fn default_max_level() -> u32 {
    8
}

/// Static configuration of one weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Unique id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Damage at level 1.
    pub base_damage: f32,
    /// Projectiles per volley or hitboxes per wave.
    #[serde(default = "default_count")]
    pub base_count: u32,
    /// Knockback distance.
    #[serde(default)]
    pub base_knockback: f32,
    /// Highest reachable level.
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Behavior.
    pub kind: WeaponKind,
    /// Level-up rules.
    #[serde(default)]
    pub upgrades: Vec<UpgradeRule>,
}

impl WeaponConfig {
    /// Seconds between volleys or waves.
    #[must_use]
    pub const fn base_interval(&self) -> f32 {
        match self.kind {
            WeaponKind::Projectile { interval, .. } | WeaponKind::Orbit { interval, .. } => interval,
        }
    }

    fn validate(&self) -> CombatResult<()> {
        let invalid = |what: &str| {
            Err(CombatError::InvalidConfig(format!("weapon {}: {what}", self.id)))
        };

        if self.id.is_empty() {
            return Err(CombatError::InvalidConfig("weapon with empty id".to_string()));
        }
        if !self.base_damage.is_finite() || self.base_damage < 0.0 {
            return invalid("base_damage must be non-negative");
        }
        if self.max_level == 0 {
            return invalid("max_level must be at least 1");
        }
        if !(self.base_interval().is_finite() && self.base_interval() > 0.0) {
            return invalid("interval must be positive");
        }
        match self.kind {
            WeaponKind::Projectile { speed, range, .. } if speed <= 0.0 || range <= 0.0 => {
                invalid("projectile speed and range must be positive")
            }
            WeaponKind::Orbit { duration, .. } if duration <= 0.0 => {
                invalid("orbit duration must be positive")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Deserialize)]
struct WeaponFile {
    #[serde(default)]
    weapon: Vec<WeaponConfig>,
}

/// All weapon definitions, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct WeaponDatabase {
    weapons: Vec<WeaponConfig>,
    by_id: HashMap<String, usize>,
}

impl WeaponDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The definitions shipped with the crate.
    ///
    /// # Errors
    ///
    /// Only if the bundled data file is broken.
    pub fn builtin() -> CombatResult<Self> {
        Self::from_toml_str(BUILTIN_WEAPONS)
    }

    /// Parses a `[[weapon]]` document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` on malformed TOML, `InvalidConfig` on bad values,
    /// `DuplicateWeapon` when two entries share an id.
    pub fn from_toml_str(text: &str) -> CombatResult<Self> {
        let file: WeaponFile = parse_toml(text)?;
        Self::from_configs(file.weapon)
    }

    /// Reads and parses a `[[weapon]]` file.
    ///
    /// # Errors
    ///
    /// `ConfigIo` when the file cannot be read, otherwise as
    /// [`WeaponDatabase::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> CombatResult<Self> {
        let file: WeaponFile = load_toml(path.as_ref())?;
        Self::from_configs(file.weapon)
    }

    /// Builds a database from already parsed definitions.
    ///
    /// # Errors
    ///
    /// As [`WeaponDatabase::insert`].
    pub fn from_configs(configs: impl IntoIterator<Item = WeaponConfig>) -> CombatResult<Self> {
        let mut db = Self::new();
        for config in configs {
            db.insert(config)?;
        }
        tracing::debug!(weapons = db.len(), "weapon database loaded");
        Ok(db)
    }

    /// Adds one definition.
    ///
    /// Rules naming an unknown stat are kept but logged; they are skipped
    /// when an upgrade is applied.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on bad values, `DuplicateWeapon` on a taken id.
    pub fn insert(&mut self, config: WeaponConfig) -> CombatResult<()> {
        config.validate()?;
        if self.by_id.contains_key(&config.id) {
            return Err(CombatError::DuplicateWeapon(config.id));
        }
        for rule in &config.upgrades {
            if rule.stat.parse::<WeaponStat>().is_err() {
                tracing::warn!(weapon = %config.id, stat = %rule.stat, "upgrade rule names unknown stat");
            }
        }
        self.by_id.insert(config.id.clone(), self.weapons.len());
        self.weapons.push(config);
        Ok(())
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WeaponConfig> {
        self.by_id.get(id).map(|&i| &self.weapons[i])
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    /// True when the database holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Ids in load order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weapons.iter().map(|w| w.id.as_str())
    }
}
