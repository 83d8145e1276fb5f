//! # Combat Error Types
//!
//! Errors raised while loading data or handling explicit requests
//! (equip, upgrade). Per-frame systems never return these; they log and
//! skip instead.

use thiserror::Error;

/// Errors that can occur in the combat layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombatError {
    /// A TOML document could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A config file could not be read.
    #[error("config io error at {path}: {message}")]
    ConfigIo {
        /// File that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// A config parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Weapon id not present in the database.
    #[error("unknown weapon: {0}")]
    UnknownWeapon(String),

    /// Upgrade rule names a stat that does not exist.
    #[error("unknown weapon stat: {0}")]
    UnknownStat(String),

    /// Weapon is already at its configured maximum level.
    #[error("weapon {weapon} already at max level {level}")]
    MaxLevelReached {
        /// Weapon id.
        weapon: String,
        /// Current (maximum) level.
        level: u32,
    },

    /// Two weapon definitions share an id, or an owner already wields it.
    #[error("duplicate weapon: {0}")]
    DuplicateWeapon(String),

    /// Operation targets an entity that is not live.
    #[error("entity {0} is not live")]
    NotLive(horde_core::EntityId),

    /// Entity is not a weapon or is missing required components.
    #[error("entity {0} is not an equipped weapon")]
    NotAWeapon(horde_core::EntityId),

    /// Core runtime rejected a setting.
    #[error(transparent)]
    Core(#[from] horde_core::CoreError),
}

/// Result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;
