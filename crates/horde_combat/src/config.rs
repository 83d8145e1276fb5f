//! # Simulation Configuration
//!
//! Tunables loaded once at startup. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! hostile_cell_size = 2.0
//! pickup_cell_size = 4.0
//! query_capacity = 128
//! ```

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{CombatError, CombatResult};

/// Reads and parses a TOML file.
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> CombatResult<T> {
    let text = std::fs::read_to_string(path).map_err(|e| CombatError::ConfigIo {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_toml(&text)
}

/// Parses a TOML document.
pub(crate) fn parse_toml<T: DeserializeOwned>(text: &str) -> CombatResult<T> {
    toml::from_str(text).map_err(|e| CombatError::ConfigParse(e.to_string()))
}

/// Per-run simulation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cell size of the hostile index, in world units.
    pub hostile_cell_size: f32,
    /// Cell size of the pickup index, in world units.
    pub pickup_cell_size: f32,
    /// Capacity of every neighbor-query buffer.
    pub query_capacity: usize,
    /// Distance at which an attracted pickup is collected.
    pub pickup_collect_radius: f32,
    /// Speed of a pickup flying towards its collector.
    pub pickup_attract_speed: f32,
    /// Invulnerability granted to the player after a contact hit, seconds.
    pub player_invulnerability: f32,
    /// Delay before a persistent hitbox may hit the same target again, seconds.
    pub hit_cooldown: f32,
    /// Lifetime of dropped experience pickups, seconds.
    pub pickup_lifetime: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hostile_cell_size: 2.0,
            pickup_cell_size: 4.0,
            query_capacity: 128,
            pickup_collect_radius: 0.5,
            pickup_attract_speed: 8.0,
            player_invulnerability: 0.5,
            hit_cooldown: 0.5,
            pickup_lifetime: 30.0,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` on malformed TOML, `InvalidConfig` on bad values.
    pub fn from_toml_str(text: &str) -> CombatResult<Self> {
        let config: Self = parse_toml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigIo` when the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> CombatResult<Self> {
        let config: Self = load_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> CombatResult<()> {
        let positive = [
            ("hostile_cell_size", self.hostile_cell_size),
            ("pickup_cell_size", self.pickup_cell_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CombatError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }

        if self.query_capacity == 0 {
            return Err(CombatError::InvalidConfig(
                "query_capacity must be greater than zero".to_string(),
            ));
        }

        let non_negative = [
            ("pickup_collect_radius", self.pickup_collect_radius),
            ("pickup_attract_speed", self.pickup_attract_speed),
            ("player_invulnerability", self.player_invulnerability),
            ("hit_cooldown", self.hit_cooldown),
            ("pickup_lifetime", self.pickup_lifetime),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CombatError::InvalidConfig(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }

        Ok(())
    }
}
