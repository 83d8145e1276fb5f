//! Indexed populations and the capability labels systems declare.

use horde_core::IndexLayer;

use crate::components::{Hostile, Pickup};

/// Capability labels used in `provides`/`requires`.
pub mod capability {
    /// Hostile index rebuilt this frame.
    pub const HOSTILE_INDEX: &str = "index:hostiles";
    /// Pickup index rebuilt this frame.
    pub const PICKUP_INDEX: &str = "index:pickups";
    /// Final attributes of dirty entities recomputed.
    pub const FINAL_ATTRIBUTES: &str = "attributes:final";
    /// Derived components updated from final attributes.
    pub const PROPAGATED_ATTRIBUTES: &str = "attributes:propagated";
    /// Hit cooldowns, invulnerability and weapon timers advanced.
    pub const DECAYED_COOLDOWNS: &str = "cooldowns:decayed";
}

/// Enemy population.
pub struct Hostiles;

impl IndexLayer for Hostiles {
    type Member = Hostile;
    const NAME: &'static str = "hostiles";
    const BUILDER_NAME: &'static str = "index_builder_hostiles";
    const CAPABILITY: &'static [&'static str] = &[capability::HOSTILE_INDEX];
}

/// Collectible population.
pub struct Pickups;

impl IndexLayer for Pickups {
    type Member = Pickup;
    const NAME: &'static str = "pickups";
    const BUILDER_NAME: &'static str = "index_builder_pickups";
    const CAPABILITY: &'static [&'static str] = &[capability::PICKUP_INDEX];
}
