//! # Default Frame Schedule
//!
//! The system list is fixed and ordered by hand. Each system declares the
//! capabilities it provides and requires; installation fails if a consumer
//! was registered before its producer.
//!
//! | #  | system                     | provides / requires                     |
//! |----|----------------------------|-----------------------------------------|
//! | 1  | attribute_aggregation      | + attributes:final                      |
//! | 2  | attribute_propagation      | attributes:final → attributes:propagated |
//! | 3  | chase                      | attributes:propagated                   |
//! | 4  | movement                   |                                         |
//! | 5  | orbit                      |                                         |
//! | 6  | index_builder_hostiles     | + index:hostiles                        |
//! | 7  | index_builder_pickups      | + index:pickups                         |
//! | 8  | cooldown_decay             | + cooldowns:decayed                     |
//! | 9  | weapon_fire                | attributes, hostiles, cooldowns         |
//! | 10 | hit_detection              | index:hostiles, cooldowns:decayed       |
//! | 11 | contact_damage             | index:hostiles, cooldowns:decayed       |
//! | 12 | death                      |                                         |
//! | 13 | pickup_magnet              | index:pickups                           |
//! | 14 | lifetime                   |                                         |

use horde_core::{IndexBuilderSystem, LayerIndex, World};

use crate::config::SimulationConfig;
use crate::error::CombatResult;
use crate::layers::{Hostiles, Pickups};
use crate::systems::{
    AttributeAggregationSystem, AttributePropagationSystem, ChaseSystem, ContactDamageSystem,
    CooldownDecaySystem, DeathSystem, HitDetectionSystem, LifetimeSystem, MovementSystem,
    OrbitSystem, PickupMagnetSystem, WeaponFireSystem,
};
use crate::weapons::WeaponDatabase;

/// Registers the services and the fixed system list on `world`.
///
/// Services: a copy of `config`, the weapon database and both spatial
/// indices. The experience sink is left to the host.
///
/// # Errors
///
/// - `InvalidConfig` when `config` fails validation
/// - `Core(ScheduleViolation)` when the resulting list breaks the ordering
///   contract (only possible if systems were registered beforehand)
pub fn install_default_systems(
    world: &mut World,
    config: &SimulationConfig,
    weapons: WeaponDatabase,
) -> CombatResult<()> {
    config.validate()?;

    world.register_service(config.clone());
    world.register_service(weapons);
    world.register_service(LayerIndex::<Hostiles>::new(config.hostile_cell_size)?);
    world.register_service(LayerIndex::<Pickups>::new(config.pickup_cell_size)?);

    world.register_system(AttributeAggregationSystem::new());
    world.register_system(AttributePropagationSystem::new());
    world.register_system(ChaseSystem::new());
    world.register_system(MovementSystem::new());
    world.register_system(OrbitSystem::new());
    world.register_system(IndexBuilderSystem::<Hostiles>::new());
    world.register_system(IndexBuilderSystem::<Pickups>::new());
    world.register_system(CooldownDecaySystem::new());
    world.register_system(WeaponFireSystem::new(config)?);
    world.register_system(HitDetectionSystem::new(config)?);
    world.register_system(ContactDamageSystem::new(config)?);
    world.register_system(DeathSystem::new(config));
    world.register_system(PickupMagnetSystem::new(config)?);
    world.register_system(LifetimeSystem::new());

    world.validate_schedule()?;
    tracing::info!(systems = ?world.system_names(), "default schedule installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CombatError;
    use horde_core::{CoreError, System};

    #[test]
    fn test_default_order() -> CombatResult<()> {
        let mut world = World::new();
        install_default_systems(&mut world, &SimulationConfig::default(), WeaponDatabase::builtin()?)?;

        assert_eq!(
            world.system_names(),
            vec![
                "attribute_aggregation",
                "attribute_propagation",
                "chase",
                "movement",
                "orbit",
                "index_builder_hostiles",
                "index_builder_pickups",
                "cooldown_decay",
                "weapon_fire",
                "hit_detection",
                "contact_damage",
                "death",
                "pickup_magnet",
                "lifetime",
            ]
        );
        assert!(world.has_service::<WeaponDatabase>());
        assert!(world.has_service::<SimulationConfig>());
        assert!(world.has_service::<LayerIndex<Hostiles>>());
        assert!(world.has_service::<LayerIndex<Pickups>>());
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected_before_registration() -> CombatResult<()> {
        let mut world = World::new();
        let config = SimulationConfig {
            query_capacity: 0,
            ..SimulationConfig::default()
        };
        let result = install_default_systems(&mut world, &config, WeaponDatabase::builtin()?);

        assert!(matches!(result, Err(CombatError::InvalidConfig(_))));
        assert!(world.system_names().is_empty());
        Ok(())
    }

    #[test]
    fn test_early_consumer_is_reported() -> CombatResult<()> {
        struct EarlyReader;
        impl System for EarlyReader {
            fn name(&self) -> &'static str {
                "early_reader"
            }
            fn update(&mut self, _world: &mut World, _dt: f32) {}
            fn requires(&self) -> &'static [&'static str] {
                &[crate::layers::capability::PICKUP_INDEX]
            }
        }

        let mut world = World::new();
        world.register_system(EarlyReader);
        let result = install_default_systems(&mut world, &SimulationConfig::default(), WeaponDatabase::builtin()?);

        assert!(matches!(
            result,
            Err(CombatError::Core(CoreError::ScheduleViolation { consumer: "early_reader", .. }))
        ));
        Ok(())
    }
}
