//! Equipping and upgrading weapons on live entities.
//!
//! A weapon is its own entity carrying [`WeaponRuntimeStats`], an
//! [`Owner`] and a [`WeaponTimer`]. The fire system picks it up on the
//! next frame.

use horde_core::{Component, EntityId, World};

use super::config::WeaponDatabase;
use super::stats::{upgrade, WeaponRuntimeStats};
use crate::components::Owner;
use crate::error::{CombatError, CombatResult};

/// Time until a weapon may fire again.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeaponTimer {
    /// Seconds left; the weapon is ready at zero.
    pub cooldown: f32,
}

impl Component for WeaponTimer {}

/// Creates a level 1 weapon entity for `owner`.
///
/// # Errors
///
/// - `NotLive` when `owner` is not a live entity
/// - `UnknownWeapon` when no [`WeaponDatabase`] service knows `weapon_id`
/// - `DuplicateWeapon` when `owner` already wields that weapon
pub fn equip_weapon(world: &mut World, owner: EntityId, weapon_id: &str) -> CombatResult<EntityId> {
    if !world.is_alive(owner) {
        return Err(CombatError::NotLive(owner));
    }
    let known = world
        .try_service::<WeaponDatabase>()
        .is_some_and(|db| db.get(weapon_id).is_some());
    if !known {
        return Err(CombatError::UnknownWeapon(weapon_id.to_string()));
    }
    let already = world.storage::<WeaponRuntimeStats>().is_some_and(|s| {
        s.iter().any(|(id, w)| {
            w.owner == owner && w.weapon_id == weapon_id && !world.is_pending_destroy(id)
        })
    });
    if already {
        return Err(CombatError::DuplicateWeapon(weapon_id.to_string()));
    }

    let weapon = world.create_entity();
    world.add_component(weapon, WeaponRuntimeStats::new(owner, weapon_id));
    world.add_component(weapon, Owner(owner));
    world.add_component(weapon, WeaponTimer::default());
    tracing::info!(%owner, %weapon, weapon_id, "weapon equipped");
    Ok(weapon)
}

/// Raises an equipped weapon one level. Returns the new level.
///
/// # Errors
///
/// - `NotAWeapon` when the entity carries no [`WeaponRuntimeStats`]
/// - `UnknownWeapon` when the definition is missing
/// - `MaxLevelReached` at max level; nothing is changed
pub fn upgrade_weapon(world: &mut World, weapon: EntityId) -> CombatResult<u32> {
    let Some(mut stats) = world.get_component::<WeaponRuntimeStats>(weapon).cloned() else {
        return Err(CombatError::NotAWeapon(weapon));
    };
    let config = world
        .try_service::<WeaponDatabase>()
        .and_then(|db| db.get(&stats.weapon_id))
        .ok_or_else(|| CombatError::UnknownWeapon(stats.weapon_id.clone()))?;

    let level = upgrade(&mut stats, config)?;
    tracing::info!(%weapon, weapon_id = %stats.weapon_id, level, "weapon upgraded");
    world.set_component(weapon, stats);
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_weapons() -> CombatResult<World> {
        let mut world = World::new();
        world.register_service(WeaponDatabase::builtin()?);
        Ok(world)
    }

    #[test]
    fn test_equip_creates_weapon_entity() -> CombatResult<()> {
        let mut world = world_with_weapons()?;
        let player = world.create_entity();

        let wand = equip_weapon(&mut world, player, "magic_wand")?;
        let stats = world.get_component::<WeaponRuntimeStats>(wand);
        assert_eq!(stats.map(|s| s.level), Some(1));
        assert_eq!(stats.map(|s| s.owner), Some(player));
        assert_eq!(world.get_component::<Owner>(wand), Some(&Owner(player)));
        assert!(world.has_component::<WeaponTimer>(wand));
        Ok(())
    }

    #[test]
    fn test_equip_errors() -> CombatResult<()> {
        let mut world = world_with_weapons()?;
        let player = world.create_entity();

        assert_eq!(
            equip_weapon(&mut world, player, "laser"),
            Err(CombatError::UnknownWeapon("laser".into()))
        );
        equip_weapon(&mut world, player, "magic_wand")?;
        assert_eq!(
            equip_weapon(&mut world, player, "magic_wand"),
            Err(CombatError::DuplicateWeapon("magic_wand".into()))
        );
        let ghost = EntityId::from_raw(500);
        assert_eq!(
            equip_weapon(&mut world, ghost, "magic_wand"),
            Err(CombatError::NotLive(ghost))
        );
        Ok(())
    }

    #[test]
    fn test_upgrade_weapon_until_max() -> CombatResult<()> {
        let mut world = world_with_weapons()?;
        let player = world.create_entity();
        let wand = equip_weapon(&mut world, player, "magic_wand")?;

        let max = world
            .try_service::<WeaponDatabase>()
            .and_then(|db| db.get("magic_wand"))
            .map_or(0, |c| c.max_level);
        for expected in 2..=max {
            assert_eq!(upgrade_weapon(&mut world, wand)?, expected);
        }
        let before = world.get_component::<WeaponRuntimeStats>(wand).cloned();
        assert!(matches!(
            upgrade_weapon(&mut world, wand),
            Err(CombatError::MaxLevelReached { .. })
        ));
        assert_eq!(world.get_component::<WeaponRuntimeStats>(wand).cloned(), before);
        Ok(())
    }

    #[test]
    fn test_upgrade_non_weapon() {
        let mut world = World::new();
        let rock = world.create_entity();
        assert_eq!(upgrade_weapon(&mut world, rock), Err(CombatError::NotAWeapon(rock)));
    }
}
