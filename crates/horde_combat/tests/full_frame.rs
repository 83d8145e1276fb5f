//! Full-frame scenarios through the default schedule.

use approx::assert_relative_eq;
use horde_combat::{
    equip_weapon, install_default_systems, spawn_hostile, spawn_hostile_ring, spawn_player,
    upgrade_weapon, Attributes, CombatError, CombatResult, EntityId, ExperienceLedger, Health,
    HostileTemplate, Pickup, Position, SharedExperienceSink, SimulationConfig, WeaponDatabase,
    WeaponRuntimeStats, World,
};

const DT: f32 = 1.0 / 60.0;

fn arena() -> CombatResult<(World, ExperienceLedger, EntityId)> {
    let mut world = World::new();
    install_default_systems(&mut world, &SimulationConfig::default(), WeaponDatabase::builtin()?)?;
    let ledger = ExperienceLedger::default();
    world.register_service::<SharedExperienceSink>(Box::new(ledger.clone()));
    let player = spawn_player(&mut world, Position::new(0.0, 0.0), Attributes::baseline());
    Ok((world, ledger, player))
}

fn run(world: &mut World, frames: u32) {
    for _ in 0..frames {
        world.update(DT);
    }
}

#[test]
fn test_kill_drop_collect() -> CombatResult<()> {
    let (mut world, ledger, player) = arena()?;
    equip_weapon(&mut world, player, "magic_wand")?;
    let dummy = HostileTemplate {
        speed: 0.0,
        contact_damage: 0.0,
        experience: 2.0,
        ..HostileTemplate::default()
    };
    let bat = spawn_hostile(&mut world, Position::new(0.8, 0.0), player, &dummy);

    run(&mut world, 2);
    assert!(!world.is_alive(bat));
    assert_eq!(world.storage::<Pickup>().map_or(0, |s| s.len()), 1);

    run(&mut world, 60);
    assert_relative_eq!(ledger.total(), 2.0);
    assert_eq!(ledger.deposits(), 1);
    assert_eq!(world.storage::<Pickup>().map_or(0, |s| s.len()), 0);
    assert!(world.has_service::<SharedExperienceSink>());
    assert!(world.has_service::<WeaponDatabase>());
    Ok(())
}

#[test]
fn test_player_dies_to_repeated_contact() -> CombatResult<()> {
    let (mut world, _ledger, player) = arena()?;
    let brute = HostileTemplate {
        speed: 0.0,
        health: 1_000.0,
        contact_damage: 60.0,
        ..HostileTemplate::default()
    };
    spawn_hostile(&mut world, Position::new(0.5, 0.0), player, &brute);

    world.update(DT);
    assert_relative_eq!(world.component_or_default::<Health>(player).current, 40.0);

    // Invulnerability holds for half a second.
    run(&mut world, 20);
    assert_relative_eq!(world.component_or_default::<Health>(player).current, 40.0);

    run(&mut world, 20);
    assert!(!world.is_alive(player));
    Ok(())
}

#[test]
fn test_upgrade_beyond_max_level_rejected() -> CombatResult<()> {
    let (mut world, _ledger, player) = arena()?;
    let wand = equip_weapon(&mut world, player, "magic_wand")?;

    for expected in 2..=8 {
        assert_eq!(upgrade_weapon(&mut world, wand)?, expected);
    }
    let before = world.get_component::<WeaponRuntimeStats>(wand).cloned();

    let result = upgrade_weapon(&mut world, wand);
    assert!(matches!(result, Err(CombatError::MaxLevelReached { level: 8, .. })));
    assert_eq!(world.get_component::<WeaponRuntimeStats>(wand).cloned(), before);
    Ok(())
}

#[test]
fn test_equip_unknown_weapon() -> CombatResult<()> {
    let (mut world, _ledger, player) = arena()?;
    let result = equip_weapon(&mut world, player, "garlic");
    assert!(matches!(result, Err(CombatError::UnknownWeapon(_))));
    Ok(())
}

fn snapshot(world: &World) -> Vec<(EntityId, Position)> {
    world
        .storage::<Position>()
        .map(|s| s.iter().map(|(id, p)| (id, *p)).collect())
        .unwrap_or_default()
}

fn horde_run() -> CombatResult<(Vec<(EntityId, Position)>, f32, usize)> {
    let (mut world, ledger, player) = arena()?;
    equip_weapon(&mut world, player, "magic_wand")?;
    equip_weapon(&mut world, player, "king_bible")?;
    spawn_hostile_ring(
        &mut world,
        Position::new(0.0, 0.0),
        6.0,
        16,
        player,
        &HostileTemplate::default(),
    );
    run(&mut world, 600);
    Ok((snapshot(&world), ledger.total(), world.live_count()))
}

#[test]
fn test_identical_runs_match() -> CombatResult<()> {
    let first = horde_run()?;
    let second = horde_run()?;
    assert_eq!(first, second);
    Ok(())
}
