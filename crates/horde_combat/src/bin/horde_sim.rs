//! # HORDE Headless Simulation
//!
//! Runs the default schedule against a player and a ring of hostiles and
//! logs a summary.
//!
//! ```text
//! horde_sim [simulation.toml] [weapons.toml]
//! ```
//!
//! Both files are optional; built-in defaults are used when omitted.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;

use horde_combat::{
    equip_weapon, install_default_systems, spawn_hostile_ring, spawn_player, Attributes,
    CombatResult, ExperienceLedger, Health, HostileTemplate, Position, SharedExperienceSink,
    SimulationConfig, WeaponDatabase, World,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE: f32 = 60.0;
const FRAMES: u64 = 1_800;
const HOSTILES: u32 = 32;
const RING_RADIUS: f32 = 12.0;
const STARTING_WEAPONS: [&str; 2] = ["magic_wand", "king_bible"];

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_configs() -> CombatResult<(SimulationConfig, WeaponDatabase)> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::from_toml_file(&path)?,
        None => SimulationConfig::default(),
    };
    let weapons = match args.next() {
        Some(path) => WeaponDatabase::from_toml_file(&path)?,
        None => WeaponDatabase::builtin()?,
    };
    Ok((config, weapons))
}

fn run() -> CombatResult<()> {
    let (config, weapons) = load_configs()?;
    tracing::info!(weapons = weapons.len(), "configuration loaded");

    let mut world = World::new();
    install_default_systems(&mut world, &config, weapons)?;

    let ledger = ExperienceLedger::default();
    world.register_service::<SharedExperienceSink>(Box::new(ledger.clone()));

    let origin = Position::new(0.0, 0.0);
    let player = spawn_player(&mut world, origin, Attributes::baseline());
    for id in STARTING_WEAPONS {
        equip_weapon(&mut world, player, id)?;
    }
    spawn_hostile_ring(
        &mut world,
        origin,
        RING_RADIUS,
        HOSTILES,
        player,
        &HostileTemplate::default(),
    );

    let dt = 1.0 / TICK_RATE;
    let mut destroyed = 0;
    for _ in 0..FRAMES {
        destroyed += world.update(dt).destroyed;
        if !world.is_alive(player) {
            break;
        }
    }

    let health = world.component_or_default::<Health>(player);
    tracing::info!(
        frames = world.frame(),
        live = world.live_count(),
        created = world.created_count(),
        destroyed,
        player_alive = world.is_alive(player),
        player_health = health.current,
        experience = ledger.total(),
        pickups_collected = ledger.deposits(),
        "simulation finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
