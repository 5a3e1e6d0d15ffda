//! Ballsim headless runner
//!
//! Usage: `ballsim [settings.json] [balls] [ticks]`
//!
//! Spawns balls into the arena and advances the simulation at a fixed
//! timestep with no window, logging collision counts as it goes.

use anyhow::{Context, Result};

use ballsim::Settings;
use ballsim::consts::*;
use ballsim::sim::{TickReport, World, tick};

const DEFAULT_BALLS: usize = 200;
const DEFAULT_TICKS: u64 = 1200;
/// Ticks between progress lines
const REPORT_EVERY: u64 = 120;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) if path != "-" => Settings::load(&path)?,
        _ => Settings::default(),
    };
    let balls = args
        .next()
        .map(|s| s.parse::<usize>().with_context(|| format!("invalid ball count: {s}")))
        .transpose()?
        .unwrap_or(DEFAULT_BALLS);
    let ticks = args
        .next()
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid tick count: {s}")))
        .transpose()?
        .unwrap_or(DEFAULT_TICKS);

    log::info!(
        "Ballsim starting: {}x{} arena, {} balls, {} ticks, {} detection",
        settings.width,
        settings.height,
        balls,
        ticks,
        settings.detection.as_str()
    );

    let mut world = World::try_from_settings(&settings)?;
    world.spawn_scattered(balls, BALL_MASS, BALL_RADIUS, BALL_SPAWN_SPEED);

    let mut total = TickReport::default();
    let mut window = TickReport::default();
    for n in 1..=ticks {
        let report = tick(&mut world, SIM_DT);
        // Stand-in for the render frame that would consume the highlight
        world.decay_flashes();
        total += report;
        window += report;

        if n % REPORT_EVERY == 0 {
            log::info!(
                "tick {n}: {} collisions, {} narrow-phase tests, KE {:.1}",
                window.resolved,
                window.candidates_tested,
                world.total_kinetic_energy()
            );
            window = TickReport::default();
        }
    }

    let stats = world.quadtree().stats();
    log::info!(
        "Done: {} collisions over {ticks} ticks ({} tests), momentum {:?}, KE {:.1}",
        total.resolved,
        total.candidates_tested,
        world.total_momentum(),
        world.total_kinetic_energy()
    );
    log::info!("Quadtree: {}", serde_json::to_string(&stats)?);

    Ok(())
}
