#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Rampart simulation.
//!
//! Runs the full frame pipeline without a renderer: load a map (or fall back
//! to the built-in demo level), optionally replay a TOML scenario of
//! placements and upgrades, and trace the resulting events.

mod driver;
mod scenario;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use rampart_core::{Command, Event, TileMap, TowerId, TowerKind};
use rampart_world::query;
use tracing::{info, warn};

use driver::Simulation;
use scenario::Scenario;

/// Edge length used for every tile, in world units.
const TILE_LENGTH: f32 = 48.0;

/// Built-in demo level: spawn on the left edge, base on the right, obstacle
/// clusters forcing a winding lane through the middle.
const DEMO_MAP: &str = "\
0 0 0 0 0 0 0 0 0 0 0 0
0 0 0 0 2 2 0 0 0 0 0 0
0 0 0 0 0 0 0 0 2 0 0 0
0 0 2 0 0 0 0 0 2 0 0 0
4 0 2 0 0 1 1 0 0 0 0 3
0 0 0 0 0 1 1 0 0 0 0 0
0 0 0 0 0 0 0 0 2 0 0 0
0 0 0 2 2 0 0 0 0 0 0 0
0 0 0 0 0 0 0 0 0 0 0 0
";

#[derive(Debug, Parser)]
#[command(name = "rampart", about = "Headless Rampart tower-defense simulation")]
struct Args {
    /// Map file of whitespace-separated tile codes 0-4, one row per line.
    #[arg(long)]
    map: Option<PathBuf>,
    /// TOML scenario scheduling placements and upgrades by frame.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 1800)]
    frames: u32,
    /// Fixed frame delta in milliseconds.
    #[arg(long, default_value_t = 20)]
    dt_ms: u64,
    /// Seed for the wave controller's RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let scenario = load_scenario(args.scenario.as_deref())?;
    let map = load_map(args.map.as_deref());

    let seed = scenario.seed.unwrap_or(args.seed);
    let frames = scenario.frames.unwrap_or(args.frames);
    let dt = Duration::from_millis(scenario.dt_ms.unwrap_or(args.dt_ms));

    info!(
        columns = map.columns(),
        rows = map.rows(),
        frames,
        seed,
        "starting run"
    );

    let mut simulation = Simulation::new(map, seed);
    let mut placed: Vec<TowerId> = Vec::new();

    for frame_index in 0..frames {
        let mut inputs = Vec::new();
        if frame_index == 0 {
            inputs.push(Command::StartGame);
        }
        for placement in scenario
            .placements
            .iter()
            .filter(|placement| placement.frame == frame_index)
        {
            match TowerKind::from_index(placement.tower) {
                Some(kind) => inputs.push(Command::PlaceTower {
                    kind,
                    position: Vec2::new(placement.x, placement.y),
                }),
                None => warn!(tower = placement.tower, "unknown tower selection index"),
            }
        }
        for upgrade in scenario
            .upgrades
            .iter()
            .filter(|upgrade| upgrade.frame == frame_index)
        {
            match placed.get(upgrade.tower_index) {
                Some(&tower) => inputs.push(Command::UpgradeTower { tower }),
                None => warn!(
                    index = upgrade.tower_index,
                    "upgrade references an unplaced tower"
                ),
            }
        }

        let events = simulation.frame(dt, inputs);
        let mut game_over = false;
        for event in &events {
            match event {
                Event::WaveStarted { wave } => info!(wave = *wave, "wave started"),
                Event::TowerPlaced { tower, kind, tile } => {
                    placed.push(*tower);
                    info!(
                        tower = tower.get(),
                        kind = ?kind,
                        column = tile.column(),
                        row = tile.row(),
                        "tower placed"
                    );
                }
                Event::TowerPlacementRejected { kind, reason, .. } => {
                    warn!(kind = ?kind, reason = ?reason, "tower placement rejected");
                }
                Event::TowerUpgraded { tower, level } => {
                    info!(tower = tower.get(), level = *level, "tower upgraded");
                }
                Event::EnemyReachedBase { .. } => {
                    warn!(
                        health = query::health(simulation.world()),
                        "enemy breached the base"
                    );
                }
                Event::GameOver => game_over = true,
                _ => {}
            }
        }
        if game_over {
            info!(frame = frame_index, "game over");
            break;
        }
    }

    let world = simulation.world();
    info!(
        wave = query::wave(world),
        money = query::money(world),
        health = query::health(world),
        enemies = query::live_enemy_count(world),
        game_over = query::game_over(world),
        "run complete"
    );
    Ok(())
}

/// Loads the map file, falling back to a generated grid on any failure.
fn load_map(path: Option<&Path>) -> TileMap {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => match TileMap::parse(&text, TILE_LENGTH) {
                Ok(map) => map,
                Err(error) => {
                    warn!(%error, "map file is malformed, using the fallback grid");
                    TileMap::fallback()
                }
            },
            Err(error) => {
                warn!(%error, "map file is unreadable, using the fallback grid");
                TileMap::fallback()
            }
        },
        None => TileMap::parse(DEMO_MAP, TILE_LENGTH).expect("demo map is well-formed"),
    }
}

/// Loads the scenario file; a missing flag yields the empty scenario.
fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    Scenario::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_map_declares_exactly_one_spawn_and_base() {
        let map = TileMap::parse(DEMO_MAP, TILE_LENGTH).expect("demo map parses");
        assert!(map.spawn_tile().is_some());
        assert!(map.base_tile().is_some());
        let codes: Vec<u8> = map
            .to_text()
            .split_whitespace()
            .map(|token| token.parse().expect("rendered codes are numeric"))
            .collect();
        assert_eq!(codes.iter().filter(|&&code| code == 3).count(), 1);
        assert_eq!(codes.iter().filter(|&&code| code == 4).count(), 1);
    }

    #[test]
    fn missing_map_paths_fall_back_to_the_generated_grid() {
        let map = load_map(Some(Path::new("/definitely/not/a/map.txt")));
        assert_eq!(map.columns(), 16);
        assert_eq!(map.rows(), 12);
    }
}
