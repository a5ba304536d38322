#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers enemies toward the base.
//!
//! Enemies with an explicit waypoint path consume it waypoint by waypoint;
//! everyone else descends the navigation distance field one tile at a time.

use std::time::Duration;

use glam::Vec2;
use rampart_core::{
    Command, EnemySnapshot, EnemyView, Event, NavigationView, TileCoord, TileKind, TileMap,
};

/// Distance at which a manual waypoint counts as reached.
const WAYPOINT_RADIUS: f32 = 2.0;
/// Distance at which a tile center counts as reached.
const ARRIVAL_RADIUS: f32 = 1.0;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes events and immutable views to emit movement commands.
    ///
    /// `is_tile_blocked` mirrors the world's tower-blocked overlay so the
    /// gradient step never routes through a tower tile.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        navigation: &NavigationView<'_>,
        map: &TileMap,
        is_tile_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(TileCoord) -> bool,
    {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }
        if elapsed.is_zero() {
            return;
        }
        let dt = elapsed.as_secs_f32();

        let base = map.base_tile();
        let field_live = navigation.any_reachable();

        for enemy in enemies.iter() {
            if !enemy.alive {
                continue;
            }
            // Base occupancy is resolved by the world before any further
            // movement is considered.
            if base == Some(enemy.tile) {
                continue;
            }

            if let Some(waypoint) = enemy.next_waypoint {
                follow_waypoint(enemy, waypoint, dt, out);
                continue;
            }

            if !field_live {
                continue;
            }

            gradient_step(enemy, navigation, map, &is_tile_blocked, dt, out);
        }
    }
}

fn follow_waypoint(enemy: &EnemySnapshot, waypoint: Vec2, dt: f32, out: &mut Vec<Command>) {
    let delta = waypoint - enemy.position;
    let distance = delta.length();
    if distance < WAYPOINT_RADIUS {
        out.push(Command::AdvanceWaypoint { enemy: enemy.id });
        return;
    }
    out.push(Command::MoveEnemy {
        enemy: enemy.id,
        position: enemy.position + delta / distance * enemy.speed * dt,
    });
}

fn gradient_step<F>(
    enemy: &EnemySnapshot,
    navigation: &NavigationView<'_>,
    map: &TileMap,
    is_tile_blocked: &F,
    dt: f32,
    out: &mut Vec<Command>,
) where
    F: Fn(TileCoord) -> bool,
{
    let current = map.tile_at(enemy.position);
    let mut best_tile = current;
    let mut best_distance = navigation.distance(current);

    for neighbor in descent_neighbors(current, map.columns(), map.rows()) {
        if map.tile(neighbor) == Some(TileKind::Obstacle) || is_tile_blocked(neighbor) {
            continue;
        }
        let distance = navigation.distance(neighbor);
        if distance != -1 && (best_distance == -1 || distance < best_distance) {
            best_distance = distance;
            best_tile = neighbor;
        }
    }

    let goal = map.tile_center(best_tile);
    let delta = goal - enemy.position;
    let distance = delta.length();
    if distance > ARRIVAL_RADIUS {
        out.push(Command::MoveEnemy {
            enemy: enemy.id,
            position: enemy.position + delta / distance * enemy.speed * dt,
        });
    } else {
        out.push(Command::ArriveEnemy {
            enemy: enemy.id,
            tile: best_tile,
        });
    }
}

/// Neighbor enumeration order breaks distance ties: +x, -x, +y, -y.
fn descent_neighbors(tile: TileCoord, columns: u32, rows: u32) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if tile.column() + 1 < columns {
        candidates[count] = Some(TileCoord::new(tile.column() + 1, tile.row()));
        count += 1;
    }
    if let Some(column) = tile.column().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(column, tile.row()));
        count += 1;
    }
    if tile.row() + 1 < rows {
        candidates[count] = Some(TileCoord::new(tile.column(), tile.row() + 1));
        count += 1;
    }
    if let Some(row) = tile.row().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(tile.column(), row));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
