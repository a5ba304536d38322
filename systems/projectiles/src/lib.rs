#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies projectiles and resolves their collisions.
//!
//! Each projectile advances along its fixed direction, then scans living
//! enemies in identifier order; the first enemy within the combined radius
//! absorbs the hit, so a projectile damages at most one enemy. Projectiles
//! that leave the world bounds are retired.

use std::time::Duration;

use glam::Vec2;
use rampart_core::{Command, EnemyView, Event, ProjectileView};

/// World-space bounds beyond which projectiles are discarded.
const WORLD_MIN: f32 = -100.0;
const WORLD_MAX: f32 = 3000.0;

/// Projectile flight and collision system.
#[derive(Debug, Default)]
pub struct Projectiles;

impl Projectiles {
    /// Creates a new projectile system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes events and immutable views to emit flight and hit commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
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

        for projectile in projectiles.iter() {
            if !projectile.alive {
                continue;
            }

            let position = projectile.position + projectile.direction * projectile.speed * dt;
            out.push(Command::MoveProjectile {
                projectile: projectile.id,
                position,
            });

            let reach = projectile.kind.collision_radius();
            let hit = enemies.iter().find(|enemy| {
                enemy.alive && enemy.position.distance(position) <= enemy.radius + reach
            });

            if let Some(enemy) = hit {
                out.push(Command::StrikeEnemy {
                    projectile: projectile.id,
                    enemy: enemy.id,
                });
            } else if out_of_bounds(position) {
                out.push(Command::ExpireProjectile {
                    projectile: projectile.id,
                });
            }
        }
    }
}

fn out_of_bounds(position: Vec2) -> bool {
    position.x < WORLD_MIN
        || position.x > WORLD_MAX
        || position.y < WORLD_MIN
        || position.y > WORLD_MAX
}
