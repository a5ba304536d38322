#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides which towers fire this frame.
//!
//! A tower fires only when its cooldown has fully elapsed, its lock resolves
//! to a living enemy still in range, and its facing angle sits within the
//! alignment threshold of that enemy's current bearing.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use rampart_core::{Command, EnemyView, Event, TowerView};

/// Angular error below which a tower counts as aligned with its target.
const ALIGNMENT_THRESHOLD: f32 = 0.05;

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat;

impl TowerCombat {
    /// Creates a new tower combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::FireProjectile` entries for aligned, ready towers.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return;
        }

        for tower in towers.iter() {
            if tower.cooldown > 0.0 {
                continue;
            }
            let Some(target) = tower.target else {
                continue;
            };
            let Some(enemy) = enemies.get(target) else {
                continue;
            };
            if !enemy.alive {
                continue;
            }

            let delta = enemy.position - tower.position;
            if delta.length() > tower.range {
                continue;
            }

            let desired = delta.y.atan2(delta.x);
            let error = wrap_angle(desired - tower.angle);
            if error.abs() < ALIGNMENT_THRESHOLD {
                out.push(Command::FireProjectile { tower: tower.id });
            }
        }
    }
}

/// Wraps an angle difference into `[-PI, PI)`.
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
