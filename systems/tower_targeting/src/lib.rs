#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that maintains tower target locks and facing angles.
//!
//! Locks behave like weak references: a lock whose enemy died or left range
//! is dropped on the spot and the tower immediately scans for a replacement.
//! Acquisition picks the nearest living enemy strictly within range; ties
//! keep the first candidate in enemy-identifier order, which matches the
//! world's registry insertion order.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use glam::Vec2;
use rampart_core::{Command, EnemyId, EnemyView, Event, TowerSnapshot, TowerView};

/// Tower targeting system.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes events and immutable views to emit aim commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
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

        for tower in towers.iter() {
            let lock = validate_lock(tower, enemies).or_else(|| acquire_target(tower, enemies));

            match lock {
                Some(target) => {
                    let target_position = enemies
                        .get(target)
                        .map(|enemy| enemy.position)
                        .unwrap_or(tower.position);
                    let angle = rotate_toward(tower, target_position, dt);
                    out.push(Command::AimTower {
                        tower: tower.id,
                        target: Some(target),
                        angle,
                    });
                }
                None => {
                    if tower.target.is_some() {
                        // Drop the stale lock; the facing angle holds still.
                        out.push(Command::AimTower {
                            tower: tower.id,
                            target: None,
                            angle: tower.angle,
                        });
                    }
                }
            }
        }
    }
}

fn validate_lock(tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    let target = tower.target?;
    let enemy = enemies.get(target)?;
    if enemy.alive && enemy.position.distance(tower.position) <= tower.range {
        Some(target)
    } else {
        None
    }
}

fn acquire_target(tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    let mut best: Option<EnemyId> = None;
    let mut best_distance = tower.range;
    for enemy in enemies.iter() {
        if !enemy.alive {
            continue;
        }
        let distance = enemy.position.distance(tower.position);
        if distance <= tower.range && distance < best_distance {
            best = Some(enemy.id);
            best_distance = distance;
        }
    }
    best
}

fn rotate_toward(tower: &TowerSnapshot, target_position: Vec2, dt: f32) -> f32 {
    let delta = target_position - tower.position;
    let desired = delta.y.atan2(delta.x);
    let diff = wrap_angle(desired - tower.angle);
    let max_step = tower.kind.stats().rotation_speed * dt;
    tower.angle + diff.clamp(-max_step, max_step)
}

/// Wraps an angle difference into `[-PI, PI)`.
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{EnemyKind, EnemySnapshot, TileCoord, TowerId, TowerKind};

    fn tower_at(position: Vec2, target: Option<EnemyId>, angle: f32) -> TowerSnapshot {
        let stats = TowerKind::Sniper.stats();
        TowerSnapshot {
            id: TowerId::new(1),
            kind: TowerKind::Sniper,
            position,
            tile: TileCoord::new(0, 0),
            range: stats.range,
            damage: stats.damage,
            fire_rate: stats.fire_rate,
            cooldown: 0.0,
            angle,
            level: 1,
            target,
        }
    }

    fn enemy_at(id: u32, position: Vec2, alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Raider,
            position,
            tile: TileCoord::new(0, 0),
            health: 50.0,
            alive,
            speed: EnemyKind::Raider.speed(),
            radius: EnemyKind::Raider.radius(),
            next_waypoint: None,
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }]
    }

    #[test]
    fn wrap_angle_stays_in_half_open_range() {
        assert!((wrap_angle(0.0)).abs() < f32::EPSILON);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-TAU - 0.5) + 0.5).abs() < 1e-5);
        assert!((wrap_angle(PI + 0.1) + PI - 0.1).abs() < 1e-5);
    }

    #[test]
    fn nearest_enemy_is_acquired_with_first_found_tie_break() {
        let tower = tower_at(Vec2::ZERO, None, 0.0);
        let towers = TowerView::from_snapshots(vec![tower]);
        // Two enemies at identical distance: the smaller id wins; a third is
        // nearer but dead.
        let enemies = EnemyView::from_snapshots(vec![
            enemy_at(5, Vec2::new(100.0, 0.0), true),
            enemy_at(2, Vec2::new(0.0, 100.0), true),
            enemy_at(1, Vec2::new(10.0, 0.0), false),
        ]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&tick(), &towers, &enemies, &mut out);

        match out.as_slice() {
            [Command::AimTower { target, .. }] => assert_eq!(*target, Some(EnemyId::new(2))),
            other => panic!("expected one aim command, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_enemies_are_ignored() {
        let tower = tower_at(Vec2::ZERO, None, 0.0);
        let towers = TowerView::from_snapshots(vec![tower]);
        let enemies = EnemyView::from_snapshots(vec![enemy_at(1, Vec2::new(400.0, 0.0), true)]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&tick(), &towers, &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn dead_locks_are_dropped_and_replaced() {
        let tower = tower_at(Vec2::ZERO, Some(EnemyId::new(1)), 0.0);
        let towers = TowerView::from_snapshots(vec![tower]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy_at(1, Vec2::new(50.0, 0.0), false),
            enemy_at(2, Vec2::new(120.0, 0.0), true),
        ]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&tick(), &towers, &enemies, &mut out);

        match out.as_slice() {
            [Command::AimTower { target, .. }] => assert_eq!(*target, Some(EnemyId::new(2))),
            other => panic!("expected reacquisition, got {other:?}"),
        }
    }

    #[test]
    fn stale_locks_clear_when_no_replacement_exists() {
        let tower = tower_at(Vec2::ZERO, Some(EnemyId::new(1)), 1.25);
        let towers = TowerView::from_snapshots(vec![tower]);
        let enemies = EnemyView::from_snapshots(vec![enemy_at(1, Vec2::new(50.0, 0.0), false)]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&tick(), &towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::AimTower {
                tower: TowerId::new(1),
                target: None,
                angle: 1.25,
            }]
        );
    }

    #[test]
    fn rotation_is_bounded_by_the_angular_rate() {
        // Target sits straight up (+PI/2) while the tower faces +x.
        let tower = tower_at(Vec2::ZERO, None, 0.0);
        let towers = TowerView::from_snapshots(vec![tower]);
        let enemies = EnemyView::from_snapshots(vec![enemy_at(1, Vec2::new(0.0, 100.0), true)]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&tick(), &towers, &enemies, &mut out);

        match out.as_slice() {
            [Command::AimTower { angle, .. }] => {
                let max_step = TowerKind::Sniper.stats().rotation_speed * 0.1;
                assert!((*angle - max_step).abs() < 1e-5, "angle {angle} step {max_step}");
            }
            other => panic!("expected one aim command, got {other:?}"),
        }
    }

    #[test]
    fn no_time_advance_means_no_commands() {
        let tower = tower_at(Vec2::ZERO, None, 0.0);
        let towers = TowerView::from_snapshots(vec![tower]);
        let enemies = EnemyView::from_snapshots(vec![enemy_at(1, Vec2::new(50.0, 0.0), true)]);
        let mut out = Vec::new();

        TowerTargeting::new().handle(&[], &towers, &enemies, &mut out);

        assert!(out.is_empty());
    }
}
