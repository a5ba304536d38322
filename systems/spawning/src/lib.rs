#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave controller that sequences enemy spawns.
//!
//! Each wave fills an ordered queue of `(kind, health)` entries sized by the
//! built-in progression formula. The queue drains one entry per spawn
//! interval; once the queue is empty and the field is clear, a cooldown runs
//! and the next wave is queued. All randomness (spawn jitter, late-wave type
//! mixing) flows through a seedable generator so runs replay exactly.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use rampart_core::{Command, EnemyKind, EnemyView, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Enemies in wave `n`: `WAVE_BASE_COUNT + n`.
const WAVE_BASE_COUNT: u32 = 3;
/// Shared health in wave `n`: `HEALTH_BASE + n * HEALTH_SCALE`.
const HEALTH_BASE: f32 = 50.0;
const HEALTH_SCALE: f32 = 10.0;
/// Spawn positions are jittered by up to this much on each axis.
const SPAWN_JITTER: f32 = 8.0;
/// Brute share for waves four and five.
const MIDGAME_BRUTE_WEIGHT: f64 = 0.7;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    wave_cooldown: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration with explicit timers and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, wave_cooldown: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            wave_cooldown,
            rng_seed,
        }
    }

    /// Standard cadence: one spawn per second, three seconds between waves.
    #[must_use]
    pub const fn standard(rng_seed: u64) -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3), rng_seed)
    }
}

/// Pure system that emits wave and spawn commands from time events.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    wave_cooldown: Duration,
    rng: ChaCha8Rng,
    started: bool,
    wave: u32,
    queue: VecDeque<(EnemyKind, f32)>,
    spawn_timer: Duration,
    cooldown: Option<Duration>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            wave_cooldown: config.wave_cooldown,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            started: false,
            wave: 0,
            queue: VecDeque::new(),
            spawn_timer: Duration::ZERO,
            cooldown: None,
        }
    }

    /// Consumes events and the enemy view to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::GameStarted => {
                    self.started = true;
                    self.wave = 0;
                    self.queue = self.compose_wave(0);
                    self.spawn_timer = Duration::ZERO;
                    self.cooldown = None;
                    out.push(Command::StartWave { wave: 0 });
                }
                Event::TimeAdvanced { dt } => {
                    elapsed = elapsed.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if !self.started || elapsed.is_zero() {
            return;
        }

        if let Some(remaining) = self.cooldown {
            if let Some(left) = remaining.checked_sub(elapsed) {
                self.cooldown = Some(left);
                if !left.is_zero() {
                    return;
                }
            }
            // Cooldown expired: queue the next wave.
            self.cooldown = None;
            self.wave += 1;
            self.queue = self.compose_wave(self.wave);
            self.spawn_timer = Duration::ZERO;
            out.push(Command::StartWave { wave: self.wave });
            return;
        }

        if !self.queue.is_empty() {
            self.spawn_timer = self.spawn_timer.saturating_add(elapsed);
            while self.spawn_timer >= self.spawn_interval {
                self.spawn_timer -= self.spawn_interval;
                let Some((kind, health)) = self.queue.pop_front() else {
                    break;
                };
                let offset = Vec2::new(self.next_jitter(), self.next_jitter());
                out.push(Command::SpawnEnemy {
                    kind,
                    health,
                    offset,
                });
            }
            return;
        }

        if enemies.live_count() == 0 {
            self.cooldown = Some(self.wave_cooldown);
        }
    }

    fn compose_wave(&mut self, wave: u32) -> VecDeque<(EnemyKind, f32)> {
        let count = WAVE_BASE_COUNT + wave;
        let health = HEALTH_BASE + wave as f32 * HEALTH_SCALE;

        let mut queue = VecDeque::with_capacity(count as usize);
        for _ in 0..count {
            let kind = match wave {
                0..=2 => EnemyKind::Raider,
                3 => EnemyKind::Brute,
                4..=5 => {
                    if self.rng.gen::<f64>() < MIDGAME_BRUTE_WEIGHT {
                        EnemyKind::Brute
                    } else {
                        EnemyKind::Raider
                    }
                }
                _ => {
                    if self.rng.gen::<f64>() < 0.5 {
                        EnemyKind::Brute
                    } else {
                        EnemyKind::Raider
                    }
                }
            };
            queue.push_back((kind, health));
        }
        queue
    }

    fn next_jitter(&mut self) -> f32 {
        self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> Spawning {
        Spawning::new(Config::standard(7))
    }

    #[test]
    fn wave_sizes_follow_the_progression_formula() {
        let mut spawning = system();
        assert_eq!(spawning.compose_wave(0).len(), 3);
        assert_eq!(spawning.compose_wave(2).len(), 5);
        assert_eq!(spawning.compose_wave(9).len(), 12);
    }

    #[test]
    fn wave_health_scales_linearly() {
        let mut spawning = system();
        let queue = spawning.compose_wave(4);
        assert!(queue.iter().all(|(_, health)| (*health - 90.0).abs() < f32::EPSILON));
    }

    #[test]
    fn early_waves_are_all_raiders_and_wave_three_all_brutes() {
        let mut spawning = system();
        for wave in 0..=2 {
            assert!(spawning
                .compose_wave(wave)
                .iter()
                .all(|(kind, _)| *kind == EnemyKind::Raider));
        }
        assert!(spawning
            .compose_wave(3)
            .iter()
            .all(|(kind, _)| *kind == EnemyKind::Brute));
    }

    #[test]
    fn late_waves_mix_both_kinds() {
        let mut spawning = system();
        let mut saw_raider = false;
        let mut saw_brute = false;
        // Large waves make both draws overwhelmingly likely.
        for wave in 6..12 {
            for (kind, _) in spawning.compose_wave(wave) {
                match kind {
                    EnemyKind::Raider => saw_raider = true,
                    EnemyKind::Brute => saw_brute = true,
                }
            }
        }
        assert!(saw_raider && saw_brute);
    }

    #[test]
    fn nothing_happens_before_game_start() {
        let mut spawning = system();
        let mut out = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(5),
            }],
            &EnemyView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
