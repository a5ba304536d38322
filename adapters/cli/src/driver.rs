//! Frame pipeline that wires the pure systems to the authoritative world.

use std::time::Duration;

use rampart_core::{Command, Event, TileMap};
use rampart_system_movement::Movement;
use rampart_system_projectiles::Projectiles;
use rampart_system_spawning::{Config, Spawning};
use rampart_system_tower_combat::TowerCombat;
use rampart_system_tower_targeting::TowerTargeting;
use rampart_world::{self as world, query, World};

/// Bundles the world with every system and drives them in frame order:
/// tick, spawning, movement, targeting, combat, projectiles, reap.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
}

impl Simulation {
    /// Creates a simulation over the provided map with a seeded spawner.
    pub(crate) fn new(map: TileMap, seed: u64) -> Self {
        Self {
            world: World::with_map(map),
            spawning: Spawning::new(Config::standard(seed)),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(),
        }
    }

    /// Read-only access for queries between frames.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Runs one frame: input commands first, then the fixed pipeline.
    ///
    /// Every stage's commands are applied before the next stage queries the
    /// world, so enemies update before towers, towers before projectiles,
    /// and the reap runs last.
    pub(crate) fn frame(&mut self, dt: Duration, inputs: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        let mut commands = Vec::new();

        for command in inputs {
            world::apply(&mut self.world, command, &mut events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let enemies = query::enemy_view(&self.world);
        self.spawning.handle(&events, &enemies, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        let enemies = query::enemy_view(&self.world);
        let navigation = query::navigation_view(&self.world);
        let map = query::map(&self.world);
        self.movement.handle(
            &events,
            &enemies,
            &navigation,
            map,
            |tile| query::is_tile_blocked(&self.world, tile),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&events, &towers, &enemies, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.combat.handle(&events, &towers, &enemies, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        let in_flight = query::projectile_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.projectiles
            .handle(&events, &in_flight, &enemies, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        world::apply(&mut self.world, Command::Reap, &mut events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rampart_core::{TileCoord, TowerKind};

    const FRAME: Duration = Duration::from_millis(20);

    fn demo_map() -> TileMap {
        TileMap::parse(crate::DEMO_MAP, 48.0).expect("demo map parses")
    }

    #[test]
    fn a_defended_run_spawns_waves_and_stays_consistent() {
        let mut simulation = Simulation::new(demo_map(), 7);
        let tower_position = query::map(simulation.world()).tile_center(TileCoord::new(5, 2));
        let mut events = simulation.frame(
            FRAME,
            vec![
                Command::StartGame,
                Command::PlaceTower {
                    kind: TowerKind::Cannon,
                    position: tower_position,
                },
            ],
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::GameStarted)));

        let mut saw_spawn = false;
        let mut saw_shot = false;
        for _ in 0..600 {
            events = simulation.frame(FRAME, Vec::new());
            for event in &events {
                match event {
                    Event::EnemySpawned { .. } => saw_spawn = true,
                    Event::ProjectileFired { .. } => saw_shot = true,
                    _ => {}
                }
            }
        }

        assert!(saw_spawn, "waves never spawned an enemy");
        assert!(saw_shot, "the cannon never fired");
        let world = simulation.world();
        assert!(query::health(world) <= 10);
        assert!(query::money(world) >= 100, "placement debited once only");
    }

    #[test]
    fn pausing_freezes_the_whole_pipeline() {
        let mut simulation = Simulation::new(demo_map(), 7);
        let _ = simulation.frame(FRAME, vec![Command::StartGame]);
        let _ = simulation.frame(FRAME, vec![Command::SetPaused { paused: true }]);

        for _ in 0..100 {
            let events = simulation.frame(FRAME, Vec::new());
            assert!(events.is_empty(), "paused frames must stay silent");
        }
        assert_eq!(query::live_enemy_count(simulation.world()), 0);
    }
}
