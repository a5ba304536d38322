use std::time::Duration;

use glam::Vec2;
use rampart_core::{Command, EnemyKind, Event, TileCoord, TileMap, TowerKind};
use rampart_system_movement::Movement;
use rampart_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(20);

fn spawn_enemy(world: &mut World, health: f32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind: EnemyKind::Raider,
            health,
            offset: Vec2::ZERO,
        },
        &mut events,
    );
    assert!(
        matches!(events.last(), Some(Event::EnemySpawned { .. })),
        "expected spawn event"
    );
}

fn frame(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    let enemies = query::enemy_view(world);
    let navigation = query::navigation_view(world);
    let map = query::map(world);
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &enemies,
        &navigation,
        map,
        |tile| query::is_tile_blocked(world, tile),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::Reap, &mut events);
    events
}

#[test]
fn corridor_enemy_reaches_base_and_costs_a_life() {
    let map = TileMap::parse("4 0 0 0 3\n", 48.0).expect("corridor parses");
    let mut world = World::with_map(map);
    let mut movement = Movement::new();
    spawn_enemy(&mut world, 50.0);

    // Four tile hops at speed 80 need 2.4 seconds; allow a little slack for
    // the per-tile snap thresholds.
    let mut reached = false;
    for _ in 0..150 {
        let events = frame(&mut world, &mut movement);
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyReachedBase { .. }))
        {
            reached = true;
        }
        if query::live_enemy_count(&world) == 0 {
            break;
        }
    }

    assert!(reached, "enemy never reached the base");
    assert_eq!(query::live_enemy_count(&world), 0);
    // A breach damages the player and never pays a reward.
    assert_eq!(query::money(&world), 200);
    assert_eq!(query::health(&world), 9);
    assert!(!query::game_over(&world));
}

#[test]
fn enemies_detour_around_a_placed_tower() {
    let text = "\
0 0 0 0 0 0 0
0 0 0 0 0 0 0
0 0 0 0 0 0 0
4 0 0 0 0 0 3
0 0 0 0 0 0 0
0 0 0 0 0 0 0
0 0 0 0 0 0 0
";
    let map = TileMap::parse(text, 48.0).expect("arena parses");
    let mut world = World::with_map(map);
    let mut movement = Movement::new();

    let roadblock = TileCoord::new(3, 3);
    let roadblock_center = query::map(&world).tile_center(roadblock);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Freezing,
            position: roadblock_center,
        },
        &mut events,
    );
    assert!(query::is_tile_blocked(&world, roadblock));

    spawn_enemy(&mut world, 50.0);

    let mut breached = false;
    for _ in 0..400 {
        let _ = frame(&mut world, &mut movement);
        for enemy in query::enemy_view(&world).iter() {
            assert_ne!(enemy.tile, roadblock, "enemy entered the tower tile");
        }
        if query::live_enemy_count(&world) == 0 {
            breached = true;
            break;
        }
    }

    assert!(breached, "enemy never finished the detour");
    assert_eq!(query::health(&world), 9);
}

#[test]
fn baseless_maps_leave_enemies_standing() {
    let map = TileMap::parse("4 0 0 0 0\n", 48.0).expect("baseless map parses");
    let mut world = World::with_map(map);
    let mut movement = Movement::new();
    spawn_enemy(&mut world, 50.0);

    let start = query::enemy_view(&world).into_vec()[0].position;
    for _ in 0..20 {
        let _ = frame(&mut world, &mut movement);
    }
    let position = query::enemy_view(&world).into_vec()[0].position;

    assert_eq!(start, position);
    assert_eq!(query::live_enemy_count(&world), 1);
}

#[test]
fn manual_waypoints_override_gradient_descent() {
    let map = TileMap::parse("4 0 0 0 3\n", 48.0).expect("corridor parses");
    let mut world = World::with_map(map);
    let mut movement = Movement::new();
    spawn_enemy(&mut world, 50.0);

    let enemy = query::enemy_view(&world).into_vec()[0].id;
    let start = query::enemy_view(&world).into_vec()[0].position;
    // Send the enemy backwards along the corridor, away from the base.
    let waypoint = start + Vec2::new(0.0, -20.0);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetEnemyPath {
            enemy,
            waypoints: vec![waypoint],
        },
        &mut events,
    );

    let _ = frame(&mut world, &mut movement);
    let position = query::enemy_view(&world).into_vec()[0].position;
    assert!(
        position.y < start.y,
        "enemy should chase the waypoint, not the base"
    );
}
