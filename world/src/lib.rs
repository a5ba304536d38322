#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Rampart.
//!
//! The world owns the tile map, the tower-blocked overlay, the navigation
//! distance field, every actor registry, and the player's economy. All
//! mutations flow through [`apply`]; read access flows through [`query`].

mod navigation;

use glam::Vec2;
use rampart_core::{
    Command, EnemyId, EnemyKind, Event, NavigationView, PlacementError, ProjectileId,
    ProjectileKind, TileCoord, TileKind, TileMap, TowerId, TowerKind,
};

use navigation::NavigationField;

const STARTING_MONEY: u32 = 200;
const STARTING_HEALTH: i32 = 10;
const KILL_REWARD: u32 = 10;
/// Towers may not stand within this Chebyshev tile distance of the spawn or
/// base tile.
const PLACEMENT_BAN_RADIUS: u32 = 2;
/// Shots are suppressed when the target sits on top of the muzzle.
const FIRE_EPSILON: f32 = 0.1;

/// Represents the authoritative Rampart world state.
#[derive(Debug)]
pub struct World {
    map: TileMap,
    blocked: BlockedGrid,
    navigation: NavigationField,
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    projectiles: Vec<Projectile>,
    money: u32,
    health: i32,
    wave: u32,
    paused: bool,
    game_over: bool,
    selected_tower: Option<TowerKind>,
    next_enemy_id: u32,
    next_tower_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a new world running the default fallback map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_map(TileMap::fallback())
    }

    /// Creates a new world running the provided map.
    #[must_use]
    pub fn with_map(map: TileMap) -> Self {
        let blocked = BlockedGrid::new(map.columns(), map.rows());
        let mut world = Self {
            map,
            blocked,
            navigation: NavigationField::default(),
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            money: STARTING_MONEY,
            health: STARTING_HEALTH,
            wave: 0,
            paused: false,
            game_over: false,
            selected_tower: None,
            next_enemy_id: 0,
            next_tower_id: 0,
            next_projectile_id: 0,
        };
        world.rebuild_navigation();
        world
    }

    fn rebuild_navigation(&mut self) {
        let blocked = &self.blocked;
        self.navigation
            .rebuild(&self.map, |tile| blocked.is_blocked(tile));
    }

    fn reset_session(&mut self) {
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.blocked.clear();
        self.money = STARTING_MONEY;
        self.health = STARTING_HEALTH;
        self.wave = 0;
        self.paused = false;
        self.game_over = false;
        self.rebuild_navigation();
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|entry| entry.id == enemy)
    }

    fn live_enemy_position(&self, enemy: EnemyId) -> Option<Vec2> {
        self.enemies
            .iter()
            .find(|entry| entry.id == enemy && entry.alive)
            .map(|entry| entry.position)
    }

    /// Nearest living enemy strictly inside `range` of `origin`, scanning the
    /// registry in insertion order so distance ties keep the first candidate.
    fn nearest_enemy_in_range(&self, origin: Vec2, range: f32) -> Option<EnemyId> {
        let mut best: Option<EnemyId> = None;
        let mut best_distance = range;
        for enemy in &self.enemies {
            if !enemy.alive {
                continue;
            }
            let distance = enemy.position.distance(origin);
            if distance <= range && distance < best_distance {
                best = Some(enemy.id);
                best_distance = distance;
            }
        }
        best
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMap { map } => {
            world.blocked = BlockedGrid::new(map.columns(), map.rows());
            world.map = map;
            world.enemies.clear();
            world.towers.clear();
            world.projectiles.clear();
            world.rebuild_navigation();
            out_events.push(Event::MapLoaded {
                columns: world.map.columns(),
                rows: world.map.rows(),
            });
        }
        Command::StartGame => {
            world.reset_session();
            out_events.push(Event::GameStarted);
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PausedChanged { paused });
            }
        }
        Command::SelectTower { kind } => {
            if world.selected_tower != kind {
                world.selected_tower = kind;
                out_events.push(Event::TowerSelected { kind });
            }
        }
        Command::Tick { dt } => {
            if world.paused || world.game_over {
                return;
            }
            let seconds = dt.as_secs_f32();
            for tower in &mut world.towers {
                tower.cooldown = (tower.cooldown - seconds).max(0.0);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StartWave { wave } => {
            world.wave = wave;
            out_events.push(Event::WaveStarted { wave });
        }
        Command::SpawnEnemy {
            kind,
            health,
            offset,
        } => {
            spawn_enemy(world, kind, health, offset, out_events);
        }
        Command::SetEnemyPath { enemy, waypoints } => {
            if let Some(entry) = world.enemy_mut(enemy) {
                entry.path = waypoints;
                entry.path_index = 0;
            }
        }
        Command::MoveEnemy { enemy, position } => {
            if let Some(entry) = world.enemy_mut(enemy) {
                if entry.alive {
                    entry.position = position;
                }
            }
        }
        Command::ArriveEnemy { enemy, tile } => {
            arrive_enemy(world, enemy, tile, out_events);
        }
        Command::AdvanceWaypoint { enemy } => {
            if let Some(entry) = world.enemy_mut(enemy) {
                if entry.alive && entry.path_index < entry.path.len() {
                    entry.path_index += 1;
                }
            }
        }
        Command::AimTower {
            tower,
            target,
            angle,
        } => {
            let resolved = target.filter(|id| {
                world
                    .enemies
                    .iter()
                    .any(|enemy| enemy.id == *id && enemy.alive)
            });
            if let Some(entry) = world.towers.iter_mut().find(|entry| entry.id == tower) {
                entry.target = resolved;
                entry.angle = angle;
            }
        }
        Command::PlaceTower { kind, position } => {
            place_tower(world, kind, position, out_events);
        }
        Command::UpgradeTower { tower } => {
            if let Some(entry) = world.towers.iter_mut().find(|entry| entry.id == tower) {
                entry.level += 1;
                entry.damage *= 1.4;
                entry.range += 20.0;
                entry.fire_rate += 0.2;
                out_events.push(Event::TowerUpgraded {
                    tower,
                    level: entry.level,
                });
            }
        }
        Command::FireProjectile { tower } => {
            fire_tower(world, tower, out_events);
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(entry) = world
                .projectiles
                .iter_mut()
                .find(|entry| entry.id == projectile)
            {
                if entry.alive {
                    entry.position = position;
                }
            }
        }
        Command::StrikeEnemy { projectile, enemy } => {
            let Some(entry) = world
                .projectiles
                .iter_mut()
                .find(|entry| entry.id == projectile)
            else {
                return;
            };
            if !entry.alive {
                return;
            }
            entry.alive = false;
            let damage = entry.damage;
            damage_enemy(world, enemy, damage, out_events);
        }
        Command::ExpireProjectile { projectile } => {
            if let Some(entry) = world
                .projectiles
                .iter_mut()
                .find(|entry| entry.id == projectile)
            {
                entry.alive = false;
            }
        }
        Command::Reap => {
            reap(world, out_events);
        }
    }
}

fn spawn_enemy(
    world: &mut World,
    kind: EnemyKind,
    health: f32,
    offset: Vec2,
    out_events: &mut Vec<Event>,
) {
    let spawn_tile = world.map.spawn_tile().unwrap_or_else(|| {
        // Classic fallback when the map forgot its spawn marker.
        TileCoord::new(0, world.map.rows().saturating_sub(1).min(6))
    });
    let position = world.map.tile_center(spawn_tile) + offset;
    let tile = world.map.tile_at(position);
    let id = world.allocate_enemy_id();
    world.enemies.push(Enemy {
        id,
        kind,
        position,
        tile,
        health,
        alive: true,
        path: Vec::new(),
        path_index: 0,
    });
    out_events.push(Event::EnemySpawned {
        enemy: id,
        kind,
        position,
    });
}

fn arrive_enemy(world: &mut World, enemy: EnemyId, tile: TileCoord, out_events: &mut Vec<Event>) {
    let center = world.map.tile_center(tile);
    let base = world.map.base_tile();
    let Some(entry) = world.enemy_mut(enemy) else {
        return;
    };
    if !entry.alive {
        return;
    }
    entry.tile = tile;
    entry.position = center;
    if base == Some(tile) {
        entry.alive = false;
        out_events.push(Event::EnemyReachedBase { enemy });
    }
}

fn damage_enemy(world: &mut World, enemy: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
    let Some(entry) = world.enemy_mut(enemy) else {
        return;
    };
    if !entry.alive {
        return;
    }
    entry.health -= amount;
    if entry.health <= 0.0 {
        entry.alive = false;
        out_events.push(Event::EnemyKilled {
            enemy,
            tile: entry.tile,
        });
    }
}

fn place_tower(world: &mut World, kind: TowerKind, position: Vec2, out_events: &mut Vec<Event>) {
    let reject = |reason: PlacementError, out_events: &mut Vec<Event>| {
        out_events.push(Event::TowerPlacementRejected {
            kind,
            position,
            reason,
        });
    };

    let Some(tile) = world.map.tile_at_checked(position) else {
        reject(PlacementError::OutOfBounds, out_events);
        return;
    };

    let cost = kind.cost();
    if world.money < cost {
        reject(PlacementError::InsufficientFunds, out_events);
        return;
    }
    if world.map.tile(tile) != Some(TileKind::Open) {
        reject(PlacementError::Reserved, out_events);
        return;
    }
    if world.blocked.is_blocked(tile) {
        reject(PlacementError::Occupied, out_events);
        return;
    }
    let near_landmark = [world.map.spawn_tile(), world.map.base_tile()]
        .into_iter()
        .flatten()
        .any(|landmark| tile.chebyshev_distance(landmark) < PLACEMENT_BAN_RADIUS);
    if near_landmark {
        reject(PlacementError::NearSpawnOrBase, out_events);
        return;
    }

    // Speculative commit: debit and block, then prove the path survives.
    world.money -= cost;
    world.blocked.set(tile, true);
    world.rebuild_navigation();

    let severed = world
        .map
        .spawn_tile()
        .is_some_and(|spawn| world.navigation.distance(spawn) < 0);
    if severed {
        world.blocked.set(tile, false);
        world.money += cost;
        world.rebuild_navigation();
        reject(PlacementError::SeversPath, out_events);
        return;
    }

    let stats = kind.stats();
    let id = world.allocate_tower_id();
    world.towers.push(Tower {
        id,
        kind,
        position: world.map.tile_center(tile),
        tile,
        range: stats.range,
        damage: stats.damage,
        fire_rate: stats.fire_rate,
        cooldown: 0.0,
        angle: 0.0,
        level: 1,
        target: None,
    });
    out_events.push(Event::TowerPlaced { tower: id, kind, tile });
    out_events.push(Event::MoneyChanged {
        money: world.money,
    });
}

fn fire_tower(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let Some(index) = world.towers.iter().position(|entry| entry.id == tower) else {
        return;
    };
    let (kind, origin, range, damage, cooldown, fire_rate, target) = {
        let entry = &world.towers[index];
        (
            entry.kind,
            entry.position,
            entry.range,
            entry.damage,
            entry.cooldown,
            entry.fire_rate,
            entry.target,
        )
    };
    if cooldown > 0.0 {
        return;
    }

    let stats = kind.stats();
    // Splash towers re-acquire independently on every shot; the others fire
    // at the locked target.
    let aim = if stats.splash.is_some() {
        world
            .nearest_enemy_in_range(origin, range)
            .and_then(|id| world.live_enemy_position(id))
    } else {
        target.and_then(|id| world.live_enemy_position(id))
    };
    let Some(target_position) = aim else {
        return;
    };

    let delta = target_position - origin;
    let distance = delta.length();
    if distance <= FIRE_EPSILON {
        return;
    }
    let direction = delta / distance;

    let projectile = world.allocate_projectile_id();
    world.projectiles.push(Projectile {
        id: projectile,
        kind: stats.projectile_kind,
        position: origin,
        direction,
        speed: stats.projectile_speed,
        damage,
        alive: true,
    });
    out_events.push(Event::ProjectileFired {
        projectile,
        tower,
        kind: stats.projectile_kind,
    });

    if let Some(splash) = stats.splash {
        let center = target_position + direction * splash.center_offset;
        let splash_damage = damage * splash.damage_factor;
        let victims: Vec<EnemyId> = world
            .enemies
            .iter()
            .filter(|enemy| enemy.alive && enemy.position.distance(center) <= splash.radius)
            .map(|enemy| enemy.id)
            .collect();
        for victim in victims {
            damage_enemy(world, victim, splash_damage, out_events);
        }
    }

    world.towers[index].cooldown = 1.0 / fire_rate;
}

fn reap(world: &mut World, out_events: &mut Vec<Event>) {
    let base = world.map.base_tile();
    let mut rewards = 0u32;
    let mut breaches = 0i32;
    world.enemies.retain(|enemy| {
        if enemy.alive {
            return true;
        }
        if base == Some(enemy.tile) {
            breaches += 1;
        } else {
            rewards += 1;
        }
        false
    });

    if rewards > 0 {
        world.money = world.money.saturating_add(rewards * KILL_REWARD);
        out_events.push(Event::MoneyChanged {
            money: world.money,
        });
    }
    if breaches > 0 {
        world.health -= breaches;
        out_events.push(Event::HealthChanged {
            health: world.health,
        });
        if world.health <= 0 && !world.game_over {
            world.game_over = true;
            out_events.push(Event::GameOver);
        }
    }

    world.projectiles.retain(|projectile| projectile.alive);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{NavigationView, World};
    use rampart_core::{
        EnemySnapshot, EnemyView, ProjectileSnapshot, ProjectileView, TileCoord, TileMap,
        TowerKind, TowerSnapshot, TowerView,
    };

    /// Provides read-only access to the active tile map.
    #[must_use]
    pub fn map(world: &World) -> &TileMap {
        &world.map
    }

    /// Captures a read-only view of every enemy in the world.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                tile: enemy.tile,
                health: enemy.health,
                alive: enemy.alive,
                speed: enemy.kind.speed(),
                radius: enemy.kind.radius(),
                next_waypoint: enemy.path.get(enemy.path_index).copied(),
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every tower in the world.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                kind: tower.kind,
                position: tower.position,
                tile: tower.tile,
                range: tower.range,
                damage: tower.damage,
                fire_rate: tower.fire_rate,
                cooldown: tower.cooldown,
                angle: tower.angle,
                level: tower.level,
                target: tower.target,
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                kind: projectile.kind,
                position: projectile.position,
                direction: projectile.direction,
                speed: projectile.speed,
                damage: projectile.damage,
                alive: projectile.alive,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Exposes the navigation distance field for steering and debug overlays.
    #[must_use]
    pub fn navigation_view(world: &World) -> NavigationView<'_> {
        NavigationView::new(
            world.navigation.cells(),
            world.map.columns(),
            world.map.rows(),
        )
    }

    /// Reconstructs the tile route from the provided tile to the base.
    #[must_use]
    pub fn route_to_base(world: &World, tile: TileCoord) -> Vec<TileCoord> {
        world.navigation.route_from(tile)
    }

    /// Reports whether a tile is blocked by a placed tower.
    #[must_use]
    pub fn is_tile_blocked(world: &World, tile: TileCoord) -> bool {
        world.blocked.is_blocked(tile)
    }

    /// The player's current money balance.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// The player's remaining health.
    #[must_use]
    pub fn health(world: &World) -> i32 {
        world.health
    }

    /// Zero-based index of the current wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Whether per-frame advancement is currently frozen.
    #[must_use]
    pub fn paused(world: &World) -> bool {
        world.paused
    }

    /// Whether the player has lost and gameplay is halted.
    #[must_use]
    pub fn game_over(world: &World) -> bool {
        world.game_over
    }

    /// Tower kind the player is currently placing, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerKind> {
        world.selected_tower
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.alive).count()
    }

    /// The base tile declared by the map, if any.
    #[must_use]
    pub fn base_tile(world: &World) -> Option<TileCoord> {
        world.map.base_tile()
    }

    /// The spawn tile declared by the map, if any.
    #[must_use]
    pub fn spawn_tile(world: &World) -> Option<TileCoord> {
        world.map.spawn_tile()
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
    tile: TileCoord,
    health: f32,
    alive: bool,
    path: Vec<Vec2>,
    path_index: usize,
}

#[derive(Clone, Debug)]
struct Tower {
    id: TowerId,
    kind: TowerKind,
    position: Vec2,
    tile: TileCoord,
    range: f32,
    damage: f32,
    fire_rate: f32,
    cooldown: f32,
    angle: f32,
    level: u32,
    target: Option<EnemyId>,
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    kind: ProjectileKind,
    position: Vec2,
    direction: Vec2,
    speed: f32,
    damage: f32,
    alive: bool,
}

#[derive(Clone, Debug)]
struct BlockedGrid {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl BlockedGrid {
    fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![false; columns as usize * rows as usize],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(false);
    }

    fn is_blocked(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .map_or(false, |index| self.cells[index])
    }

    fn set(&mut self, tile: TileCoord, blocked: bool) {
        if let Some(index) = self.index(tile) {
            self.cells[index] = blocked;
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            Some((tile.row() * self.columns + tile.column()) as usize)
        } else {
            None
        }
    }
}
