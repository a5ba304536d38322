#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod map;

use std::borrow::Cow;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use map::{MapParseError, TileCoord, TileKind, TileMap};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active tile map, clearing all actors and overlays.
    LoadMap {
        /// Map that becomes the authoritative grid.
        map: TileMap,
    },
    /// Resets money, health, wave progress, and actors to initial values.
    StartGame,
    /// Freezes or resumes per-frame advancement.
    SetPaused {
        /// Desired pause state.
        paused: bool,
    },
    /// Records the tower kind the player is currently placing, if any.
    SelectTower {
        /// Kind chosen for placement, or `None` to cancel placement mode.
        kind: Option<TowerKind>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records that a new wave has begun.
    StartWave {
        /// Zero-based index of the wave that is starting.
        wave: u32,
    },
    /// Requests that an enemy be instantiated at the spawn tile.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Starting health assigned by the wave controller.
        health: f32,
        /// Positional jitter added to the spawn tile center.
        offset: Vec2,
    },
    /// Assigns an explicit waypoint path that overrides gradient steering.
    SetEnemyPath {
        /// Enemy receiving the path.
        enemy: EnemyId,
        /// Waypoints consumed in order.
        waypoints: Vec<Vec2>,
    },
    /// Moves an enemy to a new continuous position.
    MoveEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Position after this frame's steering step.
        position: Vec2,
    },
    /// Snaps an enemy to a tile center and adopts that tile as current.
    ArriveEnemy {
        /// Enemy that arrived.
        enemy: EnemyId,
        /// Tile whose center the enemy reached.
        tile: TileCoord,
    },
    /// Advances an enemy's manual path to the next waypoint.
    AdvanceWaypoint {
        /// Enemy whose waypoint index moves forward.
        enemy: EnemyId,
    },
    /// Updates a tower's target lock and facing angle for this frame.
    AimTower {
        /// Tower being aimed.
        tower: TowerId,
        /// Enemy the tower is locked onto, or `None` when no target exists.
        target: Option<EnemyId>,
        /// Facing angle in radians after the bounded rotation step.
        angle: f32,
    },
    /// Attempts a transactional tower placement at a world position.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// World position that will be quantized to a tile.
        position: Vec2,
    },
    /// Upgrades an existing tower's combat statistics.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Requests that a ready tower emit its projectile(s).
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
    },
    /// Moves a projectile to a new position along its flight line.
    MoveProjectile {
        /// Projectile being advanced.
        projectile: ProjectileId,
        /// Position after this frame's flight step.
        position: Vec2,
    },
    /// Resolves a projectile hit against an enemy.
    StrikeEnemy {
        /// Projectile that connected.
        projectile: ProjectileId,
        /// Enemy absorbing the hit.
        enemy: EnemyId,
    },
    /// Retires a projectile that left the world bounds.
    ExpireProjectile {
        /// Projectile to retire.
        projectile: ProjectileId,
    },
    /// Removes dead actors and applies their economic and health effects.
    Reap,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new tile map became authoritative.
    MapLoaded {
        /// Number of tile columns in the loaded map.
        columns: u32,
        /// Number of tile rows in the loaded map.
        rows: u32,
    },
    /// Confirms that the game state was reset to initial values.
    GameStarted,
    /// Announces a change to the pause flag.
    PausedChanged {
        /// Pause state after the change.
        paused: bool,
    },
    /// Announces a change to the tower kind selected for placement.
    TowerSelected {
        /// Selected kind, or `None` when placement mode was cancelled.
        kind: Option<TowerKind>,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: u32,
    },
    /// Confirms that an enemy was created at the spawn tile.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Continuous position the enemy occupies after spawning.
        position: Vec2,
    },
    /// Reports that an enemy occupied the base tile and was removed there.
    EnemyReachedBase {
        /// Enemy that reached the base.
        enemy: EnemyId,
    },
    /// Reports that an enemy died from accumulated damage.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Tile the enemy occupied when it died.
        tile: TileCoord,
    },
    /// Confirms that a tower was placed and its tile blocked.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower that was placed.
        kind: TowerKind,
        /// Tile now occupied by the tower.
        tile: TileCoord,
    },
    /// Reports that a tower placement request was refused.
    TowerPlacementRejected {
        /// Kind of tower requested for placement.
        kind: TowerKind,
        /// World position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower's statistics were upgraded.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level after the upgrade.
        level: u32,
    },
    /// Confirms that a projectile was emitted by a tower.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired it.
        tower: TowerId,
        /// Kind of projectile in flight.
        kind: ProjectileKind,
    },
    /// Announces the player's money balance after a change.
    MoneyChanged {
        /// Balance after the change.
        money: u32,
    },
    /// Announces the player's health after a change.
    HealthChanged {
        /// Health after the change.
        health: i32,
    },
    /// Reports that player health dropped to zero and gameplay halted.
    GameOver,
}

/// Reasons a tower placement request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The player cannot afford the requested tower kind.
    InsufficientFunds,
    /// The requested position lies outside the tile grid.
    OutOfBounds,
    /// The target tile carries a non-open terrain code.
    Reserved,
    /// The target tile is already blocked by a tower.
    Occupied,
    /// The target tile lies inside the ban zone around the spawn or base.
    NearSpawnOrBase,
    /// Blocking the tile would disconnect the spawn from the base.
    SeversPath,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy archetypes spawned by the wave controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast, lightly armored attacker fielded from the first wave.
    Raider,
    /// Slow, heavily built attacker introduced in later waves.
    Brute,
}

impl EnemyKind {
    /// Movement speed in world units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Raider => 80.0,
            Self::Brute => 60.0,
        }
    }

    /// Logical collision radius in world units.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::Raider => 12.0,
            Self::Brute => 14.0,
        }
    }
}

/// Projectile archetypes, distinguished by collision footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Small round fired by the freezing tower.
    Standard,
    /// Explosive round fired by the cannon tower.
    Fire,
    /// Oversized slug fired by the sniper tower.
    Sniper,
}

impl ProjectileKind {
    /// Collision radius added to the enemy radius during hit tests.
    #[must_use]
    pub const fn collision_radius(self) -> f32 {
        match self {
            Self::Standard => 3.0,
            Self::Fire => 5.0,
            Self::Sniper => 6.0,
        }
    }
}

/// Slow-aura parameters declared by the freezing tower.
///
/// The aura is recorded for presentation but deliberately never applied to
/// enemy speed; the simulation treats it as inert data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowAura {
    /// Fraction of normal speed an affected enemy would move at.
    pub factor: f32,
    /// Radius of the aura around the tower in world units.
    pub radius: f32,
}

/// Splash-damage parameters declared by the cannon tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplashStats {
    /// Radius around the explosion center that receives splash damage.
    pub radius: f32,
    /// Fraction of the tower's base damage dealt to splashed enemies.
    pub damage_factor: f32,
    /// Distance from the target position to the explosion center, measured
    /// along the firing direction.
    pub center_offset: f32,
}

/// Combat statistics carried by a tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Targeting range in world units.
    pub range: f32,
    /// Damage applied per projectile hit.
    pub damage: f32,
    /// Shots per second once aligned.
    pub fire_rate: f32,
    /// Maximum rotation rate in radians per second.
    pub rotation_speed: f32,
    /// Flight speed of emitted projectiles in world units per second.
    pub projectile_speed: f32,
    /// Kind of projectile the tower emits.
    pub projectile_kind: ProjectileKind,
    /// Inert slow aura declared by the kind, if any.
    pub slow_aura: Option<SlowAura>,
    /// Splash behavior applied on fire, if any.
    pub splash: Option<SplashStats>,
}

/// Types of towers the player can place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Long-range single-target tower with the highest damage per shot.
    Sniper,
    /// Fast-firing low-damage tower carrying the inert slow aura.
    Freezing,
    /// Splash-damage tower that re-acquires its target on every shot.
    Cannon,
}

impl TowerKind {
    /// Placement cost in money units.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Sniper => 75,
            Self::Freezing => 50,
            Self::Cannon => 100,
        }
    }

    /// Base combat statistics applied when a tower of this kind is placed.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Sniper => TowerStats {
                range: 250.0,
                damage: 40.0,
                fire_rate: 0.8,
                rotation_speed: std::f32::consts::PI,
                projectile_speed: 500.0,
                projectile_kind: ProjectileKind::Sniper,
                slow_aura: None,
                splash: None,
            },
            Self::Freezing => TowerStats {
                range: 200.0,
                damage: 5.0,
                fire_rate: 2.0,
                rotation_speed: std::f32::consts::PI,
                projectile_speed: 300.0,
                projectile_kind: ProjectileKind::Standard,
                slow_aura: Some(SlowAura {
                    factor: 0.5,
                    radius: 200.0,
                }),
                splash: None,
            },
            Self::Cannon => TowerStats {
                range: 180.0,
                damage: 25.0,
                fire_rate: 0.6,
                rotation_speed: std::f32::consts::PI,
                projectile_speed: 250.0,
                projectile_kind: ProjectileKind::Fire,
                slow_aura: None,
                splash: Some(SplashStats {
                    radius: 120.0,
                    damage_factor: 0.7,
                    center_offset: 100.0,
                }),
            },
        }
    }

    /// Resolves a kind from the numeric selection index used by adapters.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Sniper),
            1 => Some(Self::Freezing),
            2 => Some(Self::Cannon),
            _ => None,
        }
    }

    /// Numeric selection index exposed to adapters.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Sniper => 0,
            Self::Freezing => 1,
            Self::Cannon => 2,
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Continuous world position.
    pub position: Vec2,
    /// Tile the enemy currently claims.
    pub tile: TileCoord,
    /// Remaining health.
    pub health: f32,
    /// Whether the enemy still participates in the simulation.
    pub alive: bool,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Logical collision radius in world units.
    pub radius: f32,
    /// Next waypoint of an explicit manual path, if one is set.
    pub next_waypoint: Option<Vec2>,
}

/// Read-only snapshot describing all enemies in the world.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a specific enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.snapshots.iter().filter(|enemy| enemy.alive).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Fixed world position at the center of the tower's tile.
    pub position: Vec2,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// Current targeting range, including upgrades.
    pub range: f32,
    /// Current damage per hit, including upgrades.
    pub damage: f32,
    /// Current shots per second, including upgrades.
    pub fire_rate: f32,
    /// Seconds until the tower may fire again; zero when ready.
    pub cooldown: f32,
    /// Facing angle in radians.
    pub angle: f32,
    /// Upgrade level, starting at 1.
    pub level: u32,
    /// Enemy the tower is locked onto, if the lock is still live.
    pub target: Option<EnemyId>,
}

/// Read-only snapshot describing all towers in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Kind of projectile in flight.
    pub kind: ProjectileKind,
    /// Continuous world position.
    pub position: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    /// Flight speed in world units per second.
    pub speed: f32,
    /// Damage applied to the first enemy hit.
    pub damage: f32,
    /// Whether the projectile is still in flight.
    pub alive: bool,
}

/// Read-only snapshot describing all projectiles in the world.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Read-only view of the distance-to-base navigation field.
///
/// Distances are hop counts toward the base tile; `-1` marks unreachable
/// tiles, which is also returned for out-of-bounds lookups.
#[derive(Clone, Debug)]
pub struct NavigationView<'a> {
    distances: Cow<'a, [i32]>,
    columns: u32,
    rows: u32,
}

impl<'a> NavigationView<'a> {
    /// Captures a view borrowing the provided row-major distance slice.
    #[must_use]
    pub fn new(distances: &'a [i32], columns: u32, rows: u32) -> Self {
        Self {
            distances: Cow::Borrowed(distances),
            columns,
            rows,
        }
    }

    /// Builds a view that owns its distances, useful for tests.
    #[must_use]
    pub fn from_owned(distances: Vec<i32>, columns: u32, rows: u32) -> NavigationView<'static> {
        NavigationView {
            distances: Cow::Owned(distances),
            columns,
            rows,
        }
    }

    /// Distance recorded for the provided tile, `-1` when unreachable or
    /// outside the field.
    #[must_use]
    pub fn distance(&self, tile: TileCoord) -> i32 {
        if tile.column() >= self.columns || tile.row() >= self.rows {
            return -1;
        }

        let index = tile.row() as usize * self.columns as usize + tile.column() as usize;
        self.distances.get(index).copied().unwrap_or(-1)
    }

    /// Reports whether any tile in the field is reachable.
    #[must_use]
    pub fn any_reachable(&self) -> bool {
        self.distances.iter().any(|&distance| distance >= 0)
    }

    /// Dense row-major distances backing the view.
    #[must_use]
    pub fn cells(&self) -> &[i32] {
        &self.distances
    }

    /// Dimensions of the field in tiles.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tower_kind_indices_round_trip() {
        for kind in [TowerKind::Sniper, TowerKind::Freezing, TowerKind::Cannon] {
            assert_eq!(TowerKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(TowerKind::from_index(3), None);
    }

    #[test]
    fn cannon_is_the_only_kind_with_splash() {
        assert!(TowerKind::Cannon.stats().splash.is_some());
        assert!(TowerKind::Sniper.stats().splash.is_none());
        assert!(TowerKind::Freezing.stats().splash.is_none());
    }

    #[test]
    fn freezing_declares_an_inert_slow_aura() {
        let aura = TowerKind::Freezing
            .stats()
            .slow_aura
            .expect("freezing towers declare a slow aura");
        assert!((aura.factor - 0.5).abs() < f32::EPSILON);
        assert!((aura.radius - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn enemy_view_sorts_and_counts_live_enemies() {
        let make = |id: u32, alive: bool| EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Raider,
            position: Vec2::ZERO,
            tile: TileCoord::new(0, 0),
            health: 50.0,
            alive,
            speed: EnemyKind::Raider.speed(),
            radius: EnemyKind::Raider.radius(),
            next_waypoint: None,
        };

        let view = EnemyView::from_snapshots(vec![make(3, true), make(1, false), make(2, true)]);
        let ids: Vec<u32> = view.iter().map(|enemy| enemy.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(view.live_count(), 2);
        assert!(view.get(EnemyId::new(2)).is_some());
        assert!(view.get(EnemyId::new(9)).is_none());
    }

    #[test]
    fn navigation_view_reports_sentinel_outside_bounds() {
        let view = NavigationView::from_owned(vec![0, 1, 2, -1], 2, 2);
        assert_eq!(view.distance(TileCoord::new(0, 0)), 0);
        assert_eq!(view.distance(TileCoord::new(1, 1)), -1);
        assert_eq!(view.distance(TileCoord::new(5, 0)), -1);
        assert!(view.any_reachable());
    }
}
