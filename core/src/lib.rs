#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Siege Grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Observers never touch live state; they
//! read owned snapshots such as [`EnemyView`] and [`TowerView`] between ticks.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod towers;

pub use config::{
    ConfigError, EnemyConfig, EndpointRing, GameConfig, LayoutConfig, RerouteFailurePolicy,
    WaveConfig, MAX_GRID_SIZE,
};
pub use towers::{PlacementError, ProjectilePayload, TowerKind, TowerStats, WeaponStats};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Siege Grid.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances enemies and tower cooldowns by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the grid at the start cell.
    SpawnEnemy {
        /// Hit points assigned to the enemy, already scaled for the wave.
        hp: f32,
        /// Marks the enemy as an elite upgrade.
        elite: bool,
    },
    /// Requests that a ready tower launch a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy tracked by the projectile.
        target: EnemyId,
    },
    /// Advances every in-flight projectile by the provided delta time.
    AdvanceProjectiles {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a structure at the provided cell.
    PlaceTower {
        /// Type of structure to construct.
        kind: TowerKind,
        /// Cell the structure will occupy.
        cell: CellCoord,
    },
    /// Requests removal of whatever structure occupies the provided cell.
    RemoveStructure {
        /// Cell to clear.
        cell: CellCoord,
    },
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the wave scheduler started spawning a wave.
    WaveStarted {
        /// One-based index of the wave.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
    },
    /// Announces that every enemy of a wave was spawned and resolved.
    WaveCompleted {
        /// One-based index of the wave that finished.
        wave: u32,
    },
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Starting hit points.
        hp: f32,
        /// Whether the enemy was upgraded to an elite.
        elite: bool,
    },
    /// Reports that an enemy walked off the end of its route.
    EnemyReachedEnd {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
        /// Lives left after the deduction.
        lives_remaining: u32,
    },
    /// Reports that a projectile impact killed its target.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Money granted for the kill.
        reward: u32,
    },
    /// Reports that an enemy could not be rerouted after a grid change.
    EnemyRerouteFailed {
        /// Identifier of the enemy that kept (or froze on) its previous route.
        enemy: EnemyId,
    },
    /// Confirms that a tower fired.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that launched it.
        tower: TowerId,
        /// Enemy it tracks.
        target: EnemyId,
    },
    /// Confirms that a structure was placed.
    TowerPlaced {
        /// Identifier assigned to the structure.
        tower: TowerId,
        /// Type of structure that was placed.
        kind: TowerKind,
        /// Occupied cell.
        cell: CellCoord,
    },
    /// Reports that a placement request was refused.
    TowerPlacementRejected {
        /// Type of structure requested.
        kind: TowerKind,
        /// Requested cell.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a structure was removed and refunded.
    StructureRemoved {
        /// Identifier of the removed structure.
        tower: TowerId,
        /// Type of the removed structure.
        kind: TowerKind,
        /// Cell that became walkable again.
        cell: CellCoord,
        /// Money returned to the defender.
        refund: u32,
    },
    /// Announces that the canonical start-to-end route was replaced.
    RouteChanged {
        /// Number of cells in the new route, endpoints included.
        length: usize,
    },
    /// Announces that the defender ran out of lives.
    DefenderDefeated,
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

/// Unique identifier assigned to a tower or wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
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

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Continuous position of the cell, with x along columns and y along rows.
    #[must_use]
    pub fn to_point(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Rounds a continuous position to the nearest cell inside a square grid.
    ///
    /// Coordinates are clamped to `0..side` so an entity hovering past the
    /// border still resolves to a valid cell. Returns `None` for an empty grid
    /// or a non-finite position.
    #[must_use]
    pub fn nearest_to(point: Vec2, side: u32) -> Option<Self> {
        if side == 0 || !point.is_finite() {
            return None;
        }

        let max = (side - 1) as f32;
        let column = point.x.round().clamp(0.0, max) as u32;
        let row = point.y.round().clamp(0.0, max) as u32;
        Some(Self::new(column, row))
    }
}

/// Immutable representation of a single grid cell used for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Coordinate of the cell.
    pub cell: CellCoord,
    /// Indicates whether the cell blocks movement.
    pub is_wall: bool,
    /// Indicates whether enemies spawn here.
    pub is_start: bool,
    /// Indicates whether enemies leave the grid here.
    pub is_end: bool,
    /// Indicates whether the committed route passes through the cell.
    pub is_path: bool,
    /// Structure occupying the cell, if any.
    pub occupant: Option<TowerId>,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Continuous position measured in cells.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points the enemy spawned with.
    pub max_hp: f32,
    /// Current speed in cells per second.
    pub speed: f32,
    /// Indicates whether a slow effect is active.
    pub is_slowed: bool,
    /// Indicates whether the enemy is an elite upgrade.
    pub is_elite: bool,
    /// Indicates whether the enemy is halted after a failed reroute.
    pub frozen: bool,
    /// Index of the route node the enemy is walking toward.
    pub target_index: usize,
}

/// Read-only snapshot describing all live enemies in collection order.
///
/// Collection order is the spawn order and drives first-in-range targeting,
/// so unlike [`TowerView`] the snapshots are never re-sorted.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from snapshots already in collection order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
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
    /// Kind of structure that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the structure.
    pub cell: CellCoord,
    /// Targeting radius in cells, zero for weaponless structures.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Seconds accumulated since the last shot.
    pub last_fired: f32,
    /// Purchase price.
    pub cost: u32,
}

impl TowerSnapshot {
    /// Reports whether the accumulated cooldown allows another shot.
    #[must_use]
    pub fn ready_to_fire(&self) -> bool {
        self.fire_rate > 0.0 && self.last_fired >= 1.0 / self.fire_rate
    }
}

/// Read-only snapshot describing all towers placed within the grid.
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

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Total damage per second of every deployed weapon.
    #[must_use]
    pub fn deployed_dps(&self) -> f32 {
        self.snapshots
            .iter()
            .map(|tower| tower.damage * tower.fire_rate)
            .sum()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Continuous position measured in cells.
    pub position: Vec2,
    /// Enemy tracked by the projectile.
    pub target: EnemyId,
    /// Kind of tower that fired the projectile.
    pub kind: TowerKind,
    /// Indicates the projectile already resolved and awaits removal.
    pub spent: bool,
}

/// Read-only view into the dense wall matrix of a square grid.
#[derive(Clone, Copy, Debug)]
pub struct WallView<'a> {
    walls: &'a [bool],
    side: u32,
}

impl<'a> WallView<'a> {
    /// Captures a new wall view backed by the provided row-major slice.
    #[must_use]
    pub fn new(walls: &'a [bool], side: u32) -> Self {
        Self { walls, side }
    }

    /// Side length of the underlying square grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.side && cell.row() < self.side
    }

    /// Reports whether the cell blocks movement. Cells outside the grid block.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(true)
    }

    /// Dense row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.side).ok()?;
        Some(row * width + column)
    }
}
