//! Static tower stat table and placement failure reasons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Types of structures that can be constructed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Single-target tower with long range and heavy shots.
    Primary,
    /// Single-target tower whose hits slow the enemy down.
    Slow,
    /// Tower whose shots damage every enemy around the impact.
    Area,
    /// Weaponless blocking structure used to shape the maze.
    Wall,
}

impl TowerKind {
    /// Every constructible structure, in menu order.
    pub const ALL: [TowerKind; 4] = [Self::Primary, Self::Slow, Self::Area, Self::Wall];

    /// Static balance record for the structure.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Primary => TowerStats {
                cost: 50,
                weapon: Some(WeaponStats {
                    range: 5.0,
                    damage: 20.0,
                    fire_rate: 0.5,
                    payload: ProjectilePayload::Single,
                }),
            },
            Self::Slow => TowerStats {
                cost: 100,
                weapon: Some(WeaponStats {
                    range: 4.0,
                    damage: 5.0,
                    fire_rate: 1.0,
                    payload: ProjectilePayload::Slow {
                        factor: 0.6,
                        duration: 1.5,
                    },
                }),
            },
            Self::Area => TowerStats {
                cost: 150,
                weapon: Some(WeaponStats {
                    range: 3.0,
                    damage: 15.0,
                    fire_rate: 1.5,
                    payload: ProjectilePayload::Splash { radius: 2.5 },
                }),
            },
            Self::Wall => TowerStats {
                cost: 10,
                weapon: None,
            },
        }
    }

    /// Purchase price of the structure.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.stats().cost
    }

    /// Money returned when the structure is removed, `floor(cost * 0.5)`.
    #[must_use]
    pub const fn refund(self) -> u32 {
        self.cost() / 2
    }

    /// Lower-case name used by adapters and configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Slow => "slow",
            Self::Area => "area",
            Self::Wall => "wall",
        }
    }

    /// Parses the lower-case name produced by [`TowerKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// Balance record attached to a [`TowerKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Purchase price.
    pub cost: u32,
    /// Weapon carried by the structure, absent for plain walls.
    pub weapon: Option<WeaponStats>,
}

/// Firing parameters of an armed structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponStats {
    /// Targeting radius measured in cells.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Shots per second; the cooldown between shots is `1 / fire_rate`.
    pub fire_rate: f32,
    /// Variant-specific impact behaviour.
    pub payload: ProjectilePayload,
}

impl WeaponStats {
    /// Sustained damage per second of a single structure.
    #[must_use]
    pub fn damage_per_second(&self) -> f32 {
        self.damage * self.fire_rate
    }
}

/// Impact behaviour carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectilePayload {
    /// Damages the tracked enemy only.
    Single,
    /// Damages every enemy within `radius` cells of the tracked enemy.
    Splash {
        /// Blast radius in cells.
        radius: f32,
    },
    /// Damages the tracked enemy and scales its speed for a while.
    Slow {
        /// Multiplier applied to the enemy's base speed.
        factor: f32,
        /// Seconds the slow lasts.
        duration: f32,
    },
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The requested cell already holds a structure.
    #[error("cell is already occupied")]
    Occupied,
    /// The requested cell is the start or end of the route.
    #[error("cannot build on the start or end cell")]
    ReservedCell,
    /// The defender cannot pay for the structure.
    #[error("not enough money (need {required}, have {available})")]
    InsufficientFunds {
        /// Price of the structure.
        required: u32,
        /// Money held by the defender.
        available: u32,
    },
    /// The structure would leave enemies without a route.
    #[error("cannot block the path")]
    BlocksPath,
    /// The defender has already lost.
    #[error("the game is over")]
    GameOver,
}
