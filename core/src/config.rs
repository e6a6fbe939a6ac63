//! Balance and layout configuration consumed by the world and systems.
//!
//! Every struct deserializes with `#[serde(default)]`, so a configuration file
//! only needs to mention the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted grid side.
///
/// A route search on an empty grid expands at most the rectangle spanned by
/// its endpoints, so every layout on a grid this size stays within the
/// planner's expansion budget.
pub const MAX_GRID_SIZE: u32 = 100;

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid in cells.
    pub grid_size: u32,
    /// Money held by the defender when a game starts.
    pub initial_money: u32,
    /// Lives held by the defender when a game starts.
    pub initial_lives: u32,
    /// Speed of every projectile in cells per second.
    pub projectile_speed: f32,
    /// Wave sizing and cadence.
    pub wave: WaveConfig,
    /// Enemy statistics.
    pub enemy: EnemyConfig,
    /// Start and end placement rules.
    pub layout: LayoutConfig,
    /// Behaviour applied to an enemy whose reroute fails.
    pub reroute_failure: RerouteFailurePolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_money: 100,
            initial_lives: 20,
            projectile_speed: 10.0,
            wave: WaveConfig::default(),
            enemy: EnemyConfig::default(),
            layout: LayoutConfig::default(),
            reroute_failure: RerouteFailurePolicy::default(),
        }
    }
}

impl GameConfig {
    /// Checks the configuration for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.layout.ring == EndpointRing::Inner && self.grid_size < 4 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        ensure_positive("projectile_speed", self.projectile_speed)?;
        ensure_positive("enemy.base_speed", self.enemy.base_speed)?;
        ensure_positive("enemy.base_hp", self.enemy.base_hp)?;
        ensure_positive("wave.min_spawn_interval", self.wave.min_spawn_interval)?;
        ensure_non_negative("wave.base_spawn_interval", self.wave.base_spawn_interval)?;
        ensure_non_negative("wave.spawn_interval_decrease", self.wave.spawn_interval_decrease)?;
        ensure_non_negative("enemy.hp_growth_per_wave", self.enemy.hp_growth_per_wave)?;
        ensure_non_negative("wave.elite_hp_per_dps", self.wave.elite_hp_per_dps)?;
        if !(0.0..=1.0).contains(&self.wave.elite_chance) {
            return Err(ConfigError::ProbabilityOutOfRange(self.wave.elite_chance));
        }
        if self.layout.max_resample_attempts == 0 {
            return Err(ConfigError::NoResampleAttempts);
        }
        Ok(())
    }
}

fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Wave sizing, cadence and elite upgrade parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Enemies spawned before the per-wave increase is added.
    pub base_enemies: u32,
    /// Extra enemies added per wave index.
    pub enemies_per_wave: u32,
    /// Seconds between spawns before the per-wave decrease.
    pub base_spawn_interval: f32,
    /// Lower bound on the seconds between spawns.
    pub min_spawn_interval: f32,
    /// Seconds removed from the interval per wave index.
    pub spawn_interval_decrease: f32,
    /// Probability that a spawn is upgraded to an elite.
    pub elite_chance: f32,
    /// Extra hit points granted to an elite per point of deployed DPS.
    pub elite_hp_per_dps: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_enemies: 10,
            enemies_per_wave: 2,
            base_spawn_interval: 1.0,
            min_spawn_interval: 0.2,
            spawn_interval_decrease: 0.05,
            elite_chance: 0.2,
            elite_hp_per_dps: 4.0,
        }
    }
}

impl WaveConfig {
    /// Number of enemies spawned by the wave with the provided index.
    #[must_use]
    pub fn enemy_count(&self, wave: u32) -> u32 {
        self.base_enemies
            .saturating_add(wave.saturating_mul(self.enemies_per_wave))
    }

    /// Delay between consecutive spawns of the wave with the provided index.
    #[must_use]
    pub fn spawn_interval(&self, wave: u32) -> Duration {
        let seconds = (self.base_spawn_interval - wave as f32 * self.spawn_interval_decrease)
            .max(self.min_spawn_interval);
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
    }
}

/// Enemy statistics shared by every wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Hit points before wave scaling.
    pub base_hp: f32,
    /// Fractional hit point growth per wave index.
    pub hp_growth_per_wave: f32,
    /// Unslowed speed in cells per second.
    pub base_speed: f32,
    /// Money granted when a projectile kills an enemy.
    pub kill_reward: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_hp: 100.0,
            hp_growth_per_wave: 0.2,
            base_speed: 2.0,
            kill_reward: 10,
        }
    }
}

impl EnemyConfig {
    /// Hit points of a regular enemy in the wave with the provided index.
    #[must_use]
    pub fn hp_for_wave(&self, wave: u32) -> f32 {
        self.base_hp * (1.0 + wave as f32 * self.hp_growth_per_wave)
    }
}

/// Ring of cells eligible to hold the start and end markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRing {
    /// Cells one step in from the border.
    #[default]
    Inner,
    /// Cells on the border itself.
    Border,
}

/// Rules for choosing the start and end cells of a new layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Ring the endpoints are drawn from.
    pub ring: EndpointRing,
    /// Minimum Manhattan distance between start and end.
    pub min_separation: u32,
    /// Number of end candidates drawn before falling back to the farthest one.
    pub max_resample_attempts: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ring: EndpointRing::Inner,
            min_separation: 10,
            max_resample_attempts: 256,
        }
    }
}

/// Behaviour applied to an enemy that cannot be rerouted after a grid change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteFailurePolicy {
    /// The enemy keeps walking its previous route.
    #[default]
    KeepRoute,
    /// The enemy stops until a later reroute succeeds.
    Freeze,
}

/// Reasons a [`GameConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot fit distinct start and end cells.
    #[error("grid size {0} is too small")]
    GridTooSmall(u32),
    /// The grid is wider than [`MAX_GRID_SIZE`].
    #[error("grid size {0} exceeds the maximum of {MAX_GRID_SIZE}")]
    GridTooLarge(u32),
    /// A value that must be strictly positive was not.
    #[error("`{field}` must be positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A value that must not be negative was.
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// The elite probability does not lie in `0..=1`.
    #[error("elite chance {0} is not a probability")]
    ProbabilityOutOfRange(f32),
    /// Endpoint selection would never draw a candidate.
    #[error("layout.max_resample_attempts must be at least 1")]
    NoResampleAttempts,
}
