#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic game session that drives the world with the pure systems.
//!
//! [`Simulation`] owns the world, the wave scheduler, the targeting system and
//! a seeded random generator. Every tick runs the same fixed order: the
//! scheduler may release an enemy, enemies advance, ready towers fire and
//! projectiles resolve. Callers interact through placement, removal, wave
//! and frame methods and read owned snapshots in between.

mod clock;

use std::time::Duration;

use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use siege_grid_core::{
    CellCoord, CellSnapshot, Command, ConfigError, EnemySnapshot, Event, GameConfig,
    PlacementError, ProjectileSnapshot, TowerId, TowerKind, TowerSnapshot,
};
use siege_grid_system_spawning::{WavePhase, WaveScheduler};
use siege_grid_system_tower_targeting::TowerTargeting;
use siege_grid_world::{self as world, query, Endpoints, LayoutError, World};
use thiserror::Error;
use tracing::info;

pub use clock::SimulationClock;

/// Most events retained between calls to [`Simulation::drain_events`].
///
/// Callers that never drain keep only the newest events.
pub const EVENT_LOG_CAPACITY: usize = 4_096;

/// Reasons a simulation cannot be constructed.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Start and end could not be placed on the grid.
    #[error("cannot lay out the grid: {0}")]
    Layout(#[from] LayoutError),
}

/// A single game session.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    rng: ChaCha8Rng,
    clock: SimulationClock,
    running: bool,
    paused: bool,
    game_over: bool,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a session whose endpoints are drawn with the seeded generator.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = World::new(config.clone(), &mut rng)?;
        Ok(Self::assemble(config, world, rng))
    }

    /// Creates a session with explicit start and end cells.
    pub fn with_endpoints(
        config: GameConfig,
        seed: u64,
        start: CellCoord,
        end: CellCoord,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let world = World::with_endpoints(config.clone(), start, end)?;
        Ok(Self::assemble(config, world, ChaCha8Rng::seed_from_u64(seed)))
    }

    fn assemble(config: GameConfig, world: World, rng: ChaCha8Rng) -> Self {
        Self {
            scheduler: WaveScheduler::new(config.wave.clone(), config.enemy.clone()),
            config,
            world,
            targeting: TowerTargeting::new(),
            rng,
            clock: SimulationClock::new(),
            running: false,
            paused: false,
            game_over: false,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Discards the session and starts over with a fresh layout.
    pub fn reset(&mut self, seed: u64) -> Result<(), SimulationError> {
        *self = Self::new(self.config.clone(), seed)?;
        Ok(())
    }

    /// Starts the current wave and marks the session as running.
    ///
    /// Returns `false` without side effects when a wave is already active or
    /// the game is over.
    pub fn begin_wave(&mut self) -> bool {
        if self.game_over || !self.scheduler.begin_wave(&mut self.events) {
            return false;
        }
        self.running = true;
        self.clock.reset();
        true
    }

    /// Pauses or resumes ticking.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.clock.reset();
    }

    /// Places a structure, spending its cost.
    pub fn attempt_placement(
        &mut self,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<TowerId, PlacementError> {
        if self.game_over {
            return Err(PlacementError::GameOver);
        }

        let result = world::place(&mut self.world, kind, cell, &mut self.events);
        self.trim_events();
        result
    }

    /// Removes the structure on the cell and returns the refund, if any.
    pub fn attempt_removal(&mut self, cell: CellCoord) -> Option<u32> {
        let refund = world::remove(&mut self.world, cell, &mut self.events);
        self.trim_events();
        refund
    }

    /// Converts a display-refresh timestamp into a tick.
    pub fn frame(&mut self, timestamp_ms: f64) {
        if !self.is_ticking() {
            self.clock.reset();
            return;
        }
        if let Some(delta_seconds) = self.clock.advance(timestamp_ms) {
            self.tick(delta_seconds);
        }
    }

    /// Advances the session by `delta_seconds`.
    ///
    /// Does nothing before the first wave, while paused, after game over, or
    /// for negative and non-finite steps.
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.is_ticking() {
            return;
        }
        let Ok(dt) = Duration::try_from_secs_f32(delta_seconds) else {
            return;
        };

        self.commands.clear();
        self.scheduler.handle(
            dt,
            query::alive_enemies(&self.world),
            query::deployed_dps(&self.world),
            &mut self.rng,
            &mut self.commands,
            &mut self.events,
        );
        self.commands.push(Command::Tick { dt });
        self.flush_commands();

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.commands.push(Command::AdvanceProjectiles { dt });
        self.flush_commands();

        if query::lives(&self.world) == 0 {
            info!(wave = self.scheduler.wave(), "game over");
            self.game_over = true;
            self.running = false;
        }
        self.trim_events();
    }

    fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(EVENT_LOG_CAPACITY);
        if excess > 0 {
            let _ = self.events.drain(..excess);
        }
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn is_ticking(&self) -> bool {
        self.running && !self.paused && !self.game_over
    }

    /// Takes the events recorded since the previous call, oldest first.
    ///
    /// At most [`EVENT_LOG_CAPACITY`] events are kept; older ones are dropped.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reports whether the defender ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Reports whether a wave was started since the last reset.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Reports whether ticking is suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// One-based index of the current (or next) wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.scheduler.wave()
    }

    /// Lifecycle phase of the current wave.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.scheduler.phase()
    }

    /// Money held by the defender.
    #[must_use]
    pub fn money(&self) -> u32 {
        query::money(&self.world)
    }

    /// Lives held by the defender.
    #[must_use]
    pub fn lives(&self) -> u32 {
        query::lives(&self.world)
    }

    /// Side length of the square grid.
    #[must_use]
    pub fn grid_size(&self) -> u32 {
        query::grid(&self.world).side()
    }

    /// Start and end cells of the layout.
    #[must_use]
    pub fn endpoints(&self) -> Option<Endpoints> {
        query::endpoints(&self.world)
    }

    /// Snapshot of every grid cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> Vec<CellSnapshot> {
        query::cells(&self.world)
    }

    /// Snapshots of the live enemies in collection order.
    #[must_use]
    pub fn enemies(&self) -> Vec<EnemySnapshot> {
        query::enemy_view(&self.world).into_vec()
    }

    /// Snapshots of every placed structure in identifier order.
    #[must_use]
    pub fn towers(&self) -> Vec<TowerSnapshot> {
        query::tower_view(&self.world).into_vec()
    }

    /// Snapshots of every projectile still held by the world.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    /// Committed start-to-end route.
    #[must_use]
    pub fn route(&self) -> &[CellCoord] {
        query::route(&self.world)
    }
}
