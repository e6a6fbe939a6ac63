#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system responsible for emitting enemy spawn commands.

use std::time::Duration;

use rand::Rng;
use siege_grid_core::{Command, EnemyConfig, Event, WaveConfig};
use tracing::info;

/// Lifecycle of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No wave is running; the next call to `begin_wave` starts one.
    Idle,
    /// Enemies are still being released at the wave's cadence.
    Spawning,
    /// Every enemy was released; the wave ends once none are alive.
    Draining,
}

/// Progress counters of the active wave, replaced wholesale at each start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveState {
    /// Enemies released so far.
    pub enemies_spawned: u32,
    /// Enemies the wave releases in total.
    pub enemies_to_spawn: u32,
    /// Time accumulated toward the next spawn.
    pub spawn_timer: Duration,
    /// Delay between consecutive spawns.
    pub spawn_interval: Duration,
}

impl WaveState {
    const EMPTY: Self = Self {
        enemies_spawned: 0,
        enemies_to_spawn: 0,
        spawn_timer: Duration::ZERO,
        spawn_interval: Duration::ZERO,
    };
}

/// Pure system that paces spawns and detects wave completion.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: WaveConfig,
    enemies: EnemyConfig,
    wave: u32,
    phase: WavePhase,
    state: WaveState,
}

impl WaveScheduler {
    /// Creates a scheduler positioned before the first wave.
    #[must_use]
    pub fn new(waves: WaveConfig, enemies: EnemyConfig) -> Self {
        Self {
            waves,
            enemies,
            wave: 1,
            phase: WavePhase::Idle,
            state: WaveState::EMPTY,
        }
    }

    /// One-based index of the current (or next) wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Progress counters of the current wave.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }

    /// Reports whether a wave is spawning or draining.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != WavePhase::Idle
    }

    /// Starts the current wave. Returns `false` when a wave is already active.
    pub fn begin_wave(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.phase != WavePhase::Idle {
            return false;
        }

        let enemies = self.waves.enemy_count(self.wave);
        self.state = WaveState {
            enemies_spawned: 0,
            enemies_to_spawn: enemies,
            spawn_timer: Duration::ZERO,
            spawn_interval: self.waves.spawn_interval(self.wave),
        };
        self.phase = if enemies == 0 {
            WavePhase::Draining
        } else {
            WavePhase::Spawning
        };

        info!(wave = self.wave, enemies, "wave started");
        out_events.push(Event::WaveStarted {
            wave: self.wave,
            enemies,
        });
        true
    }

    /// Advances the wave timer and emits at most one spawn command.
    ///
    /// `alive` is the number of live enemies before this tick's spawns are
    /// applied, and `deployed_dps` the summed damage per second of every
    /// placed tower, used to size elite upgrades.
    pub fn handle<R>(
        &mut self,
        dt: Duration,
        alive: usize,
        deployed_dps: f32,
        rng: &mut R,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        match self.phase {
            WavePhase::Idle => {}
            WavePhase::Spawning => {
                self.state.spawn_timer = self.state.spawn_timer.saturating_add(dt);
                if self.state.spawn_timer < self.state.spawn_interval {
                    return;
                }

                self.state.spawn_timer = Duration::ZERO;
                self.state.enemies_spawned += 1;
                out.push(self.spawn_command(deployed_dps, rng));

                if self.state.enemies_spawned >= self.state.enemies_to_spawn {
                    self.phase = WavePhase::Draining;
                }
            }
            WavePhase::Draining => {
                if alive > 0 {
                    return;
                }

                info!(wave = self.wave, "wave completed");
                out_events.push(Event::WaveCompleted { wave: self.wave });
                self.wave = self.wave.saturating_add(1);
                self.phase = WavePhase::Idle;
                self.state.spawn_timer = Duration::ZERO;
            }
        }
    }

    fn spawn_command<R>(&self, deployed_dps: f32, rng: &mut R) -> Command
    where
        R: Rng + ?Sized,
    {
        let mut hp = self.enemies.hp_for_wave(self.wave);
        let elite = deployed_dps > 0.0 && rng.gen::<f32>() < self.waves.elite_chance;
        if elite {
            hp += deployed_dps * self.waves.elite_hp_per_dps;
        }
        Command::SpawnEnemy { hp, elite }
    }
}
