#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Siege Grid waves headlessly.

mod placement;
mod report;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use siege_grid_core::{GameConfig, WELCOME_BANNER};
use siege_grid_simulation::Simulation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::placement::PlacementRequest;
use crate::report::{render_grid, Summary, Tally};

/// Ticks after which a wave that never drains is reported as stuck.
const MAX_TICKS_PER_WAVE: u32 = 1_000_000;

#[derive(Debug, Parser)]
#[command(name = "siege-grid", about = "Plays Siege Grid waves without a display")]
struct Args {
    /// TOML file overriding the default balance values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the layout and elite rolls; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of waves to play before reporting.
    #[arg(long, default_value_t = 1)]
    waves: u32,
    /// Simulation step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Structure placed before the first wave; may be repeated.
    #[arg(long = "place", value_name = "KIND@COL,ROW")]
    placements: Vec<PlacementRequest>,
    /// Print the summary as JSON instead of the text grid.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Siege Grid command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {}", args.dt);
    }
    let config = load_config(args.config.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(seed, "{WELCOME_BANNER}");
    let mut simulation = Simulation::new(config, seed).context("failed to start the session")?;

    for request in &args.placements {
        match simulation.attempt_placement(request.cell, request.kind) {
            Ok(tower) => info!(
                tower = tower.get(),
                kind = request.kind.name(),
                cell = ?request.cell,
                "structure placed"
            ),
            Err(reason) => warn!(
                kind = request.kind.name(),
                cell = ?request.cell,
                %reason,
                "placement rejected"
            ),
        }
    }

    let mut tally = Tally::default();
    tally.record(&simulation.drain_events());
    play_waves(&mut simulation, &mut tally, args.waves, args.dt)?;

    let summary = Summary::capture(&simulation, seed, tally);
    if args.json {
        let encoded =
            serde_json::to_string_pretty(&summary).context("failed to encode the summary")?;
        println!("{encoded}");
    } else {
        let grid = render_grid(
            &simulation.cells(),
            &simulation.towers(),
            simulation.grid_size(),
        );
        println!("{grid}");
        println!("{}", summary.to_text());
    }
    Ok(())
}

fn play_waves(simulation: &mut Simulation, tally: &mut Tally, waves: u32, dt: f32) -> Result<()> {
    for _ in 0..waves {
        if !simulation.begin_wave() {
            break;
        }
        tally.record(&simulation.drain_events());

        let target = tally.waves_completed + 1;
        let mut ticks = 0;
        while tally.waves_completed < target && !simulation.is_game_over() {
            if ticks == MAX_TICKS_PER_WAVE {
                bail!(
                    "wave {} did not finish within {MAX_TICKS_PER_WAVE} ticks",
                    simulation.wave()
                );
            }
            simulation.tick(dt);
            tally.record(&simulation.drain_events());
            ticks += 1;
        }

        if simulation.is_game_over() {
            warn!(wave = simulation.wave(), "defender was overrun");
            break;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config: GameConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse configuration {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
