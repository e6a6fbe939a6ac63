//! Text rendering of the grid and the end-of-run summary.

use serde::Serialize;
use siege_grid_core::{CellSnapshot, Event, TowerKind, TowerSnapshot};
use siege_grid_simulation::Simulation;

/// Counters accumulated from the event stream while a run progresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Tally {
    pub(crate) waves_completed: u32,
    pub(crate) spawned: u32,
    pub(crate) killed: u32,
    pub(crate) escaped: u32,
    pub(crate) shots: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveCompleted { .. } => self.waves_completed += 1,
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.killed += 1,
                Event::EnemyReachedEnd { .. } => self.escaped += 1,
                Event::ProjectileFired { .. } => self.shots += 1,
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StructureRecord {
    kind: TowerKind,
    column: u32,
    row: u32,
}

impl From<&TowerSnapshot> for StructureRecord {
    fn from(tower: &TowerSnapshot) -> Self {
        Self {
            kind: tower.kind,
            column: tower.cell.column(),
            row: tower.cell.row(),
        }
    }
}

/// Machine-readable outcome of a run.
#[derive(Debug, Serialize)]
pub(crate) struct Summary {
    seed: u64,
    wave: u32,
    money: u32,
    lives: u32,
    game_over: bool,
    route_length: usize,
    #[serde(flatten)]
    tally: Tally,
    structures: Vec<StructureRecord>,
}

impl Summary {
    pub(crate) fn capture(simulation: &Simulation, seed: u64, tally: Tally) -> Self {
        Self {
            seed,
            wave: simulation.wave(),
            money: simulation.money(),
            lives: simulation.lives(),
            game_over: simulation.is_game_over(),
            route_length: simulation.route().len(),
            tally,
            structures: simulation.towers().iter().map(StructureRecord::from).collect(),
        }
    }

    pub(crate) fn to_text(&self) -> String {
        let outcome = if self.game_over { "defeated" } else { "holding" };
        format!(
            "seed {seed} | wave {wave} | waves cleared {cleared} | money {money} | lives {lives} | {outcome}\n\
             spawned {spawned} | killed {killed} | escaped {escaped} | shots {shots} | route {route} cells",
            seed = self.seed,
            wave = self.wave,
            cleared = self.tally.waves_completed,
            money = self.money,
            lives = self.lives,
            spawned = self.tally.spawned,
            killed = self.tally.killed,
            escaped = self.tally.escaped,
            shots = self.tally.shots,
            route = self.route_length,
        )
    }
}

/// Renders the grid as one line of glyphs per row.
pub(crate) fn render_grid(cells: &[CellSnapshot], towers: &[TowerSnapshot], side: u32) -> String {
    let width = usize::try_from(side).unwrap_or(0);
    let mut output = String::with_capacity(cells.len() + width);

    for (index, cell) in cells.iter().enumerate() {
        if index > 0 && width > 0 && index % width == 0 {
            output.push('\n');
        }
        output.push(glyph(cell, towers));
    }
    output
}

fn glyph(cell: &CellSnapshot, towers: &[TowerSnapshot]) -> char {
    if cell.is_start {
        return 'S';
    }
    if cell.is_end {
        return 'E';
    }

    let kind = cell
        .occupant
        .and_then(|id| towers.iter().find(|tower| tower.id == id))
        .map(|tower| tower.kind);
    match kind {
        Some(TowerKind::Primary) => 'P',
        Some(TowerKind::Slow) => 'L',
        Some(TowerKind::Area) => 'A',
        Some(TowerKind::Wall) => '#',
        None if cell.is_wall => '#',
        None if cell.is_path => '*',
        None => '.',
    }
}
