#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-constrained A* planner used to route enemies from start to end.
//!
//! The planner is a pure function of the wall matrix and the two endpoints.
//! Search state lives in dense arrays indexed by `row * side + column`, and
//! the frontier is scanned linearly for the lowest estimated cost so that
//! ties always go to the entry that joined the frontier first. That order is
//! observable in the returned routes and tests depend on it.

use siege_grid_core::{CellCoord, WallView};
use thiserror::Error;

/// Maximum number of node expansions before a search is abandoned.
pub const MAX_EXPANSIONS: u32 = 10_000;

const UNVISITED: u32 = u32::MAX;
const NO_PARENT: usize = usize::MAX;

/// Reasons a search may fail to produce a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// No sequence of walkable cells connects the endpoints.
    #[error("no route connects the requested cells")]
    Unreachable,
    /// The search expanded more nodes than [`MAX_EXPANSIONS`] allows.
    #[error("route search abandoned after {expansions} expansions")]
    SearchBudgetExceeded {
        /// Number of expansions performed when the search stopped.
        expansions: u32,
    },
}

/// A* search workspace that keeps its buffers between calls.
#[derive(Debug, Default)]
pub struct PathPlanner {
    g_score: Vec<u32>,
    f_score: Vec<u32>,
    came_from: Vec<usize>,
    in_open: Vec<bool>,
    open: Vec<usize>,
    last_expansions: u32,
}

impl PathPlanner {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes expanded by the most recent search.
    #[must_use]
    pub fn last_expansions(&self) -> u32 {
        self.last_expansions
    }

    /// Finds the shortest 4-connected route from `start` to `end`.
    ///
    /// The returned route includes both endpoints and consecutive cells differ
    /// by exactly one step along one axis. The endpoints themselves are never
    /// treated as walls, so an enemy standing on a freshly placed wall can
    /// still leave it. Endpoints outside the grid are unreachable.
    pub fn find_path(
        &mut self,
        grid: WallView<'_>,
        start: CellCoord,
        end: CellCoord,
    ) -> Result<Vec<CellCoord>, PathError> {
        self.last_expansions = 0;

        let (Some(start_index), Some(end_index)) = (grid.index(start), grid.index(end)) else {
            return Err(PathError::Unreachable);
        };

        if start_index == end_index {
            return Ok(vec![start]);
        }

        let side = grid.side();
        self.reset(side);

        self.g_score[start_index] = 0;
        self.f_score[start_index] = start.manhattan_distance(end);
        self.open.push(start_index);
        self.in_open[start_index] = true;

        let mut expansions = 0;
        while !self.open.is_empty() {
            expansions += 1;
            self.last_expansions = expansions;
            if expansions > MAX_EXPANSIONS {
                return Err(PathError::SearchBudgetExceeded { expansions });
            }

            let position = self.lowest_f_position();
            let current = self.open[position];
            if current == end_index {
                return Ok(self.reconstruct(current, side));
            }

            let _ = self.open.remove(position);
            self.in_open[current] = false;

            let current_cell = cell_at(current, side);
            let tentative = self.g_score[current].saturating_add(1);

            for neighbor in neighbors(current_cell, side) {
                if neighbor != start && neighbor != end && grid.is_wall(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };

                if tentative >= self.g_score[neighbor_index] {
                    continue;
                }

                self.came_from[neighbor_index] = current;
                self.g_score[neighbor_index] = tentative;
                self.f_score[neighbor_index] =
                    tentative.saturating_add(neighbor.manhattan_distance(end));

                if !self.in_open[neighbor_index] {
                    self.in_open[neighbor_index] = true;
                    self.open.push(neighbor_index);
                }
            }
        }

        Err(PathError::Unreachable)
    }

    fn reset(&mut self, side: u32) {
        let side = usize::try_from(side).unwrap_or(0);
        let cell_count = side.saturating_mul(side);

        self.g_score.clear();
        self.g_score.resize(cell_count, UNVISITED);
        self.f_score.clear();
        self.f_score.resize(cell_count, UNVISITED);
        self.came_from.clear();
        self.came_from.resize(cell_count, NO_PARENT);
        self.in_open.clear();
        self.in_open.resize(cell_count, false);
        self.open.clear();
    }

    fn lowest_f_position(&self) -> usize {
        let mut best_position = 0;
        let mut best_score = self.f_score[self.open[0]];

        for (position, &index) in self.open.iter().enumerate().skip(1) {
            let score = self.f_score[index];
            if score < best_score {
                best_score = score;
                best_position = position;
            }
        }

        best_position
    }

    fn reconstruct(&self, end_index: usize, side: u32) -> Vec<CellCoord> {
        let mut path = vec![cell_at(end_index, side)];
        let mut current = end_index;

        while let Some(&parent) = self.came_from.get(current) {
            if parent == NO_PARENT {
                break;
            }
            path.push(cell_at(parent, side));
            current = parent;
        }

        path.reverse();
        path
    }
}

/// Convenience wrapper that runs a single search with a fresh planner.
pub fn find_path(
    grid: WallView<'_>,
    start: CellCoord,
    end: CellCoord,
) -> Result<Vec<CellCoord>, PathError> {
    PathPlanner::new().find_path(grid, start, end)
}

fn cell_at(index: usize, side: u32) -> CellCoord {
    let side = side.max(1) as usize;
    CellCoord::new((index % side) as u32, (index / side) as u32)
}

/// Cardinal neighbours inside the grid, in the order up, down, left, right.
fn neighbors(cell: CellCoord, side: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < side {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < side {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    candidates.into_iter().take(count).flatten()
}
