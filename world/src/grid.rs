//! Dense occupancy matrix that owns walls, endpoints and route annotations.

use rand::Rng;
use siege_grid_core::{CellCoord, CellSnapshot, EndpointRing, LayoutConfig, TowerId, WallView};
use siege_grid_system_pathfinding::PathError;
use thiserror::Error;

/// Start and end cells of the enemy route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoints {
    /// Cell enemies spawn on.
    pub start: CellCoord,
    /// Cell enemies try to reach.
    pub end: CellCoord,
}

/// Reasons a layout cannot be applied to a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An endpoint lies outside the grid.
    #[error("endpoint {0:?} lies outside the grid")]
    OutOfBounds(CellCoord),
    /// Start and end were the same cell.
    #[error("start and end must be distinct cells")]
    Overlapping,
    /// The configured ring contains fewer than two cells.
    #[error("grid of side {0} has no room for distinct endpoints")]
    NoCandidates(u32),
    /// No route connects the chosen start and end.
    #[error("no route between start and end")]
    NoRoute(#[source] PathError),
}

/// Square grid of cells stored in row-major order.
///
/// Every cell holding an occupant is also a wall. Route flags are annotations
/// for observers and never influence the planner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    side: u32,
    walls: Vec<bool>,
    route_flags: Vec<bool>,
    occupants: Vec<Option<TowerId>>,
    endpoints: Option<Endpoints>,
}

impl Grid {
    /// Creates a grid whose cells are all walkable, without endpoints.
    #[must_use]
    pub fn new(side: u32) -> Self {
        let side_usize = usize::try_from(side).unwrap_or(0);
        let capacity = side_usize.saturating_mul(side_usize);
        Self {
            side,
            walls: vec![false; capacity],
            route_flags: vec![false; capacity],
            occupants: vec![None; capacity],
            endpoints: None,
        }
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.side && cell.row() < self.side
    }

    /// Start and end cells, once placed.
    #[must_use]
    pub const fn endpoints(&self) -> Option<Endpoints> {
        self.endpoints
    }

    /// Reports whether the cell is the start or the end.
    #[must_use]
    pub fn is_endpoint(&self, cell: CellCoord) -> bool {
        self.endpoints
            .is_some_and(|endpoints| endpoints.start == cell || endpoints.end == cell)
    }

    /// Reports whether the cell blocks movement. Cells outside the grid block.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.wall_view().is_wall(cell)
    }

    /// Reports whether the committed route passes through the cell.
    #[must_use]
    pub fn is_path(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.route_flags.get(index).copied())
            .unwrap_or(false)
    }

    /// Structure occupying the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell)
            .and_then(|index| self.occupants.get(index).copied().flatten())
    }

    /// Toggles the blocked state of a single cell without validating routes.
    ///
    /// Returns `false` when the cell lies outside the grid.
    pub fn set_wall(&mut self, cell: CellCoord, value: bool) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.walls[index] = value;
        if !value {
            self.occupants[index] = None;
        }
        true
    }

    /// Records a structure on a cell, marking it as a wall.
    pub fn set_occupant(&mut self, cell: CellCoord, occupant: TowerId) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.walls[index] = true;
        self.occupants[index] = Some(occupant);
        true
    }

    /// Marks the provided cells as start and end.
    pub fn set_endpoints(&mut self, start: CellCoord, end: CellCoord) -> Result<(), LayoutError> {
        if !self.contains(start) {
            return Err(LayoutError::OutOfBounds(start));
        }
        if !self.contains(end) {
            return Err(LayoutError::OutOfBounds(end));
        }
        if start == end {
            return Err(LayoutError::Overlapping);
        }
        self.endpoints = Some(Endpoints { start, end });
        Ok(())
    }

    /// Draws start and end from the configured ring, keeping them apart.
    ///
    /// End candidates are resampled until the Manhattan separation is met or
    /// the attempt budget runs out, in which case the candidate farthest from
    /// the start is used instead.
    pub fn place_endpoints<R>(
        &mut self,
        layout: &LayoutConfig,
        rng: &mut R,
    ) -> Result<Endpoints, LayoutError>
    where
        R: Rng + ?Sized,
    {
        let candidates = ring_cells(self.side, layout.ring);
        if candidates.len() < 2 {
            return Err(LayoutError::NoCandidates(self.side));
        }

        let min_separation = layout.min_separation.max(1);
        let start = candidates[rng.gen_range(0..candidates.len())];
        let mut end = candidates[rng.gen_range(0..candidates.len())];
        let mut attempts = 1;

        while start.manhattan_distance(end) < min_separation {
            if attempts >= layout.max_resample_attempts {
                end = farthest_from(start, &candidates);
                tracing::warn!(
                    ?start,
                    ?end,
                    min_separation,
                    "endpoint resampling exhausted, using farthest candidate"
                );
                break;
            }
            end = candidates[rng.gen_range(0..candidates.len())];
            attempts += 1;
        }

        if start == end {
            return Err(LayoutError::Overlapping);
        }

        self.set_endpoints(start, end)?;
        Ok(Endpoints { start, end })
    }

    /// Replaces the route annotations with the provided cells.
    pub fn mark_route(&mut self, route: &[CellCoord]) {
        self.route_flags.fill(false);
        for &cell in route {
            if let Some(index) = self.index(cell) {
                self.route_flags[index] = true;
            }
        }
    }

    /// Read-only wall matrix consumed by the planner.
    #[must_use]
    pub fn wall_view(&self) -> WallView<'_> {
        WallView::new(&self.walls, self.side)
    }

    /// Snapshot of a single cell.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellSnapshot> {
        let index = self.index(cell)?;
        let endpoints = self.endpoints;
        Some(CellSnapshot {
            cell,
            is_wall: self.walls[index],
            is_start: endpoints.is_some_and(|endpoints| endpoints.start == cell),
            is_end: endpoints.is_some_and(|endpoints| endpoints.end == cell),
            is_path: self.route_flags[index],
            occupant: self.occupants[index],
        })
    }

    /// Snapshot of every cell in row-major order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CellSnapshot> {
        (0..self.side)
            .flat_map(|row| (0..self.side).map(move |column| CellCoord::new(column, row)))
            .filter_map(|cell| self.cell(cell))
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        self.wall_view().index(cell)
    }
}

fn ring_cells(side: u32, ring: EndpointRing) -> Vec<CellCoord> {
    let inset = match ring {
        EndpointRing::Inner => 1,
        EndpointRing::Border => 0,
    };

    if side <= inset * 2 {
        return Vec::new();
    }

    let low = inset;
    let high = side - 1 - inset;
    let mut cells = Vec::new();
    for row in low..=high {
        for column in low..=high {
            if row == low || row == high || column == low || column == high {
                cells.push(CellCoord::new(column, row));
            }
        }
    }
    cells
}

fn farthest_from(start: CellCoord, candidates: &[CellCoord]) -> CellCoord {
    let mut best = start;
    let mut best_distance = 0;
    for &candidate in candidates {
        let distance = start.manhattan_distance(candidate);
        if distance > best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}
