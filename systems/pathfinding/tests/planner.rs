use siege_grid_core::{CellCoord, WallView};
use siege_grid_system_pathfinding::{find_path, PathError, PathPlanner, MAX_EXPANSIONS};

fn open_grid(side: u32) -> Vec<bool> {
    vec![false; (side * side) as usize]
}

fn set_wall(walls: &mut [bool], side: u32, column: u32, row: u32) {
    walls[(row * side + column) as usize] = true;
}

fn assert_unit_steps(path: &[CellCoord]) {
    for pair in path.windows(2) {
        assert_eq!(
            pair[0].manhattan_distance(pair[1]),
            1,
            "{:?} -> {:?} is not a single step",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn empty_grid_routes_have_manhattan_length() {
    let side = 12;
    let walls = open_grid(side);
    let pairs = [
        (CellCoord::new(0, 0), CellCoord::new(11, 11)),
        (CellCoord::new(5, 2), CellCoord::new(1, 9)),
        (CellCoord::new(11, 0), CellCoord::new(0, 11)),
        (CellCoord::new(3, 3), CellCoord::new(3, 8)),
    ];

    for (start, end) in pairs {
        let path = find_path(WallView::new(&walls, side), start, end).expect("open grid route");
        assert_eq!(path.len() as u32, start.manhattan_distance(end) + 1);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert_unit_steps(&path);
    }
}

#[test]
fn twenty_by_twenty_corner_to_corner_route_has_35_nodes() {
    let side = 20;
    let walls = open_grid(side);
    let mut planner = PathPlanner::new();

    let path = planner
        .find_path(
            WallView::new(&walls, side),
            CellCoord::new(1, 1),
            CellCoord::new(18, 18),
        )
        .expect("route");

    assert_eq!(path.len(), 35);
    assert_unit_steps(&path);
    assert!(planner.last_expansions() <= MAX_EXPANSIONS);
}

#[test]
fn walls_force_a_detour() {
    let side = 5;
    let mut walls = open_grid(side);
    for row in 0..4 {
        set_wall(&mut walls, side, 2, row);
    }

    let path = find_path(
        WallView::new(&walls, side),
        CellCoord::new(0, 0),
        CellCoord::new(4, 0),
    )
    .expect("detour around the wall");

    assert_eq!(path.len(), 13);
    assert!(path.contains(&CellCoord::new(2, 4)));
    assert_unit_steps(&path);
    for cell in &path {
        assert!(!walls[(cell.row() * side + cell.column()) as usize]);
    }
}

#[test]
fn full_barrier_is_unreachable() {
    let side = 6;
    let mut walls = open_grid(side);
    for row in 0..side {
        set_wall(&mut walls, side, 3, row);
    }

    let result = find_path(
        WallView::new(&walls, side),
        CellCoord::new(0, 2),
        CellCoord::new(5, 2),
    );

    assert_eq!(result, Err(PathError::Unreachable));
}

#[test]
fn endpoint_walls_are_ignored() {
    let side = 4;
    let mut walls = open_grid(side);
    set_wall(&mut walls, side, 0, 0);
    set_wall(&mut walls, side, 3, 3);

    let path = find_path(
        WallView::new(&walls, side),
        CellCoord::new(0, 0),
        CellCoord::new(3, 3),
    )
    .expect("endpoints never block");

    assert_eq!(path.len(), 7);
}

#[test]
fn sealed_end_exhausts_search_budget_on_large_grid() {
    let side = 120;
    let mut walls = open_grid(side);
    let end = CellCoord::new(100, 100);
    set_wall(&mut walls, side, 100, 99);
    set_wall(&mut walls, side, 100, 101);
    set_wall(&mut walls, side, 99, 100);
    set_wall(&mut walls, side, 101, 100);

    let result = find_path(WallView::new(&walls, side), CellCoord::new(0, 0), end);

    assert_eq!(
        result,
        Err(PathError::SearchBudgetExceeded {
            expansions: MAX_EXPANSIONS + 1
        })
    );
}

#[test]
fn repeated_searches_are_deterministic() {
    let side = 10;
    let mut walls = open_grid(side);
    set_wall(&mut walls, side, 4, 4);
    set_wall(&mut walls, side, 5, 5);
    set_wall(&mut walls, side, 4, 5);

    let mut planner = PathPlanner::new();
    let first = planner
        .find_path(
            WallView::new(&walls, side),
            CellCoord::new(1, 8),
            CellCoord::new(8, 1),
        )
        .expect("route");
    let second = planner
        .find_path(
            WallView::new(&walls, side),
            CellCoord::new(1, 8),
            CellCoord::new(8, 1),
        )
        .expect("route");

    assert_eq!(first, second);
    assert_eq!(first.len(), 15);
}
