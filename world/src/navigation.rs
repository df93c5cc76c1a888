//! Informed shortest-path search over the collision grid.

use std::{cmp::Reverse, collections::BinaryHeap};

use waypoint_core::{CollisionGrid, Path, Position};

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;
const UNVISITED: usize = usize::MAX;

/// Neighbour offsets in the order they are expanded: cardinals first
/// (N, E, S, W), then diagonals (NE, SE, SW, NW).
const NEIGHBOR_OFFSETS: [(i32, i32, u32); 8] = [
    (0, -1, STRAIGHT_COST),
    (1, 0, STRAIGHT_COST),
    (0, 1, STRAIGHT_COST),
    (-1, 0, STRAIGHT_COST),
    (1, -1, DIAGONAL_COST),
    (1, 1, DIAGONAL_COST),
    (-1, 1, DIAGONAL_COST),
    (-1, -1, DIAGONAL_COST),
];

/// Finds a shortest 8-connected route between two walkable cells.
///
/// Diagonal steps are only taken when both adjacent orthogonal cells are
/// walkable, so consecutive points never cut a blocked corner. The frontier
/// is ordered by estimated total cost, then by the octile estimate, then by
/// insertion order, which keeps the result reproducible for a fixed grid and
/// query. Every cell is expanded at most once, so disconnected queries end
/// after at most one sweep of the grid.
///
/// Returns `None` when either endpoint is blocked or outside the grid, or
/// when no walkable route connects them.
#[must_use]
pub fn find_path(grid: &CollisionGrid, origin: Position, destination: Position) -> Option<Path> {
    let start = grid.index(origin)?;
    let goal = grid.index(destination)?;
    if !grid.is_walkable(origin) || !grid.is_walkable(destination) {
        return None;
    }
    if start == goal {
        return Some(Path::new(vec![origin]));
    }

    let cell_count = grid.len();
    let mut cost_so_far = vec![u32::MAX; cell_count];
    let mut came_from = vec![UNVISITED; cell_count];
    let mut closed = vec![false; cell_count];
    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;
    let mut expanded: usize = 0;

    cost_so_far[start] = 0;
    frontier.push(Reverse(FrontierEntry {
        estimate: octile_distance(origin, destination),
        heuristic: octile_distance(origin, destination),
        sequence,
        index: start,
    }));

    while let Some(Reverse(entry)) = frontier.pop() {
        if closed[entry.index] {
            continue;
        }
        closed[entry.index] = true;
        expanded += 1;

        if entry.index == goal {
            tracing::trace!(expanded, "route found");
            return reconstruct(grid, &came_from, start, goal);
        }

        let Some(current) = grid.position_of(entry.index) else {
            continue;
        };
        let current_cost = cost_so_far[entry.index];

        for (dx, dy, step_cost) in NEIGHBOR_OFFSETS {
            let next = current.offset(dx, dy);
            if !grid.is_walkable(next) {
                continue;
            }
            if dx != 0
                && dy != 0
                && (!grid.is_walkable(current.offset(dx, 0))
                    || !grid.is_walkable(current.offset(0, dy)))
            {
                continue;
            }
            let Some(next_index) = grid.index(next) else {
                continue;
            };
            if closed[next_index] {
                continue;
            }

            let tentative = current_cost.saturating_add(step_cost);
            if tentative >= cost_so_far[next_index] {
                continue;
            }

            cost_so_far[next_index] = tentative;
            came_from[next_index] = entry.index;
            sequence += 1;
            let heuristic = octile_distance(next, destination);
            frontier.push(Reverse(FrontierEntry {
                estimate: tentative.saturating_add(heuristic),
                heuristic,
                sequence,
                index: next_index,
            }));
        }
    }

    tracing::trace!(expanded, "no route between {origin:?} and {destination:?}");
    None
}

/// Octile distance scaled to the straight/diagonal step costs. Never
/// overestimates the true route cost.
fn octile_distance(from: Position, to: Position) -> u32 {
    let dx = from.x().abs_diff(to.x());
    let dy = from.y().abs_diff(to.y());
    let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
    long.saturating_mul(STRAIGHT_COST)
        .saturating_add(short.saturating_mul(DIAGONAL_COST - STRAIGHT_COST))
}

fn reconstruct(
    grid: &CollisionGrid,
    came_from: &[usize],
    start: usize,
    goal: usize,
) -> Option<Path> {
    let mut points = Vec::new();
    let mut cursor = goal;
    loop {
        points.push(grid.position_of(cursor)?);
        if cursor == start {
            break;
        }
        cursor = *came_from.get(cursor)?;
        if cursor == UNVISITED {
            return None;
        }
    }
    points.reverse();
    Some(Path::new(points))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    estimate: u32,
    heuristic: u32,
    sequence: u64,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_connected(grid: &CollisionGrid, path: &Path) {
        for pair in path.points().windows(2) {
            let (from, to) = (pair[0], pair[1]);
            assert!(grid.is_walkable(from) && grid.is_walkable(to));
            let dx = from.x().abs_diff(to.x());
            let dy = from.y().abs_diff(to.y());
            assert!(dx <= 1 && dy <= 1 && dx + dy > 0, "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn diagonal_route_across_open_grid() {
        let grid = CollisionGrid::open(Position::new(0, 0), 10, 10);
        let path = find_path(&grid, Position::new(0, 0), Position::new(9, 9)).expect("route");

        assert_eq!(path.len(), 10);
        assert_eq!(path.from(), Some(Position::new(0, 0)));
        assert_eq!(path.to(), Some(Position::new(9, 9)));
        assert_connected(&grid, &path);
    }

    #[test]
    fn same_cell_yields_single_point() {
        let grid = CollisionGrid::open(Position::new(0, 0), 3, 3);
        let path = find_path(&grid, Position::new(1, 1), Position::new(1, 1)).expect("route");
        assert_eq!(path.points(), &[Position::new(1, 1)]);
    }

    #[test]
    fn routes_around_a_wall() {
        let grid = CollisionGrid::from_rows(
            Position::new(0, 0),
            &[".....", ".###.", ".#...", ".#.#.", "...#."],
        )
        .expect("grid");
        let path = find_path(&grid, Position::new(2, 3), Position::new(4, 4)).expect("route");
        assert_connected(&grid, &path);
        assert_eq!(path.to(), Some(Position::new(4, 4)));
    }

    #[test]
    fn diagonal_moves_do_not_cut_corners() {
        let grid = CollisionGrid::from_rows(Position::new(0, 0), &[".#", ".."]).expect("grid");
        let path = find_path(&grid, Position::new(0, 0), Position::new(1, 1)).expect("route");
        assert_eq!(
            path.points(),
            &[Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn disconnected_regions_report_no_route() {
        let grid = CollisionGrid::from_rows(Position::new(0, 0), &["..#..", "..#..", "..#.."])
            .expect("grid");
        assert!(find_path(&grid, Position::new(0, 0), Position::new(4, 2)).is_none());
        assert!(find_path(&grid, Position::new(4, 2), Position::new(1, 1)).is_none());
    }

    #[test]
    fn blocked_or_outside_endpoints_report_no_route() {
        let grid = CollisionGrid::from_rows(Position::new(0, 0), &["..", ".#"]).expect("grid");
        assert!(find_path(&grid, Position::new(0, 0), Position::new(1, 1)).is_none());
        assert!(find_path(&grid, Position::new(0, 0), Position::new(5, 5)).is_none());
        assert!(find_path(&grid, Position::new(-1, 0), Position::new(0, 0)).is_none());
    }

    #[test]
    fn search_honours_grid_origin() {
        let grid = CollisionGrid::open(Position::new(5000, 3000), 4, 4);
        let path =
            find_path(&grid, Position::new(5000, 3000), Position::new(5003, 3001)).expect("route");
        assert_eq!(path.len(), 4);
        assert_connected(&grid, &path);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let grid = CollisionGrid::from_rows(
            Position::new(0, 0),
            &["........", "..####..", "........", "........"],
        )
        .expect("grid");
        let first = find_path(&grid, Position::new(0, 2), Position::new(7, 0));
        let second = find_path(&grid, Position::new(0, 2), Position::new(7, 0));
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn octile_never_exceeds_step_costs() {
        assert_eq!(octile_distance(Position::new(0, 0), Position::new(3, 3)), 42);
        assert_eq!(octile_distance(Position::new(0, 0), Position::new(5, 2)), 58);
    }
}
