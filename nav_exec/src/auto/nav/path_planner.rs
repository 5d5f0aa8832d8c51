//! # Path planner
//!
//! A* graph search over the grid map. Only cells that are passable and whose
//! clearance is strictly greater than the requested minimum are considered,
//! so the resulting route never passes closer to a wall or obstacle than the
//! robot can afford.
//!
//! Moves are 8-connected with diagonal cost 2 and orthogonal cost 1 - an
//! integral approximation of sqrt(2) which makes the Euclidean heuristic
//! only approximately admissible, an accepted trade-off at this map scale.
//! Scores are held in full-width per-cell grids rather than packed bytes so
//! long or serpentine paths cannot overflow them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use crate::auto::geom::GridPoint;
use crate::auto::map::{Grid, GridMap};
use crate::auto::path::Route;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(
        "No path from {start:?} to {goal:?} with a clearance greater than {min_clearance_gu} exists"
    )]
    NoPath {
        start: GridPoint,
        goal: GridPoint,
        min_clearance_gu: f64,
    },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Plan a route from `start` to `goal` over the given map.
///
/// Only cells with a clearance strictly greater than `min_clearance_gu` are
/// entered. Returns [`PlanError::NoPath`] if the open set empties before the
/// goal is reached, which is fatal for the caller - there is no recovery
/// other than aborting the run.
pub fn plan(
    map: &GridMap,
    start: GridPoint,
    goal: GridPoint,
    min_clearance_gu: f64,
) -> Result<Route, PlanError> {
    let no_path = PlanError::NoPath {
        start,
        goal,
        min_clearance_gu,
    };

    let width_gu = map.width_gu();
    let height_gu = map.height_gu();

    // Working sets. Nothing but the start is open to begin with.
    let mut open = Grid::new(width_gu, height_gu, false);
    let mut closed = Grid::new(width_gu, height_gu, false);
    let mut came_from: Grid<Option<GridPoint>> = Grid::new(width_gu, height_gu, None);
    let mut g_scores = Grid::new(width_gu, height_gu, 0i32);
    let mut f_scores: Grid<Option<f64>> = Grid::new(width_gu, height_gu, None);

    open.set(start.x_gu, start.y_gu, true);
    g_scores.set(start.x_gu, start.y_gu, 0);
    f_scores.set(start.x_gu, start.y_gu, Some(start.distance_to(&goal)));

    loop {
        // Lowest f-score in the open set, ties broken by row-major scan
        // order
        let current = match find_minimum(&open, &f_scores) {
            Some(p) => p,
            None => return Err(no_path),
        };

        if current == goal {
            return Ok(Route::new(reconstruct(&came_from, goal)));
        }

        open.set(current.x_gu, current.y_gu, false);
        closed.set(current.x_gu, current.y_gu, true);

        // 8-connected neighbour expansion. Coordinates are widened so
        // stepping off the byte domain at the map edge cannot wrap.
        for neighbour_x in (current.x_gu as i16 - 1)..=(current.x_gu as i16 + 1) {
            for neighbour_y in (current.y_gu as i16 - 1)..=(current.y_gu as i16 + 1) {
                if neighbour_x == current.x_gu as i16 && neighbour_y == current.y_gu as i16 {
                    continue;
                }
                if neighbour_x < 0
                    || neighbour_y < 0
                    || neighbour_x >= width_gu as i16
                    || neighbour_y >= height_gu as i16
                {
                    continue;
                }

                let nx = neighbour_x as i8;
                let ny = neighbour_y as i8;

                // Check the neighbour is applicable
                if !map.is_passable(nx, ny)
                    || map.clearance_gu(nx, ny) <= min_clearance_gu
                    || *closed.get(nx, ny).unwrap_or(&true)
                {
                    continue;
                }

                // Diagonal moves have cost 2
                let step_cost = if nx != current.x_gu && ny != current.y_gu {
                    2
                } else {
                    1
                };
                let tentative_g = g_scores.get(current.x_gu, current.y_gu).unwrap_or(&0) + step_cost;

                // If the neighbour is not already open or has a better
                // g-score, record the better route to it
                let is_open = *open.get(nx, ny).unwrap_or(&false);
                if !is_open || tentative_g < *g_scores.get(nx, ny).unwrap_or(&i32::MAX) {
                    came_from.set(nx, ny, Some(current));
                    g_scores.set(nx, ny, tentative_g);
                    f_scores.set(
                        nx,
                        ny,
                        Some(tentative_g as f64 + GridPoint::new(nx, ny).distance_to(&goal)),
                    );
                    open.set(nx, ny, true);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the open cell with the lowest f-score, or `None` if the open set is
/// empty.
fn find_minimum(open: &Grid<bool>, f_scores: &Grid<Option<f64>>) -> Option<GridPoint> {
    let mut min = std::f64::MAX;
    let mut min_point = None;

    for y_gu in 0..open.height_gu() {
        for x_gu in 0..open.width_gu() {
            if !*open.get(x_gu, y_gu).unwrap_or(&false) {
                continue;
            }
            if let Some(Some(f)) = f_scores.get(x_gu, y_gu) {
                if *f < min {
                    min = *f;
                    min_point = Some(GridPoint::new(x_gu, y_gu));
                }
            }
        }
    }

    min_point
}

/// Walk the came-from back-pointers from the goal to the start.
fn reconstruct(came_from: &Grid<Option<GridPoint>>, goal: GridPoint) -> Vec<GridPoint> {
    let mut points = vec![goal];
    let mut current = goal;

    while let Some(Some(previous)) = came_from.get(current.x_gu, current.y_gu) {
        points.push(*previous);
        current = *previous;
    }

    points.reverse();
    points
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::geom::Rect;
    use crate::auto::nav::simplify::simplify;

    /// Chebyshev distance between two route points
    fn chebyshev(a: &GridPoint, b: &GridPoint) -> i32 {
        ((a.x_gu as i32) - (b.x_gu as i32))
            .abs()
            .max(((a.y_gu as i32) - (b.y_gu as i32)).abs())
    }

    #[test]
    fn test_open_grid_is_chebyshev_optimal() {
        let map = GridMap::new(10, 10).unwrap();
        let start = GridPoint::new(1, 1);
        let goal = GridPoint::new(8, 8);

        let route = plan(&map, start, goal, 0.0).unwrap();

        assert_eq!(route.points_gu[0], start);
        assert_eq!(*route.points_gu.last().unwrap(), goal);

        // Each move is a single king step
        for pair in route.points_gu.windows(2) {
            assert_eq!(chebyshev(&pair[0], &pair[1]), 1);
        }

        // Path length in steps equals the Chebyshev distance
        assert_eq!(route.points_gu.len() - 1, 7);
    }

    #[test]
    fn test_route_respects_clearance() {
        let mut map = GridMap::new(20, 20).unwrap();
        // A wall across the middle with a gap at the right
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(0, 10),
            GridPoint::new(14, 10),
        ));

        let route = plan(&map, GridPoint::new(5, 2), GridPoint::new(5, 17), 1.0).unwrap();

        for point in &route.points_gu {
            assert!(map.is_passable(point.x_gu, point.y_gu));
            assert!(map.clearance_gu(point.x_gu, point.y_gu) > 1.0);
        }
    }

    #[test]
    fn test_unreachable_goal_fails() {
        let mut map = GridMap::new(10, 10).unwrap();
        // Box the goal in completely
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(6, 6),
            GridPoint::new(9, 9),
        ));

        let result = plan(&map, GridPoint::new(1, 1), GridPoint::new(8, 8), 0.0);
        assert!(matches!(result, Err(PlanError::NoPath { .. })));
    }

    #[test]
    fn test_low_clearance_endpoints_fail() {
        // Open 10x10 map, the cell (1, 1) is passable but only 1 gu from the
        // wall. With a minimum clearance of 2 it can never be entered, so
        // planning towards it must drain the open set and fail.
        let map = GridMap::new(10, 10).unwrap();

        let result = plan(&map, GridPoint::new(5, 5), GridPoint::new(1, 1), 2.0);
        assert!(matches!(result, Err(PlanError::NoPath { .. })));

        // Starting on a low clearance cell fails the same way, since none of
        // its neighbours clear the minimum either
        let result = plan(&map, GridPoint::new(1, 1), GridPoint::new(5, 5), 2.0);
        assert!(matches!(result, Err(PlanError::NoPath { .. })));
    }

    #[test]
    fn test_plan_then_simplify_diagonal() {
        // An obstacle-free map gives an approximately straight diagonal,
        // which the simplifier collapses to its two endpoints
        let map = GridMap::new(10, 10).unwrap();
        let route = plan(&map, GridPoint::new(1, 1), GridPoint::new(8, 8), 0.0).unwrap();

        let reduced = simplify(&route.points_gu, 1.0);
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[0], GridPoint::new(1, 1));
        assert_eq!(reduced[1], GridPoint::new(8, 8));
    }
}
