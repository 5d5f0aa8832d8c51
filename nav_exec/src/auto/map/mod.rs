//! # Grid map module
//!
//! The grid map is the robot's internal representation of its surroundings:
//! a dense occupancy grid built once from a set of axis-aligned obstacle
//! rectangles, plus the redundant obstacle list itself which allows clearance
//! queries without scanning the grid.
//!
//! The map is never mutated after construction, the planner works on copies
//! of the occupancy field for its open/closed sets.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use super::geom::Rect;
use util::maths::min_of;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of cells (width * height) a map may have.
///
/// The map has to fit into a few kilobytes of memory on the target, so the
/// cell count is bounded by construction.
pub const MAX_NUM_CELLS: usize = 5000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A dense rectangular field of values over grid coordinates.
///
/// Used for the occupancy field of the [`GridMap`] and for the planner's
/// per-cell working data.
#[derive(Clone)]
pub struct Grid<T> {
    width_gu: i8,
    height_gu: i8,
    cells: Vec<T>,
}

/// The robot's surroundings - an occupancy grid plus the obstacle list.
#[derive(Clone)]
pub struct GridMap {
    /// True where the cell is non-passable
    occupied: Grid<bool>,

    /// A (redundant) list of obstacles for easier distance calculations
    obstacles: Vec<Rect>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum MapError {
    #[error(
        "A map of {0}x{1} cells exceeds the budget of {budget} cells",
        budget = MAX_NUM_CELLS
    )]
    TooManyCells(i8, i8),

    #[error("Map dimentions {0}x{1} are not positive")]
    InvalidDimensions(i8, i8),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: Clone> Grid<T> {
    /// Create a new grid with every cell set to the given initial value.
    pub fn new(width_gu: i8, height_gu: i8, initial: T) -> Self {
        Self {
            width_gu,
            height_gu,
            cells: vec![initial; width_gu as usize * height_gu as usize],
        }
    }

    pub fn width_gu(&self) -> i8 {
        self.width_gu
    }

    pub fn height_gu(&self) -> i8 {
        self.height_gu
    }

    /// True if the given coordinates address a cell inside the grid.
    pub fn is_in_bounds(&self, x_gu: i16, y_gu: i16) -> bool {
        x_gu >= 0 && y_gu >= 0 && x_gu < self.width_gu as i16 && y_gu < self.height_gu as i16
    }

    pub fn get(&self, x_gu: i8, y_gu: i8) -> Option<&T> {
        if self.is_in_bounds(x_gu as i16, y_gu as i16) {
            Some(&self.cells[self.index(x_gu, y_gu)])
        } else {
            None
        }
    }

    /// Set a cell's value, out of bounds coordinates are ignored.
    pub fn set(&mut self, x_gu: i8, y_gu: i8, value: T) {
        if self.is_in_bounds(x_gu as i16, y_gu as i16) {
            let index = self.index(x_gu, y_gu);
            self.cells[index] = value;
        }
    }

    fn index(&self, x_gu: i8, y_gu: i8) -> usize {
        y_gu as usize * self.width_gu as usize + x_gu as usize
    }
}

impl GridMap {
    /// Create a new map of the given dimentions with every cell passable.
    pub fn new(width_gu: i8, height_gu: i8) -> Result<Self, MapError> {
        // Negative dimentions would wrap to huge values in the usize cell
        // count below
        if width_gu <= 0 || height_gu <= 0 {
            return Err(MapError::InvalidDimensions(width_gu, height_gu));
        }
        if width_gu as usize * height_gu as usize > MAX_NUM_CELLS {
            return Err(MapError::TooManyCells(width_gu, height_gu));
        }

        Ok(Self {
            occupied: Grid::new(width_gu, height_gu, false),
            obstacles: Vec::new(),
        })
    }

    pub fn width_gu(&self) -> i8 {
        self.occupied.width_gu()
    }

    pub fn height_gu(&self) -> i8 {
        self.occupied.height_gu()
    }

    /// Add an obstacle, marking all cells it covers as non-passable.
    pub fn add_obstacle(&mut self, obstacle: Rect) {
        for x_gu in obstacle.x_min_gu..=obstacle.x_max_gu {
            for y_gu in obstacle.y_min_gu..=obstacle.y_max_gu {
                self.occupied.set(x_gu, y_gu, true);
            }
        }
        self.obstacles.push(obstacle);
    }

    /// True if the cell is inside the map and not in an obstacle.
    pub fn is_passable(&self, x_gu: i8, y_gu: i8) -> bool {
        match self.occupied.get(x_gu, y_gu) {
            Some(occupied) => !occupied,
            None => false,
        }
    }

    /// A copy of the occupancy field, for the planner's working sets.
    pub fn occupancy_grid(&self) -> Grid<bool> {
        self.occupied.clone()
    }

    /// Distance from the cell to the closest non-passable area (wall or
    /// obstacle).
    pub fn clearance_gu(&self, x_gu: i8, y_gu: i8) -> f64 {
        self.distance_to_obstacle_gu(x_gu, y_gu)
            .min(self.distance_to_wall_gu(x_gu, y_gu))
    }

    fn distance_to_obstacle_gu(&self, x_gu: i8, y_gu: i8) -> f64 {
        let mut min = std::f64::MAX;
        for obstacle in &self.obstacles {
            let dist = Self::distance_to_rect_gu(x_gu, y_gu, obstacle);
            if dist < min {
                min = dist;
            }
        }
        min
    }

    fn distance_to_rect_gu(x_gu: i8, y_gu: i8, obstacle: &Rect) -> f64 {
        // Per-axis distance to the rectangle's span: zero if the coordinate
        // falls within the span, otherwise the distance to the nearer edge
        let mut dx = 0.0;
        if !(x_gu >= obstacle.x_min_gu && x_gu <= obstacle.x_max_gu) {
            dx = f64::min(
                (x_gu as f64 - obstacle.x_min_gu as f64).abs(),
                (x_gu as f64 - obstacle.x_max_gu as f64).abs(),
            );
        }
        let mut dy = 0.0;
        if !(y_gu >= obstacle.y_min_gu && y_gu <= obstacle.y_max_gu) {
            dy = f64::min(
                (y_gu as f64 - obstacle.y_min_gu as f64).abs(),
                (y_gu as f64 - obstacle.y_max_gu as f64).abs(),
            );
        }
        (dx * dx + dy * dy).sqrt()
    }

    fn distance_to_wall_gu(&self, x_gu: i8, y_gu: i8) -> f64 {
        // Minimum of the distances to the four map edges
        min_of(&[
            (x_gu as f64).abs(),
            (x_gu as f64 - self.width_gu() as f64).abs(),
            (y_gu as f64).abs(),
            (y_gu as f64 - self.height_gu() as f64).abs(),
        ])
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::geom::GridPoint;

    #[test]
    fn test_cell_budget() {
        assert!(GridMap::new(37, 118).is_ok());
        assert!(matches!(
            GridMap::new(100, 51),
            Err(MapError::TooManyCells(100, 51))
        ));
    }

    #[test]
    fn test_non_positive_dimentions_rejected() {
        // A malformed scenario can carry negative or zero dimentions, which
        // must not slip past the cell budget via a wrapped usize product
        assert!(matches!(
            GridMap::new(-1, 20),
            Err(MapError::InvalidDimensions(-1, 20))
        ));
        assert!(matches!(
            GridMap::new(20, -5),
            Err(MapError::InvalidDimensions(20, -5))
        ));
        assert!(matches!(
            GridMap::new(0, 10),
            Err(MapError::InvalidDimensions(0, 10))
        ));
    }

    #[test]
    fn test_obstacles_mark_cells() {
        let mut map = GridMap::new(20, 20).unwrap();
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(5, 5),
            GridPoint::new(8, 10),
        ));

        assert!(!map.is_passable(5, 5));
        assert!(!map.is_passable(8, 10));
        assert!(!map.is_passable(6, 7));
        assert!(map.is_passable(4, 5));
        assert!(map.is_passable(9, 10));

        // Out of bounds is never passable
        assert!(!map.is_passable(-1, 0));
        assert!(!map.is_passable(0, 20));
    }

    #[test]
    fn test_clearance() {
        let mut map = GridMap::new(20, 20).unwrap();
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(10, 10),
            GridPoint::new(12, 12),
        ));

        // Next to the obstacle on one axis
        assert!((map.clearance_gu(8, 11) - 2.0).abs() < 1e-12);

        // Diagonal from a corner combines both axes
        assert!((map.clearance_gu(7, 6) - 5.0).abs() < 1e-12);

        // Close to the wall the wall wins
        assert!((map.clearance_gu(1, 11) - 1.0).abs() < 1e-12);

        // Inside the obstacle the clearance is zero
        assert!(map.clearance_gu(11, 11) == 0.0);
    }

    #[test]
    fn test_wall_clearance_no_obstacles() {
        let map = GridMap::new(10, 10).unwrap();
        assert!((map.clearance_gu(1, 1) - 1.0).abs() < 1e-12);
        assert!((map.clearance_gu(5, 5) - 5.0).abs() < 1e-12);
        assert!(map.clearance_gu(0, 5) == 0.0);
    }
}
