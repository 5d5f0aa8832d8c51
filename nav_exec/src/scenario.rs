//! # Scenario
//!
//! The externally supplied description of a run: map dimentions, obstacle
//! rectangles, start and goal positions and the initial heading. The core
//! treats the scenario as immutable input.
//!
//! A scenario may also carry a precalculated route. This is an operator
//! escape hatch for running on the robot itself, where planning is slow: run
//! the program locally first and put the reduced route into the scenario
//! file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;

// Internal
use crate::auto::geom::{Angle, GridPoint, Rect};
use crate::auto::loc::Pose;
use crate::auto::map::{GridMap, MapError};
use crate::auto::path::Route;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An obstacle given by two opposite corners, in any order.
#[derive(Debug, Clone, Deserialize)]
pub struct Obstacle {
    pub corner_a_gu: [i8; 2],
    pub corner_b_gu: [i8; 2],
}

/// A full scenario description.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Width of the map
    pub map_width_gu: i8,

    /// Height of the map
    pub map_height_gu: i8,

    /// The obstacles on the map
    pub obstacles: Vec<Obstacle>,

    /// Start position of the robot
    pub start_gu: [i8; 2],

    /// Goal position
    pub goal_gu: [i8; 2],

    /// Initial heading of the robot
    pub initial_heading_deg: f64,

    /// Skip planning and follow `precalculated_route_gu` instead
    pub use_precalculated_route: bool,

    /// The route to follow when `use_precalculated_route` is set
    #[serde(default)]
    pub precalculated_route_gu: Vec<[i8; 2]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Scenario {
    /// Build the grid map described by this scenario.
    pub fn build_map(&self) -> Result<GridMap, MapError> {
        let mut map = GridMap::new(self.map_width_gu, self.map_height_gu)?;

        for obstacle in &self.obstacles {
            map.add_obstacle(Rect::from_corners(
                GridPoint::new(obstacle.corner_a_gu[0], obstacle.corner_a_gu[1]),
                GridPoint::new(obstacle.corner_b_gu[0], obstacle.corner_b_gu[1]),
            ));
        }

        Ok(map)
    }

    pub fn start_point(&self) -> GridPoint {
        GridPoint::new(self.start_gu[0], self.start_gu[1])
    }

    pub fn goal_point(&self) -> GridPoint {
        GridPoint::new(self.goal_gu[0], self.goal_gu[1])
    }

    /// The robot's pose at the start of the run.
    pub fn start_pose(&self) -> Pose {
        Pose::new(
            Vector2::new(self.start_gu[0] as f64, self.start_gu[1] as f64),
            Angle::from_degrees(self.initial_heading_deg),
        )
    }

    /// The operator supplied route.
    pub fn precalculated_route(&self) -> Route {
        Route::new(
            self.precalculated_route_gu
                .iter()
                .map(|p| GridPoint::new(p[0], p[1]))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn demo_scenario() -> Scenario {
        Scenario {
            map_width_gu: 37,
            map_height_gu: 118,
            obstacles: vec![
                Obstacle {
                    corner_a_gu: [23, 31],
                    corner_b_gu: [28, 40],
                },
                Obstacle {
                    corner_a_gu: [4, 86],
                    corner_b_gu: [12, 93],
                },
            ],
            start_gu: [28, 8],
            goal_gu: [6, 112],
            initial_heading_deg: -90.0,
            use_precalculated_route: false,
            precalculated_route_gu: vec![],
        }
    }

    #[test]
    fn test_build_map() {
        let map = demo_scenario().build_map().unwrap();
        assert!(!map.is_passable(25, 35));
        assert!(!map.is_passable(10, 90));
        assert!(map.is_passable(28, 8));
        assert!(map.is_passable(6, 112));
    }

    #[test]
    fn test_start_pose() {
        let pose = demo_scenario().start_pose();
        assert_eq!(pose.position_gu, Vector2::new(28.0, 8.0));
        assert_eq!(pose.heading.degrees(), -90.0);
    }

    #[test]
    fn test_scenario_from_toml() {
        let scenario: Scenario = toml::from_str(
            r#"
            map_width_gu = 10
            map_height_gu = 10
            start_gu = [1, 1]
            goal_gu = [8, 8]
            initial_heading_deg = 0.0
            use_precalculated_route = true
            precalculated_route_gu = [[1, 1], [8, 8]]

            [[obstacles]]
            corner_a_gu = [4, 6]
            corner_b_gu = [6, 4]
            "#,
        )
        .unwrap();

        assert_eq!(scenario.obstacles.len(), 1);
        let route = scenario.precalculated_route();
        assert_eq!(route.get_num_points(), 2);
        assert_eq!(route.points_gu[1], GridPoint::new(8, 8));
    }
}
