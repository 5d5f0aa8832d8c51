//! # Route
//!
//! This module defines the route the robot is to follow: the ordered grid
//! point sequence produced by the planner (and reduced by the simplifier),
//! plus the conversion into the line segments the trajectory controller
//! consumes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::geom::{GridPoint, Segment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A route defining the desired trajectory of the robot.
///
/// Computed once per run before the control loop starts, immutable
/// thereafter.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Route {
    pub points_gu: Vec<GridPoint>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Route {
    pub fn new(points_gu: Vec<GridPoint>) -> Self {
        Self { points_gu }
    }

    /// The segments joining each pair of neighbouring route points, in
    /// order.
    pub fn segments(&self) -> Vec<Segment> {
        self.points_gu
            .windows(2)
            .map(|points| Segment::between_grid_points(points[0], points[1]))
            .collect()
    }

    /// Return the length of the route.
    ///
    /// If the route is empty (not enough points) then `None` is returned.
    pub fn get_length_gu(&self) -> Option<f64> {
        if self.points_gu.len() < 2 {
            return None;
        }

        Some(self.segments().iter().map(|s| s.length_gu()).sum())
    }

    /// Get the number of points in the route
    pub fn get_num_points(&self) -> usize {
        self.points_gu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_gu.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
