//! # Autonomy module
//!
//! This module contains everything needed to drive the robot from its start
//! pose to the goal: the grid map, the A* path planner and Douglas-Peucker
//! simplifier, the motion/sensor knowledge base, the virtual range sensor,
//! the particle filter and the trajectory controller.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Geometric value types - angles, grid points, rectangles and segments
pub mod geom;

/// Motion and sensor knowledge base - the calibrated robot dynamics
pub mod knowledge;

/// Localisation - the particle filter and pose types
pub mod loc;

/// Grid map - occupancy grid and clearance queries
pub mod map;

/// Navigation - path planning and path simplification
pub mod nav;

/// Route - the planned polyline the robot is to follow
pub mod path;

/// Virtual range sensor - ray cast distance measurements on the grid map
pub mod sensor;

/// Trajectory control - PID steering off the cross-track error
pub mod traj_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use self::geom::Angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single discrete motion command - drive with the given steering angle for
/// the given duration.
///
/// All calibrated motion knowledge assumes the duration is
/// [`knowledge::MOVE_DURATION_MS`], so in practice the duration never varies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Action {
    /// The duration of the move in milliseconds
    pub duration_ms: f64,

    /// The steering angle to hold during the move
    pub steering: Angle,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Action {
    pub fn new(duration_ms: f64, steering: Angle) -> Self {
        Self {
            duration_ms,
            steering,
        }
    }
}
