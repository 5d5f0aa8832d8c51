//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the planned
//! route. A PID controller operates on the signed cross-track error, i.e.
//! how far off the route the believed pose is and on which side, and turns
//! it into a steering command.
//!
//! The output is rounded to the robot's steering step and clamped to its
//! steering range, since only discretised steering angles are calibrated in
//! the knowledge base.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::geom::{cross_track_error, Angle, Segment};
use super::knowledge::MOVE_DURATION_MS;
use super::loc::Pose;
use super::Action;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory controller parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TrajCtrlParams {
    /// Proportional gain
    pub p_value: f64,

    /// Integral gain
    pub i_value: f64,

    /// Derivative gain. This wants to be relatively high since a steering in
    /// the past influences the future very much through the heading change.
    pub d_value: f64,

    /// The PID output is rounded and multiplied by this to only generate
    /// valid steering angles (multiples of this step). Changing it means the
    /// gains have to be re-tuned.
    pub steering_step_deg: f64,

    /// The robot can steer in [-max_steering_deg, max_steering_deg]
    pub max_steering_deg: f64,
}

/// The PID trajectory controller.
pub struct TrajCtrl {
    params: TrajCtrlParams,

    /// Accumulated errors
    integral: f64,

    /// Previous error measurement
    previous_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    pub fn new(params: TrajCtrlParams) -> Self {
        Self {
            params,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Determine the action to perform in order to stick to the route.
    pub fn control(&mut self, pose: &Pose, segments: &[Segment]) -> Action {
        // Measure the signed distance to the route
        let error = cross_track_error(&pose.position_gu, segments);

        // Signed difference between the current and the last measurement
        let derivative = error - self.previous_error;

        self.previous_error = error;
        self.integral += error;

        let result = (self.params.p_value * error)
            + (self.params.i_value * self.integral)
            + (self.params.d_value * derivative);

        // Round to the steering step
        let mut result = result.round() * self.params.steering_step_deg;
        // Keep in the steering interval
        result = result.min(self.params.max_steering_deg);
        result = result.max(-self.params.max_steering_deg);

        Action::new(MOVE_DURATION_MS, Angle::from_degrees(result))
    }
}

impl Default for TrajCtrlParams {
    /// The experimentally tuned gains. The ratios always came out at about
    /// p * 7.5 = d and p = 40 * i.
    fn default() -> Self {
        Self {
            p_value: 0.13,
            i_value: 0.004,
            d_value: 1.0,
            steering_step_deg: 5.0,
            max_steering_deg: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
