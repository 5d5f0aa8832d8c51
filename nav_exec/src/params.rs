//! Executable-level parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::driver::DriverMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the navigation executable's control loop.
#[derive(Debug, Clone, Deserialize)]
pub struct NavExecParams {
    /// Which driver variant to run against
    pub driver_mode: DriverMode,

    /// Minimum clearance the planner keeps to walls and obstacles
    pub min_clearance_gu: f64,

    /// Douglas-Peucker tolerance for the route reduction. No discarded
    /// route point is further than this from the reduced route.
    pub simplify_tolerance_gu: f64,

    /// The run terminates once the believed position is within this
    /// distance of the goal
    pub goal_tolerance_gu: f64,

    /// Hard cap on the number of control loop iterations, so the run
    /// terminates even if the belief never converges on the goal
    pub max_steps: usize,

    /// Seed for the random source threaded through the particle filter's
    /// motion noise and resampling draws
    pub motion_seed: u64,

    /// Seed for the simulated driver's own actuation noise
    pub sim_seed: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavExecParams {
    /// The calibrated control loop constants, as shipped in the default
    /// parameter file.
    fn default() -> Self {
        Self {
            driver_mode: DriverMode::Sim,
            min_clearance_gu: 4.0,
            simplify_tolerance_gu: 1.0,
            goal_tolerance_gu: 5.0,
            max_steps: 500,
            motion_seed: 2891,
            sim_seed: 1748,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_params_are_calibrated() {
        let defaults = NavExecParams::default();
        assert!(matches!(defaults.driver_mode, DriverMode::Sim));
        assert_eq!(defaults.min_clearance_gu, 4.0);
        assert_eq!(defaults.goal_tolerance_gu, 5.0);
        assert_eq!(defaults.max_steps, 500);
    }
}
