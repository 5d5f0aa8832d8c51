//! # Driver module
//!
//! The driver is the actuation/sensing collaborator of the control loop: it
//! executes one action at a time and answers the two distance queries. It
//! comes in two variants selected by configuration - a simulated robot
//! driven through the same motion model the particle filter uses, and the
//! physical robot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

// Internal
use crate::auto::knowledge::{KnowledgeError, KnowledgeParams};
use crate::auto::loc::Pose;
use crate::auto::map::GridMap;
use crate::auto::sensor::VirtualRangeSensor;
use crate::auto::Action;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated robot.
///
/// Owns the ground-truth pose, which it advances through the stochastic
/// motion model on every executed action. The ground truth is tracked
/// separately from the particle filter's belief, the two only meet through
/// the sensor readings.
pub struct SimDriver<'a> {
    truth: Pose,
    sensor: VirtualRangeSensor<'a>,
    knowledge: &'a KnowledgeParams,
    rng: StdRng,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which driver variant the control loop talks to.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum DriverMode {
    /// Simulated robot on the internal map
    Sim,

    /// The physical robot
    Hardware,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("The motion model rejected the action: {0}")]
    InvalidAction(#[from] KnowledgeError),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The actuation/sensing capability the control loop drives the robot
/// through.
///
/// Both calls are synchronous - `execute` blocks until the move is complete,
/// the measure queries block until a measurement is available. Steering is
/// applied before translation, matching the calibration assumptions of the
/// knowledge base.
pub trait Driver {
    /// Perform one action.
    fn execute(&mut self, action: &Action) -> Result<(), DriverError>;

    /// The front distance measurement in centimeters.
    fn measure_front_cm(&mut self) -> Result<i32, DriverError>;

    /// The back distance measurement in centimeters.
    fn measure_back_cm(&mut self) -> Result<i32, DriverError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> SimDriver<'a> {
    /// Create a new simulated robot at the given ground-truth start pose.
    ///
    /// The driver keeps its own seeded random source so the simulated
    /// actuation noise is reproducible independently of the filter's draws.
    pub fn new(
        start: Pose,
        map: &'a GridMap,
        knowledge: &'a KnowledgeParams,
        seed: u64,
    ) -> Self {
        Self {
            truth: start,
            sensor: VirtualRangeSensor::new(map, knowledge),
            knowledge,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The ground-truth pose, for logging and analysis only. The control
    /// loop must never see this.
    pub fn truth_pose(&self) -> Pose {
        self.truth
    }
}

impl<'a> Driver for SimDriver<'a> {
    fn execute(&mut self, action: &Action) -> Result<(), DriverError> {
        self.truth = self
            .knowledge
            .state_after_move(action, &self.truth, &mut self.rng)?;
        Ok(())
    }

    fn measure_front_cm(&mut self) -> Result<i32, DriverError> {
        Ok(self.sensor.measure_front_cm(&self.truth))
    }

    fn measure_back_cm(&mut self) -> Result<i32, DriverError> {
        Ok(self.sensor.measure_back_cm(&self.truth))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::geom::Angle;
    use crate::auto::knowledge::MOVE_DURATION_MS;
    use nalgebra::Vector2;

    #[test]
    fn test_sim_driver_advances_truth() {
        let map = GridMap::new(37, 118).unwrap();
        let knowledge = KnowledgeParams {
            x_move_noise_s_dev_gu: 0.0,
            y_move_noise_s_dev_gu: 0.0,
            theta_turn_noise_s_dev_rad: 0.0,
            prob_oversteer_five_deg: 0.0,
            prob_understeer_five_deg: 0.0,
            ..Default::default()
        };

        let start = Pose::new(Vector2::new(10.0, 10.0), Angle::from_degrees(0.0));
        let mut driver = SimDriver::new(start, &map, &knowledge, 42);

        let action = Action::new(MOVE_DURATION_MS, Angle::from_degrees(0.0));
        driver.execute(&action).unwrap();

        let truth = driver.truth_pose();
        assert!((truth.position_gu[0] - 10.0).abs() < 1e-12);
        assert!((truth.position_gu[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_sim_driver_measures_truth() {
        let map = GridMap::new(20, 20).unwrap();
        let knowledge = KnowledgeParams {
            front_sensor_sector_deg: 0,
            back_sensor_sector_deg: 0,
            ..Default::default()
        };

        let start = Pose::new(Vector2::new(10.0, 5.0), Angle::from_degrees(0.0));
        let mut driver = SimDriver::new(start, &map, &knowledge, 42);

        // Same reading the virtual sensor gives for the ground-truth pose
        assert_eq!(driver.measure_front_cm().unwrap(), 70);
    }

    #[test]
    fn test_invalid_action_is_rejected() {
        let map = GridMap::new(20, 20).unwrap();
        let knowledge = KnowledgeParams::default();
        let start = Pose::new(Vector2::new(10.0, 10.0), Angle::from_degrees(0.0));
        let mut driver = SimDriver::new(start, &map, &knowledge, 42);

        let action = Action::new(MOVE_DURATION_MS, Angle::from_degrees(7.0));
        assert!(matches!(
            driver.execute(&action),
            Err(DriverError::InvalidAction(_))
        ));
    }
}
