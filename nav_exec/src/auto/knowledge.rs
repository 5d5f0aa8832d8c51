//! # Motion and sensor knowledge base
//!
//! Holds the empirically calibrated knowledge about the robot dynamics: the
//! per-steering-angle displacement and heading tables, the steering
//! sloppiness and motion noise models, and the ray geometry of the two range
//! sensors.
//!
//! The tables were measured by hand and don't have to be 100% accurate, the
//! particle filter accommodates the residual error. Note that 1 gu ^= 5 cm.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use thiserror::Error;

// Internal
use super::geom::{Angle, Segment};
use super::loc::Pose;
use super::Action;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Every move that is known by the robot was executed with an action having
/// this duration.
pub const MOVE_DURATION_MS: f64 = 1000.0;

/// The robot can steer in the interval [-MAX_STEERING_DEG, MAX_STEERING_DEG].
pub const MAX_STEERING_DEG: i32 = 50;

/// Steering angles are only calibrated in multiples of this step.
pub const STEERING_STEP_DEG: i32 = 5;

/// Local displacement after one move, indexed by steering angle from
/// -MAX_STEERING_DEG to +MAX_STEERING_DEG in steps of STEERING_STEP_DEG.
const POSITION_KNOWLEDGE_GU: [(f64, f64); 21] = [
    (3.8, 0.0),
    (3.9, 0.7),
    (3.8, 1.3),
    (3.8, 1.7),
    (3.0, 2.9),
    (2.9, 2.8),
    (2.2, 3.3),
    (1.5, 3.6),
    (0.9, 3.8),
    (0.6, 5.3),
    (0.0, 5.0),
    (-0.6, 5.3),
    (-0.9, 3.8),
    (-1.5, 3.6),
    (-2.2, 3.3),
    (-2.9, 2.8),
    (-3.0, 2.9),
    (-3.8, 1.7),
    (-3.8, 1.3),
    (-3.9, 0.7),
    (-3.8, 0.0),
];

/// Heading change in degrees after one move, indexed as
/// [`POSITION_KNOWLEDGE_GU`].
const HEADING_KNOWLEDGE_DEG: [f64; 21] = [
    60.2, 54.36, 48.53, 42.7, 36.86, 31.03, 25.2, 19.36, 13.53, 7.7, 0.0, -7.7, -13.53, -19.36,
    -25.2, -31.03, -36.86, -42.7, -48.53, -54.36, -60.2,
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibrated constants of the motion noise, steering sloppiness and sensor
/// geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeParams {
    /// Mean of the gaussian noise on the x displacement
    pub x_move_noise_mean_gu: f64,

    /// Standard deviation of the gaussian noise on the x displacement
    pub x_move_noise_s_dev_gu: f64,

    /// Mean of the gaussian noise on the y displacement
    pub y_move_noise_mean_gu: f64,

    /// Standard deviation of the gaussian noise on the y displacement
    pub y_move_noise_s_dev_gu: f64,

    /// Mean of the gaussian noise on the heading change
    pub theta_turn_noise_mean_rad: f64,

    /// Standard deviation of the gaussian noise on the heading change
    pub theta_turn_noise_s_dev_rad: f64,

    /// Probability that the executed steering is 5 degrees more than
    /// requested
    pub prob_oversteer_five_deg: f64,

    /// Probability that the executed steering is 5 degrees less than
    /// requested
    pub prob_understeer_five_deg: f64,

    /// Total width of the front sensor's ray fan in degrees
    pub front_sensor_sector_deg: i32,

    /// Angular distance between neighbouring front sensor rays in degrees
    pub front_sensor_resolution_deg: i32,

    /// Total width of the back sensor's ray fan in degrees
    pub back_sensor_sector_deg: i32,

    /// Angular distance between neighbouring back sensor rays in degrees
    pub back_sensor_resolution_deg: i32,

    /// Mount point of the front sensor relative to the robot centre. A non
    /// zero x means the sensor does not point exactly in the direction of
    /// the robot.
    pub front_sensor_mount_offset_gu: [f64; 2],

    /// Mount point of the back sensor relative to the robot centre
    pub back_sensor_mount_offset_gu: [f64; 2],

    /// Maximum distance the range sensors can measure
    pub max_measure_gu: f64,

    /// Scale between internal grid units and the centimeters the physical
    /// sensors report
    pub measure_scale_cm_per_gu: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which of the two range sensors a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Front,
    Back,
}

/// Errors raised by the knowledge base. All of these indicate a programming
/// or calibration defect, not a runtime condition to route around.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error(
        "Steering angle {0} deg is not a multiple of {step} deg",
        step = STEERING_STEP_DEG
    )]
    SteeringNotMultipleOfStep(f64),

    #[error(
        "Steering angle {0} deg is outside [{min}, {max}] deg",
        min = -MAX_STEERING_DEG,
        max = MAX_STEERING_DEG
    )]
    SteeringOutOfRange(f64),

    #[error(
        "Motion knowledge is only calibrated for moves of {calibrated} ms, got {0} ms",
        calibrated = MOVE_DURATION_MS
    )]
    UncalibratedDuration(f64),

    #[error("The configured noise standard deviations must be non-negative")]
    InvalidNoiseParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KnowledgeParams {
    /// The pose reached after performing `action` from `start`.
    ///
    /// The requested steering is first perturbed by the sloppy steering
    /// model, the calibrated displacement for the executed angle is rotated
    /// into the world frame and applied, and finally independent gaussian
    /// noise is added to x, y and heading. This is the single source of
    /// motion stochasticity for both the particle filter and the simulated
    /// ground truth.
    pub fn state_after_move(
        &self,
        action: &Action,
        start: &Pose,
        rng: &mut StdRng,
    ) -> Result<Pose, KnowledgeError> {
        if action.duration_ms != MOVE_DURATION_MS {
            return Err(KnowledgeError::UncalibratedDuration(action.duration_ms));
        }
        let degrees = validate_steering(action.steering)?;
        let degrees = self.apply_sloppy_steering(degrees, rng);

        // Rotate the known displacement about (0, 0) by the start heading
        let (known_x, known_y) = POSITION_KNOWLEDGE_GU[table_index(degrees)];
        let theta = start.heading.radians();
        let mut x_new = known_x * theta.cos() + known_y * theta.sin();
        let mut y_new = -known_x * theta.sin() + known_y * theta.cos();
        x_new += start.position_gu[0];
        y_new += start.position_gu[1];
        let mut theta_new = theta + HEADING_KNOWLEDGE_DEG[table_index(degrees)].to_radians();

        // Add some noise
        let x_noise = Normal::new(self.x_move_noise_mean_gu, self.x_move_noise_s_dev_gu)
            .map_err(|_| KnowledgeError::InvalidNoiseParams)?;
        let y_noise = Normal::new(self.y_move_noise_mean_gu, self.y_move_noise_s_dev_gu)
            .map_err(|_| KnowledgeError::InvalidNoiseParams)?;
        let theta_noise = Normal::new(self.theta_turn_noise_mean_rad, self.theta_turn_noise_s_dev_rad)
            .map_err(|_| KnowledgeError::InvalidNoiseParams)?;
        x_new += x_noise.sample(rng);
        y_new += y_noise.sample(rng);
        theta_new += theta_noise.sample(rng);

        Ok(Pose {
            position_gu: Vector2::new(x_new, y_new),
            heading: Angle::from_radians(theta_new),
        })
    }

    /// Perturb a requested steering angle by the sloppy steering model.
    ///
    /// A single uniform draw decides whether the executed angle is 5 degrees
    /// more or less than requested, always clamped to the valid range.
    pub fn apply_sloppy_steering(&self, degrees: i32, rng: &mut StdRng) -> i32 {
        let mut degrees = degrees;
        let draw: f64 = rng.gen();
        if draw < self.prob_oversteer_five_deg && degrees < MAX_STEERING_DEG {
            degrees += STEERING_STEP_DEG;
        }
        if draw > 1.0 - self.prob_understeer_five_deg && degrees > -MAX_STEERING_DEG {
            degrees -= STEERING_STEP_DEG;
        }
        degrees
    }

    /// The ray fan sent out by the given sensor at the given pose.
    ///
    /// Each ray is a segment from the robot centre to the sensor's mount
    /// point rotated by the ray's angular offset plus the robot heading.
    /// Rays should be interpreted as half straights extending over the
    /// second point of the segment.
    pub fn sensor_rays(&self, sensor: Sensor, pose: &Pose) -> Vec<Segment> {
        let (sector_deg, resolution_deg, mount_offset) = match sensor {
            Sensor::Front => (
                self.front_sensor_sector_deg,
                self.front_sensor_resolution_deg,
                self.front_sensor_mount_offset_gu,
            ),
            Sensor::Back => (
                self.back_sensor_sector_deg,
                self.back_sensor_resolution_deg,
                self.back_sensor_mount_offset_gu,
            ),
        };

        let base = pose.position_gu;
        let mut rays = Vec::new();

        let mut theta_offset_deg = -sector_deg / 2;
        while theta_offset_deg <= sector_deg / 2 {
            // Rotate the mount point offset by the ray offset plus the robot
            // heading
            let theta = pose.heading.radians() + (theta_offset_deg as f64).to_radians();
            let x_new = mount_offset[0] * theta.cos() + mount_offset[1] * theta.sin() + base[0];
            let y_new = -mount_offset[0] * theta.sin() + mount_offset[1] * theta.cos() + base[1];
            rays.push(Segment::new(base, Vector2::new(x_new, y_new)));

            theta_offset_deg += resolution_deg;
        }

        rays
    }

    /// What the physical robot would report for a distance determined on the
    /// internal map. The internal representation works in grid units of 5 cm
    /// but the robot measures actual centimeters.
    pub fn measurement_cm(&self, distance_gu: f64) -> i32 {
        (distance_gu.round() * self.measure_scale_cm_per_gu) as i32
    }
}

impl Default for KnowledgeParams {
    /// The hand-calibrated values for the robot.
    fn default() -> Self {
        Self {
            x_move_noise_mean_gu: 0.0,
            x_move_noise_s_dev_gu: 2.0,
            y_move_noise_mean_gu: 0.0,
            y_move_noise_s_dev_gu: 2.0,
            theta_turn_noise_mean_rad: 0.0,
            // pi / 30 ^= 6 deg
            theta_turn_noise_s_dev_rad: std::f64::consts::PI / 30.0,
            prob_oversteer_five_deg: 0.125,
            prob_understeer_five_deg: 0.125,
            front_sensor_sector_deg: 30,
            front_sensor_resolution_deg: 20,
            back_sensor_sector_deg: 30,
            back_sensor_resolution_deg: 20,
            front_sensor_mount_offset_gu: [0.0, 1.0],
            back_sensor_mount_offset_gu: [0.0, -5.4],
            max_measure_gu: 40.0,
            measure_scale_cm_per_gu: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check a steering angle is a calibrated one and return it as an integer.
fn validate_steering(steering: Angle) -> Result<i32, KnowledgeError> {
    let degrees = steering.degrees();
    if degrees % STEERING_STEP_DEG as f64 != 0.0 {
        return Err(KnowledgeError::SteeringNotMultipleOfStep(degrees));
    }
    let degrees = degrees as i32;
    if degrees > MAX_STEERING_DEG || degrees < -MAX_STEERING_DEG {
        return Err(KnowledgeError::SteeringOutOfRange(steering.degrees()));
    }
    Ok(degrees)
}

/// Index into the knowledge tables for a valid steering angle.
fn table_index(degrees: i32) -> usize {
    ((degrees + MAX_STEERING_DEG) / STEERING_STEP_DEG) as usize
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
