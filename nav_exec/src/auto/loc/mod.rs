//! # Localisation module
//!
//! Maintains the robot's belief about its own pose as a set of weighted
//! particles: after every move the particles are advanced through the
//! stochastic motion model, reweighted against the actual sensor readings
//! and resampled. The control loop never touches the particles directly, it
//! only asks for the derived reference pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

// Internal
use super::geom::Angle;
use super::knowledge::{KnowledgeError, KnowledgeParams};
use super::sensor::VirtualRangeSensor;
use super::Action;
use util::maths::{gaussian, normalize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the robot on the grid map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pose {
    /// The position in grid units
    pub position_gu: Vector2<f64>,

    /// The heading, with 0 deg pointing along +y and positive angles turning
    /// towards -x
    pub heading: Angle,
}

/// Localisation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LocParams {
    /// Number of particles. The higher this value is, the longer each
    /// resampling step takes.
    pub num_particles: usize,

    /// Mean of the gaussian used to weight a particle from its squared
    /// sensor error
    pub error_mean: f64,

    /// Standard deviation of the gaussian used to weight a particle from
    /// its squared sensor error
    pub error_s_dev: f64,
}

/// The particle filter - N pose hypotheses with co-indexed weights.
///
/// Exactly `num_particles` particles exist at all times. The set is created
/// once at the start pose with uniform weights and replaced wholesale each
/// resampling step.
pub struct ParticleFilter {
    params: LocParams,
    poses: Vec<Pose>,
    weights: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(position_gu: Vector2<f64>, heading: Angle) -> Self {
        Self {
            position_gu,
            heading,
        }
    }
}

impl ParticleFilter {
    /// Create a new filter with every particle at the start pose and a
    /// uniform weight.
    pub fn new(params: LocParams, start: Pose) -> Self {
        let num = params.num_particles;
        Self {
            params,
            poses: vec![start; num],
            weights: vec![1.0 / num as f64; num],
        }
    }

    pub fn num_particles(&self) -> usize {
        self.poses.len()
    }

    /// The pose that represents the current particle set best.
    ///
    /// This is a weighted average and does not necessarily have to be a
    /// particle itself. The heading is averaged as a weighted sum in
    /// radians, which is a known approximation - it is only accurate while
    /// the particles are angularly clustered.
    pub fn reference_pose(&self) -> Pose {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut heading_rad = 0.0;

        for (pose, weight) in self.poses.iter().zip(self.weights.iter()) {
            x += pose.position_gu[0] * weight;
            y += pose.position_gu[1] * weight;
            heading_rad += pose.heading.radians() * weight;
        }

        Pose::new(Vector2::new(x, y), Angle::from_radians(heading_rad))
    }

    /// Advance every particle through the stochastic motion model with the
    /// same commanded action.
    pub fn predict(
        &mut self,
        knowledge: &KnowledgeParams,
        action: &Action,
        rng: &mut StdRng,
    ) -> Result<(), KnowledgeError> {
        for pose in self.poses.iter_mut() {
            *pose = knowledge.state_after_move(action, pose, rng)?;
        }
        Ok(())
    }

    /// Reweight the particles against the actual sensor readings and
    /// resample them, duplicating plausible particles and dropping
    /// implausible ones while keeping the total count.
    pub fn resample(
        &mut self,
        actual_front_cm: i32,
        actual_back_cm: i32,
        sensor: &VirtualRangeSensor,
        rng: &mut StdRng,
    ) {
        let num = self.poses.len();

        // Weight each particle by comparing the actual readings with the
        // ones the particle would believe
        let mut weights = vec![0.0; num];
        for (i, pose) in self.poses.iter().enumerate() {
            let believed_front_cm = sensor.measure_front_cm(pose);
            let believed_back_cm = sensor.measure_back_cm(pose);
            let error_front = (believed_front_cm - actual_front_cm).abs();
            let error_back = (believed_back_cm - actual_back_cm).abs();
            weights[i] = gaussian(
                self.params.error_mean,
                self.params.error_s_dev,
                (error_front * error_front + error_back * error_back) as f64,
            );
        }
        normalize(&mut weights);

        // Accumulate the weights
        let mut cumulative = vec![0.0; num];
        let mut sum = 0.0;
        for (i, weight) in weights.iter().enumerate() {
            cumulative[i] = sum + weight;
            sum += weight;
        }

        // Select the new generation: draw a uniform sample per slot and
        // linearly scan the cumulative weights for it
        let mut new_poses = Vec::with_capacity(num);
        let mut new_weights = Vec::with_capacity(num);
        for _ in 0..num {
            let search_for: f64 = rng.gen();
            let mut index = 0;
            while index < num - 1 && cumulative[index] < search_for {
                index += 1;
            }
            new_poses.push(self.poses[index]);
            new_weights.push(weights[index]);
        }

        // Replace the whole set atomically and re-normalise the carried
        // over weights
        normalize(&mut new_weights);
        self.poses = new_poses;
        self.weights = new_weights;
    }
}

impl Default for LocParams {
    /// The calibrated localisation constants.
    fn default() -> Self {
        Self {
            num_particles: 50,
            error_mean: 0.0,
            error_s_dev: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::geom::{GridPoint, Rect};
    use crate::auto::knowledge::MOVE_DURATION_MS;
    use crate::auto::map::GridMap;
    use rand::SeedableRng;

    fn params(num_particles: usize) -> LocParams {
        LocParams {
            num_particles,
            error_mean: 0.0,
            error_s_dev: 100.0,
        }
    }

    fn noiseless_knowledge() -> KnowledgeParams {
        KnowledgeParams {
            x_move_noise_s_dev_gu: 0.0,
            y_move_noise_s_dev_gu: 0.0,
            theta_turn_noise_s_dev_rad: 0.0,
            prob_oversteer_five_deg: 0.0,
            prob_understeer_five_deg: 0.0,
            ..Default::default()
        }
    }

    fn origin() -> Pose {
        Pose::new(Vector2::new(0.0, 0.0), Angle::from_degrees(0.0))
    }

    #[test]
    fn test_default_params_are_calibrated() {
        let defaults = LocParams::default();
        assert_eq!(defaults.num_particles, 50);
        assert_eq!(defaults.error_mean, 0.0);
        assert_eq!(defaults.error_s_dev, 100.0);
    }

    #[test]
    fn test_initial_reference_is_start() {
        let start = Pose::new(Vector2::new(3.0, 4.0), Angle::from_degrees(45.0));
        let filter = ParticleFilter::new(params(50), start);

        let reference = filter.reference_pose();
        assert!((reference.position_gu[0] - 3.0).abs() < 1e-9);
        assert!((reference.position_gu[1] - 4.0).abs() < 1e-9);
        assert!((reference.heading.degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_particle_noiseless_predict() {
        let knowledge = noiseless_knowledge();
        let mut filter = ParticleFilter::new(params(1), origin());
        let mut rng = StdRng::seed_from_u64(1);

        let action = Action::new(MOVE_DURATION_MS, Angle::from_degrees(0.0));
        filter.predict(&knowledge, &action, &mut rng).unwrap();

        // A 0 deg move from the origin at heading 0 lands exactly on the
        // calibrated (0, 5) displacement with no heading change
        let reference = filter.reference_pose();
        assert!((reference.position_gu[0] - 0.0).abs() < 1e-12);
        assert!((reference.position_gu[1] - 5.0).abs() < 1e-12);
        assert!(reference.heading.degrees().abs() < 1e-12);
    }

    #[test]
    fn test_resample_preserves_count_and_copies() {
        let mut map = GridMap::new(20, 20).unwrap();
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(0, 15),
            GridPoint::new(19, 16),
        ));
        let knowledge = KnowledgeParams::default();
        let sensor = VirtualRangeSensor::new(&map, &knowledge);

        let mut filter = ParticleFilter::new(params(25), origin());
        let mut rng = StdRng::seed_from_u64(99);

        // Spread the particles out so the input set is not degenerate
        let action = Action::new(MOVE_DURATION_MS, Angle::from_degrees(5.0));
        filter.predict(&knowledge, &action, &mut rng).unwrap();
        let before = filter.poses.clone();

        filter.resample(60, 80, &sensor, &mut rng);

        assert_eq!(filter.num_particles(), 25);

        // Every output particle is a copy of some input particle, never an
        // interpolation
        for pose in &filter.poses {
            assert!(before.iter().any(|b| {
                b.position_gu == pose.position_gu && b.heading == pose.heading
            }));
        }

        // Weights remain a distribution
        let sum: f64 = filter.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_pose_weighted_mean() {
        let mut filter = ParticleFilter::new(params(2), origin());
        filter.poses[0] = Pose::new(Vector2::new(0.0, 0.0), Angle::from_degrees(0.0));
        filter.poses[1] = Pose::new(Vector2::new(4.0, 8.0), Angle::from_degrees(40.0));
        filter.weights = vec![0.75, 0.25];

        let reference = filter.reference_pose();
        assert!((reference.position_gu[0] - 1.0).abs() < 1e-12);
        assert!((reference.position_gu[1] - 2.0).abs() < 1e-12);
        assert!((reference.heading.degrees() - 10.0).abs() < 1e-9);
    }
}
