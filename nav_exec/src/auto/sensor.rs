//! # Virtual range sensor
//!
//! Simulates the robot's two range sensors against the grid map by ray
//! casting. Used by the particle filter to compute the reading each particle
//! would believe, and in simulation mode as the source of the "actual"
//! measurement.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::geom::Segment;
use super::knowledge::{KnowledgeParams, Sensor};
use super::loc::Pose;
use super::map::GridMap;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// What is measured if no obstacle is detected. 1 gu ^= 5 cm
const NOTHING_RECOGNIZED_MEASURE_GU: f64 = 51.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A range sensor working on the robot's internal map rather than the
/// physical world.
pub struct VirtualRangeSensor<'a> {
    map: &'a GridMap,
    knowledge: &'a KnowledgeParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> VirtualRangeSensor<'a> {
    pub fn new(map: &'a GridMap, knowledge: &'a KnowledgeParams) -> Self {
        Self { map, knowledge }
    }

    /// What the front sensor would measure at the given pose, in
    /// centimeters.
    pub fn measure_front_cm(&self, pose: &Pose) -> i32 {
        self.sense(&self.knowledge.sensor_rays(Sensor::Front, pose), pose)
    }

    /// What the back sensor would measure at the given pose, in centimeters.
    pub fn measure_back_cm(&self, pose: &Pose) -> i32 {
        self.sense(&self.knowledge.sensor_rays(Sensor::Back, pose), pose)
    }

    /// Step each ray outwards until it leaves passable area or exceeds the
    /// maximum range, and report the minimum distance over the fan.
    fn sense(&self, rays: &[Segment], pose: &Pose) -> i32 {
        let max_measure_gu = self.knowledge.max_measure_gu;

        // Minimum measure of all rays in the fan
        let mut min_gu = max_measure_gu;

        // The local clearance is known, so each ray can skip that far before
        // stepping cell by cell
        let clearance_gu = self
            .map
            .clearance_gu(pose.position_gu[0] as i8, pose.position_gu[1] as i8);

        for ray in rays {
            // Step vector keeping the direction's dx/dy ratio, with the
            // greater component normalised to 1 or -1
            let mut dx = ray.end_gu[0] - ray.start_gu[0];
            let mut dy = ray.end_gu[1] - ray.start_gu[1];
            if dx.abs() > dy.abs() {
                dy /= dx.abs();
                dx = if dx > 0.0 { 1.0 } else { -1.0 };
            } else {
                dx /= dy.abs();
                dy = if dy > 0.0 { 1.0 } else { -1.0 };
            }

            // The traced point, offset further and further by (dx, dy)
            let mut current_x = ray.end_gu[0];
            let mut current_y = ray.end_gu[1];

            // Skip the known clearance
            let one_step_gu = (dx * dx + dy * dy).sqrt();
            current_x += (clearance_gu / one_step_gu) * dx;
            current_y += (clearance_gu / one_step_gu) * dy;

            let distance_gu = loop {
                current_x += dx;
                current_y += dy;

                let travelled_gu = distance(ray.end_gu[0], ray.end_gu[1], current_x, current_y);
                if !self.map.is_passable(current_x as i8, current_y as i8)
                    || travelled_gu >= max_measure_gu
                {
                    break travelled_gu;
                }
            };

            let distance_gu = if distance_gu >= max_measure_gu {
                // The ray hit nothing within range
                NOTHING_RECOGNIZED_MEASURE_GU
            } else {
                distance_gu
            };

            if distance_gu < min_gu {
                min_gu = distance_gu;
            }
        }

        // Convert to actual centimeters to be comparable with a physical
        // measurement
        self.knowledge.measurement_cm(min_gu)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn distance(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::geom::{Angle, GridPoint, Rect};
    use nalgebra::Vector2;

    /// Knowledge with a single central ray per sensor, to make the expected
    /// distances easy to derive
    fn single_ray_knowledge() -> KnowledgeParams {
        KnowledgeParams {
            front_sensor_sector_deg: 0,
            back_sensor_sector_deg: 0,
            ..Default::default()
        }
    }

    fn pose(x: f64, y: f64, heading_deg: f64) -> Pose {
        Pose {
            position_gu: Vector2::new(x, y),
            heading: Angle::from_degrees(heading_deg),
        }
    }

    #[test]
    fn test_wall_ahead() {
        let map = GridMap::new(20, 20).unwrap();
        let knowledge = single_ray_knowledge();
        let sensor = VirtualRangeSensor::new(&map, &knowledge);

        // Heading 0 points along +y, the front mount point is (10, 6), the
        // wall is left at y = 20, so the ray travels 14 gu
        let reading = sensor.measure_front_cm(&pose(10.0, 5.0, 0.0));
        assert_eq!(reading, 70);
    }

    #[test]
    fn test_obstacle_ahead_beats_wall() {
        let mut map = GridMap::new(20, 20).unwrap();
        map.add_obstacle(Rect::from_corners(
            GridPoint::new(8, 12),
            GridPoint::new(12, 14),
        ));
        let knowledge = single_ray_knowledge();
        let sensor = VirtualRangeSensor::new(&map, &knowledge);

        // The obstacle starts at y = 12, the ray leaves (10, 6), so it
        // travels 6 gu
        let reading = sensor.measure_front_cm(&pose(10.0, 5.0, 0.0));
        assert_eq!(reading, 30);
    }

    #[test]
    fn test_nothing_within_range() {
        // 37 x 118 fits in the cell budget and leaves more than the maximum
        // range of open space ahead
        let map = GridMap::new(37, 118).unwrap();
        let knowledge = single_ray_knowledge();
        let sensor = VirtualRangeSensor::new(&map, &knowledge);

        // Nothing within 40 gu, the fan minimum saturates at the maximum
        // measure
        let reading = sensor.measure_front_cm(&pose(18.0, 10.0, 0.0));
        assert_eq!(reading, 200);
    }

    #[test]
    fn test_back_sensor_looks_behind() {
        let map = GridMap::new(20, 40).unwrap();
        let knowledge = single_ray_knowledge();
        let sensor = VirtualRangeSensor::new(&map, &knowledge);

        // At (10, 10) heading 0 the back wall is much closer than the front
        // one. The back mount sits at (10, 4.6), the clearance skip is
        // 10 gu, and the next step crosses y = 0, giving 11 gu travelled.
        let back = sensor.measure_back_cm(&pose(10.0, 10.0, 0.0));
        assert_eq!(back, 55);

        // The front mount sits at (10, 11) and the far wall is at y = 40
        let front = sensor.measure_front_cm(&pose(10.0, 10.0, 0.0));
        assert_eq!(front, 145);
    }
}
