//! # Geometric value types
//!
//! Angles, grid points, axis-aligned rectangles and bounded line segments,
//! along with the signed point-to-segment distance used by both the path
//! simplifier and the trajectory controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::norm;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PI_HALF: f64 = std::f64::consts::FRAC_PI_2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An angle, stored in degrees and normalised to the range (-180, 180].
///
/// Construction and arithmetic always re-normalise, so an `Angle` can never
/// hold an out of range value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    deg: f64,
}

/// A point on the grid map.
///
/// Coordinates are deliberately kept in a signed byte domain, the total cell
/// count of a map is bounded (see [`crate::auto::map`]) so a byte is always
/// enough to address any cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x_gu: i8,
    pub y_gu: i8,
}

/// An axis-aligned rectangle on the grid map, used to describe obstacles.
///
/// Built from two opposite corners in any order, the min/max bounds are
/// derived on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub x_min_gu: i8,
    pub x_max_gu: i8,
    pub y_min_gu: i8,
    pub y_max_gu: i8,
}

/// A bounded line segment between two continuous points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub start_gu: Vector2<f64>,
    pub end_gu: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Angle {
    /// Create a new angle from a value in degrees.
    pub fn from_degrees(deg: f64) -> Self {
        Self { deg }.normalised()
    }

    /// Create a new angle from a value in radians.
    pub fn from_radians(rad: f64) -> Self {
        Self::from_degrees(rad.to_degrees())
    }

    /// The angle in degrees, in (-180, 180].
    pub fn degrees(&self) -> f64 {
        self.deg
    }

    /// The angle in radians.
    pub fn radians(&self) -> f64 {
        self.deg.to_radians()
    }

    fn normalised(self) -> Self {
        let mut deg = self.deg;
        while deg <= -180.0 {
            deg += 360.0;
        }
        while deg > 180.0 {
            deg -= 360.0;
        }
        Self { deg }
    }
}

impl std::ops::Add for Angle {
    type Output = Angle;

    fn add(self, other: Angle) -> Angle {
        Angle::from_degrees(self.deg + other.deg)
    }
}

impl std::ops::Sub for Angle {
    type Output = Angle;

    fn sub(self, other: Angle) -> Angle {
        Angle::from_degrees(self.deg - other.deg)
    }
}

impl GridPoint {
    pub fn new(x_gu: i8, y_gu: i8) -> Self {
        Self { x_gu, y_gu }
    }

    /// Euclidean distance between two grid points.
    ///
    /// The unwrap here is safe since both points have the same dimentions.
    pub fn distance_to(&self, other: &GridPoint) -> f64 {
        norm(
            &[self.x_gu as f64, self.y_gu as f64],
            &[other.x_gu as f64, other.y_gu as f64],
        )
        .unwrap()
    }

    /// The point as a continuous position vector.
    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x_gu as f64, self.y_gu as f64)
    }
}

impl Rect {
    /// Build a rectangle from two opposite corners, given in any order.
    pub fn from_corners(a: GridPoint, b: GridPoint) -> Self {
        Self {
            x_min_gu: a.x_gu.min(b.x_gu),
            x_max_gu: a.x_gu.max(b.x_gu),
            y_min_gu: a.y_gu.min(b.y_gu),
            y_max_gu: a.y_gu.max(b.y_gu),
        }
    }
}

impl Segment {
    pub fn new(start_gu: Vector2<f64>, end_gu: Vector2<f64>) -> Self {
        Self { start_gu, end_gu }
    }

    /// Build a segment between two grid points.
    pub fn between_grid_points(start: GridPoint, end: GridPoint) -> Self {
        Self::new(start.as_vector(), end.as_vector())
    }

    /// The length of the segment.
    pub fn length_gu(&self) -> f64 {
        (self.end_gu - self.start_gu).norm()
    }

    /// Signed distance from a point to this (bounded) segment.
    ///
    /// The sign indicates which side of the directed segment the point lies
    /// on. If the point's projection falls beyond either endpoint the
    /// magnitude is the distance to the nearer endpoint rather than the
    /// distance to the infinite line.
    pub fn signed_distance_to(&self, point: &Vector2<f64>) -> f64 {
        // Side lengths of the triangle given by the point and the two
        // segment endpoints
        let a = (point - self.start_gu).norm();
        let b = (point - self.end_gu).norm();
        let c = self.length_gu();

        // Degenerate cases, the point sits on an endpoint or the segment has
        // no extent
        if a <= std::f64::EPSILON || b <= std::f64::EPSILON {
            return 0.0;
        }
        if c <= std::f64::EPSILON {
            return a;
        }

        // Base angles of the triangle via the law of cosines. Rounding
        // errors could push these cosines to 1.00000004 or -1.0000004, which
        // would produce NaN from acos, so clamp into [-1, 1] first.
        let beta_cos = ((b * b - a * a - c * c) / (-2.0 * a * c)).max(-1.0).min(1.0);
        let alpha_cos = ((a * a - b * b - c * c) / (-2.0 * b * c)).max(-1.0).min(1.0);
        let alpha = alpha_cos.acos();
        let beta = beta_cos.acos();

        // Signed distance to the infinite line, sign from the 2D cross
        // product of the segment direction and the point offset
        let numerator = (self.end_gu[0] - self.start_gu[0]) * (self.start_gu[1] - point[1])
            - (self.start_gu[0] - point[0]) * (self.end_gu[1] - self.start_gu[1]);
        let signed_distance = numerator / c;

        if alpha > PI_HALF || beta > PI_HALF {
            // The projection falls outside the segment, so the distance is
            // to the nearer endpoint. The infinite-line distance was
            // calculated anyway to keep the correct sign.
            if signed_distance > 0.0 {
                a.min(b)
            } else {
                -a.min(b)
            }
        } else {
            signed_distance
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Signed cross-track error of a point against a polyline.
///
/// This is the minimum of the signed segment distances by magnitude, but the
/// returned value keeps the sign of whichever segment produced that minimum.
pub fn cross_track_error(point: &Vector2<f64>, segments: &[Segment]) -> f64 {
    let mut min = std::f64::MAX;

    for segment in segments {
        let dist = segment.signed_distance_to(point);
        if dist.abs() < min.abs() {
            min = dist;
        }
    }

    min
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
