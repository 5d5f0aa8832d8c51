//! # Path simplifier
//!
//! Douglas-Peucker reduction of a point sequence to a polyline whose
//! discarded points all lie within a given tolerance of the reduced path.
//! See en.wikipedia.org/wiki/Douglas-Peucker_algorithm

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::auto::geom::{GridPoint, Segment};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Reduce the point sequence, keeping the first and last point and every
/// interior point further than `epsilon` from the reduced path.
///
/// If `epsilon` is not positive, or there are fewer than 3 points, the input
/// is returned unchanged.
pub fn simplify(points: &[GridPoint], epsilon: f64) -> Vec<GridPoint> {
    let n = points.len();
    if epsilon <= 0.0 || n < 3 {
        return points.to_vec();
    }

    let mut marked = vec![false; n];
    marked[0] = true;
    marked[n - 1] = true;

    simplify_rec(points, &mut marked, epsilon, 0, n - 1);

    points
        .iter()
        .zip(marked.iter())
        .filter_map(|(point, keep)| if *keep { Some(*point) } else { None })
        .collect()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn simplify_rec(points: &[GridPoint], marked: &mut [bool], epsilon: f64, first: usize, last: usize) {
    if last <= first + 1 {
        return;
    }

    // Find the interior point furthest from the segment joining the range's
    // endpoints
    let mut max_distance = -1.0;
    let mut max_index = 0;

    let segment = Segment::between_grid_points(points[first], points[last]);
    for (i, point) in points.iter().enumerate().take(last).skip(first + 1) {
        let distance = segment.signed_distance_to(&point.as_vector()).abs();
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    if max_distance > epsilon {
        marked[max_index] = true;
        simplify_rec(points, marked, epsilon, first, max_index);
        simplify_rec(points, marked, epsilon, max_index, last);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn zig_zag() -> Vec<GridPoint> {
        vec![
            GridPoint::new(0, 0),
            GridPoint::new(1, 2),
            GridPoint::new(2, 0),
            GridPoint::new(3, -2),
            GridPoint::new(4, 0),
            GridPoint::new(8, 0),
        ]
    }

    #[test]
    fn test_non_positive_epsilon_is_identity() {
        let points = zig_zag();
        assert_eq!(simplify(&points, 0.0), points);
        assert_eq!(simplify(&points, -1.0), points);
    }

    #[test]
    fn test_short_inputs_are_identity() {
        let points = vec![GridPoint::new(0, 0), GridPoint::new(5, 5)];
        assert_eq!(simplify(&points, 10.0), points);
        assert_eq!(simplify(&[], 10.0), Vec::<GridPoint>::new());
    }

    #[test]
    fn test_collinear_points_collapse() {
        let points = vec![
            GridPoint::new(0, 0),
            GridPoint::new(1, 1),
            GridPoint::new(2, 2),
            GridPoint::new(3, 3),
        ];
        assert_eq!(
            simplify(&points, 0.5),
            vec![GridPoint::new(0, 0), GridPoint::new(3, 3)]
        );
    }

    #[test]
    fn test_endpoints_always_retained() {
        let points = zig_zag();
        let reduced = simplify(&points, 100.0);
        assert_eq!(reduced.first(), points.first());
        assert_eq!(reduced.last(), points.last());
    }

    #[test]
    fn test_discarded_points_within_tolerance() {
        let points = zig_zag();
        let epsilon = 1.5;
        let reduced = simplify(&points, epsilon);

        // Every discarded point must lie within epsilon of its enclosing
        // simplified segment
        let segments: Vec<Segment> = reduced
            .windows(2)
            .map(|pair| Segment::between_grid_points(pair[0], pair[1]))
            .collect();

        for point in points.iter().filter(|p| !reduced.contains(p)) {
            let min_dist = segments
                .iter()
                .map(|s| s.signed_distance_to(&point.as_vector()).abs())
                .fold(std::f64::MAX, f64::min);
            assert!(min_dist <= epsilon);
        }
    }

    #[test]
    fn test_far_points_kept() {
        let points = zig_zag();
        let reduced = simplify(&points, 1.5);

        // The lowest point of the zig-zag is 2 off the base line, so it must
        // survive a tolerance of 1.5
        assert!(reduced.contains(&GridPoint::new(3, -2)));
    }
}
