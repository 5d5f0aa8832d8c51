//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign,
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    // Sum all elements of the points
    let mut sum = T::from(0).unwrap();

    for i in 0..point_0.len() {
        sum += (point_0[i] - point_1[i]).powi(2);
    }

    // Return the squareroot of the sum
    Some(sum.sqrt())
}

/// Value of the gaussian with the given mean and standard deviation at
/// `value`.
pub fn gaussian<T>(mean: T, std_dev: T, value: T) -> T
where
    T: Float,
{
    let root_two_pi = T::from(std::f64::consts::TAU).unwrap().sqrt();

    (T::one() / (std_dev * root_two_pi))
        * (T::from(-0.5).unwrap() * ((value - mean) / std_dev).powi(2)).exp()
}

/// Normalise a probability distribution in place so that it sums to one.
///
/// If all probabilities are zero a uniform distribution is assigned instead,
/// so that the distribution never collapses.
pub fn normalize<T>(probabilities: &mut [T])
where
    T: Float + std::ops::AddAssign + std::ops::DivAssign,
{
    let mut sum = T::from(0).unwrap();

    for prob in probabilities.iter() {
        sum += *prob;
    }

    if sum > T::from(0).unwrap() {
        for prob in probabilities.iter_mut() {
            *prob /= sum;
        }
    } else {
        let uniform = T::one() / T::from(probabilities.len()).unwrap();
        for prob in probabilities.iter_mut() {
            *prob = uniform;
        }
    }
}

/// Minimum of a set of values (unlike `f64::min` this works on any number of
/// values).
pub fn min_of<T>(values: &[T]) -> T
where
    T: Float,
{
    let mut min = T::max_value();

    for value in values {
        if min > *value {
            min = *value;
        }
    }

    min
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[0f64, 0f64], &[3f64, 4f64]), Some(5f64));
        assert_eq!(norm::<f64>(&[0f64], &[3f64, 4f64]), None);
    }

    #[test]
    fn test_gaussian() {
        // Peak of the standard normal
        let peak = gaussian(0f64, 1f64, 0f64);
        assert!((peak - 0.3989422804014327).abs() < 1e-12);

        // Symmetric about the mean
        assert!((gaussian(2f64, 3f64, 1f64) - gaussian(2f64, 3f64, 3f64)).abs() < 1e-12);
    }

    #[test]
    fn test_normalize() {
        let mut probs = [1f64, 3f64];
        normalize(&mut probs);
        assert!((probs[0] - 0.25).abs() < 1e-12);
        assert!((probs[1] - 0.75).abs() < 1e-12);

        // All zero distributions become uniform rather than staying collapsed
        let mut zeros = [0f64; 4];
        normalize(&mut zeros);
        let sum: f64 = zeros.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        for p in zeros.iter() {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_min_of() {
        assert_eq!(min_of(&[3f64, 1f64, 2f64]), 1f64);
    }
}
