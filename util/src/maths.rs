//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;
use ordered_float::OrderedFloat;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Return the arithmetic mean of the values, or `None` if the slice is
/// empty.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign,
{
    if values.is_empty() {
        return None;
    }

    let mut sum = T::zero();

    for value in values {
        sum += *value;
    }

    Some(sum / T::from(values.len()).unwrap())
}

/// Calculate the given percentile (in the range [0, 100]) of the values,
/// interpolating linearly between the two nearest order statistics.
///
/// Returns `None` when fewer than two values are given, since no meaningful
/// interpolation exists for those.
pub fn percentile<T>(values: &[T], pcntl: T) -> Option<T>
where
    T: Float,
{
    if values.len() < 2 {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));

    let pcntl = clamp(pcntl, T::zero(), T::from(100).unwrap());
    let rank = pcntl / T::from(100).unwrap() * T::from(sorted.len() - 1).unwrap();
    let below = rank.floor();
    let above = rank.ceil();

    let below_val = sorted[below.to_usize()?];
    let above_val = sorted[above.to_usize()?];

    Some(below_val + (above_val - below_val) * (rank - below))
}

/// Map a value in the range [-pi, pi] to [0, 2pi]
pub fn map_pi_to_2pi<T>(value: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    if value < T::zero() {
        tau_t + value
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5, -1.0, 1.0), 0.5);
        assert_eq!(clamp(40.0, -15.0, 15.0), 15.0);
        assert_eq!(clamp(-40.0, -15.0, 15.0), -15.0);
        assert_eq!(clamp(-15.0, -15.0, 15.0), -15.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean::<f64>(&[]), None);
        assert_eq!(mean(&[2.0f64]), Some(2.0));
        assert_eq!(mean(&[1.0f64, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(mean(&[-1.0f64, 1.0]), Some(0.0));
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile::<f64>(&[], 50.0), None);
        assert_eq!(percentile(&[1.0f64], 50.0), None);

        // Even sample count interpolates between the two central values
        assert_eq!(percentile(&[1.0f64, 2.0, 3.0, 4.0], 50.0), Some(2.5));

        let vals = [15.0f64, 20.0, 35.0, 40.0, 50.0];
        assert_eq!(percentile(&vals, 0.0), Some(15.0));
        assert_eq!(percentile(&vals, 100.0), Some(50.0));
        assert!((percentile(&vals, 40.0).unwrap() - 29.0).abs() < 1e-9);

        // Input order must not matter
        let shuffled = [40.0f64, 15.0, 50.0, 20.0, 35.0];
        assert!((percentile(&shuffled, 40.0).unwrap() - 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_pi_to_2pi() {
        use std::f64::consts::{PI, TAU};

        assert_eq!(map_pi_to_2pi(0.0), 0.0);
        assert_eq!(map_pi_to_2pi(PI / 2.0), PI / 2.0);
        assert_eq!(map_pi_to_2pi(-PI / 2.0), 1.5 * PI);
        assert!((map_pi_to_2pi(-0.1) - (TAU - 0.1)).abs() < 1e-12);
    }
}
