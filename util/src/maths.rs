//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Number of degrees in a full turn
const FULL_TURN_DEG: f64 = 360.0;

/// Get the signed angular distance from `a` to `b`, both in degrees.
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// at 360 degrees. The inputs do not need to be normalised.
pub fn get_ang_dist_deg<T>(a: T, b: T) -> T
where
    T: Float,
{
    let full_turn: T = T::from(FULL_TURN_DEG).unwrap_or_else(T::infinity);

    let c = rem_euclid(a - b, full_turn);
    let d = rem_euclid(b - a, full_turn);

    if c < d {
        -c
    } else {
        d
    }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_deg_360<T>(value: T) -> T
where
    T: Float,
{
    let full_turn: T = T::from(FULL_TURN_DEG).unwrap_or_else(T::infinity);

    let r = rem_euclid(value, full_turn);

    // Round-off on tiny negative inputs can land exactly on the upper bound
    if r >= full_turn {
        T::zero()
    } else {
        r
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist_deg() {
        assert_eq!(get_ang_dist_deg(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_deg(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist_deg(0f64, 360f64), 0f64);
        assert_eq!(get_ang_dist_deg(360f64, 0f64), 0f64);
        assert_eq!(get_ang_dist_deg(350f64, 0f64), 10f64);
        assert_eq!(get_ang_dist_deg(10f64, 0f64), -10f64);
        assert_eq!(get_ang_dist_deg(-90f64, 270f64), 0f64);
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(0f64), 0f64);
        assert_eq!(wrap_deg_360(360f64), 0f64);
        assert_eq!(wrap_deg_360(370f64), 10f64);
        assert_eq!(wrap_deg_360(-90f64), 270f64);
        assert_eq!(wrap_deg_360(-1e-20f64), 0f64);
        assert_eq!(wrap_deg_360(725f64), 5f64);
    }
}
