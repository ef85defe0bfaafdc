use std::f64::consts::{PI, TAU};

/// Map an angle onto the half-open interval $`(-\pi, \pi]`$.
pub fn map_angle_m_pi_to_pi(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Map an angle onto $`[0, 2\pi)`$.
pub fn map_angle_0_to_2pi(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// The absolute azimuthal separation of two angles, in $`[0, \pi]`$.
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    map_angle_m_pi_to_pi(phi1 - phi2).abs()
}

/// The distance $`\sqrt{\Delta y^2 + \Delta\phi^2}`$ in the rapidity-azimuth plane.
///
/// The longitudinal coordinate may equally be pseudorapidity; only the differences are used.
pub fn delta_r(y1: f64, phi1: f64, y2: f64, phi2: f64) -> f64 {
    let dy = y1 - y2;
    let dphi = delta_phi(phi1, phi2);
    (dy * dy + dphi * dphi).sqrt()
}

/// Compare two numbers with a tolerance relative to their average magnitude.
///
/// If both values are (close to) zero the comparison is absolute.
pub fn fuzzy_equals(a: f64, b: f64, tolerance: f64) -> bool {
    let absavg = 0.5 * (a.abs() + b.abs());
    let absdiff = (a - b).abs();
    if is_zero(a, tolerance) && is_zero(b, tolerance) {
        return true;
    }
    absdiff < tolerance * absavg
}

/// Check whether a number is zero up to an absolute tolerance.
pub fn is_zero(value: f64, tolerance: f64) -> bool {
    value.abs() < tolerance
}

/// Check whether `value` lies in the half-open range `[low, high)`.
pub fn in_range(value: f64, low: f64, high: f64) -> bool {
    value >= low && value < high
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_angle_wrapping() {
        assert_relative_eq!(map_angle_m_pi_to_pi(3.0 * PI - 0.1), PI - 0.1, epsilon = 1e-12);
        assert_relative_eq!(map_angle_m_pi_to_pi(-PI), PI, epsilon = 1e-12);
        assert_relative_eq!(map_angle_m_pi_to_pi(-0.5), -0.5, epsilon = 1e-12);
        assert_relative_eq!(map_angle_m_pi_to_pi(TAU + 0.25), 0.25, epsilon = 1e-12);
        assert_relative_eq!(map_angle_0_to_2pi(-0.5), TAU - 0.5, epsilon = 1e-12);
        assert_eq!(map_angle_0_to_2pi(-1e-300), 0.0);
        assert!(map_angle_m_pi_to_pi(f64::NAN).is_nan());
    }

    #[test]
    fn test_delta_phi_wraps() {
        assert_relative_eq!(delta_phi(3.0, -3.0), TAU - 6.0, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(0.2, -0.2), 0.4, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(0.0, PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_delta_r() {
        assert_relative_eq!(delta_r(0.0, 0.0, 0.3, 0.4), 0.5, epsilon = 1e-12);
        assert_relative_eq!(delta_r(1.0, 3.1, 1.0, -3.1), TAU - 6.2, epsilon = 1e-12);
    }

    #[test]
    fn test_fuzzy_equals() {
        assert!(fuzzy_equals(34.0, 34.01, 1e-3));
        assert!(!fuzzy_equals(34.0, 34.1, 1e-3));
        assert!(fuzzy_equals(0.0, 1e-7, 1e-5));
        assert!(!fuzzy_equals(1.0, -1.0, 1e-5));
        assert!(in_range(1.0, 1.0, 2.0));
        assert!(!in_range(2.0, 1.0, 2.0));
    }
}
