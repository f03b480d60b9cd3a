//! 2D geometry helpers
//!
//! The authoring tool works in a right-handed 3D space measured in units with
//! Y pointing up. The target scene is 2D, measured in pixels with Y pointing
//! down. These helpers convert between the two.

use std::f64::consts::FRAC_PI_2;

/// Rotate `point` by `angle` radians around `pivot`
pub fn rotate_around_point(point: [f64; 2], angle: f64, pivot: [f64; 2]) -> [f64; 2] {
    let x = point[0] - pivot[0];
    let y = point[1] - pivot[1];
    let (sin, cos) = angle.sin_cos();
    [x * cos - y * sin + pivot[0], y * cos + x * sin + pivot[1]]
}

/// Convert a source-space XY pair to target pixels (Y flipped)
#[inline]
pub fn to_target_position(x: f64, y: f64, pixels_per_unit: f64) -> [f64; 2] {
    [x * pixels_per_unit, -y * pixels_per_unit]
}

/// Round to 6 decimal places to suppress floating point noise
#[inline]
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Angle of a bone in target space, measured from its head/tail points
///
/// This is the negated direction of the head->tail vector, offset so that a
/// bone pointing along +X has angle zero.
pub fn bone_angle(head: [f64; 2], tail: [f64; 2]) -> f64 {
    (head[0] - tail[0]).atan2(head[1] - tail[1]) + FRAC_PI_2
}

/// Wrap an angle into `(-PI, PI]`
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}

/// Format a real number the way the scene format expects
///
/// Integral values keep a trailing `.0` and negative zero prints as `0.0`.
pub fn fmt_real(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    format!("{:?}", value)
}

/// Join real numbers with `, `
pub fn join_reals(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| fmt_real(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rotate_around_origin() {
        let rotated = rotate_around_point([1.0, 0.0], FRAC_PI_2, [0.0, 0.0]);
        assert!(approx(rotated[0], 0.0));
        assert!(approx(rotated[1], 1.0));
    }

    #[test]
    fn test_rotate_around_pivot() {
        let rotated = rotate_around_point([2.0, 1.0], PI, [1.0, 1.0]);
        assert!(approx(rotated[0], 0.0));
        assert!(approx(rotated[1], 1.0));
    }

    #[test]
    fn test_to_target_position() {
        assert_eq!(to_target_position(2.0, 3.0, 100.0), [200.0, -300.0]);
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(0.1 + 0.2), 0.3);
        assert_eq!(round6(1.000_000_4), 1.0);
        assert_eq!(round6(-2.499_999_999), -2.5);
    }

    #[test]
    fn test_bone_angle() {
        // bone pointing along +X
        assert!(approx(bone_angle([0.0, 0.0], [1.0, 0.0]), 0.0));
        // bone pointing along +Y turns clockwise in target space
        assert!(approx(normalize_angle(bone_angle([0.0, 0.0], [0.0, 1.0])), -FRAC_PI_2));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(approx(normalize_angle(3.0 * PI / 2.0), -FRAC_PI_2));
        assert!(approx(normalize_angle(0.25), 0.25));
    }

    #[test]
    fn test_fmt_real() {
        assert_eq!(fmt_real(200.0), "200.0");
        assert_eq!(fmt_real(-300.0), "-300.0");
        assert_eq!(fmt_real(-0.0), "0.0");
        assert_eq!(fmt_real(0.5), "0.5");
        assert_eq!(join_reals(&[1.0, -2.5]), "1.0, -2.5");
    }
}
