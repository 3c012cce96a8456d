//! Axis angles from keypoint pairs.
//!
//! Angles come from `atan(slope)`, not a four-quadrant arctangent, so they
//! lie in (-90, 90) and each garment applies its own quadrant correction.

use crate::constants::SLOPE_EPSILON;
use crate::keypoint::Point;

/// Clamp a slope denominator away from zero, keeping its sign
///
/// Positive zero counts as positive.
#[must_use]
pub fn clamp_denominator(dx: f64) -> f64 {
    if dx.abs() < SLOPE_EPSILON {
        SLOPE_EPSILON.copysign(dx)
    } else {
        dx
    }
}

/// `atan((a.y - b.y) / (a.x - b.x))` in degrees
#[must_use]
pub fn slope_degrees(a: Point, b: Point) -> f64 {
    let dx = clamp_denominator(a.x - b.x);
    ((a.y - b.y) / dx).atan().to_degrees()
}

/// `atan(|dy| / |dx|)` in degrees, always within [0, 90]
#[must_use]
pub fn slope_magnitude_degrees(a: Point, b: Point) -> f64 {
    let dx = clamp_denominator((a.x - b.x).abs());
    ((a.y - b.y).abs() / dx).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_degrees_loses_quadrant() {
        let origin = Point::new(0.0, 0.0);
        let a = slope_degrees(Point::new(1.0, 1.0), origin);
        let b = slope_degrees(Point::new(-1.0, -1.0), origin);
        assert!((a - 45.0).abs() < 1e-9);
        assert!((b - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertical_axis_is_finite() {
        let top = Point::new(5.0, 0.0);
        let bottom = Point::new(5.0, 100.0);
        let down = slope_degrees(top, bottom);
        assert!(down.is_finite());
        assert!((down + 90.0).abs() < 1e-3);

        let same = slope_degrees(top, top);
        assert_eq!(same, 0.0);
    }

    #[test]
    fn test_clamp_keeps_sign() {
        assert_eq!(clamp_denominator(0.0), SLOPE_EPSILON);
        assert_eq!(clamp_denominator(-0.0), -SLOPE_EPSILON);
        assert_eq!(clamp_denominator(-1e-9), -SLOPE_EPSILON);
        assert_eq!(clamp_denominator(3.0), 3.0);
    }

    #[test]
    fn test_magnitude_range() {
        let hip = Point::new(0.0, 0.0);
        assert!((slope_magnitude_degrees(hip, Point::new(0.0, 50.0)) - 90.0).abs() < 1e-3);
        assert!((slope_magnitude_degrees(hip, Point::new(-10.0, 10.0)) - 45.0).abs() < 1e-9);
        assert_eq!(slope_magnitude_degrees(hip, Point::new(10.0, 0.0)), 0.0);
    }
}
