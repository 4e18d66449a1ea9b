//! # Game Mathematics
//!
//! Distance and angle helpers in world (tile) units.

use std::f64::consts::PI;

/// Absolute per-axis distance between two points.
///
/// Most proximity checks in the game are square windows rather than
/// circles, so callers compare both components against a threshold.
///
/// # Examples
///
/// ```
/// use carotid::delta_xy;
///
/// assert_eq!(delta_xy(1.0, 5.0, 4.0, 3.0), (3.0, 2.0));
/// ```
pub fn delta_xy(x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    ((x1 - x2).abs(), (y1 - y2).abs())
}

/// Returns true when both axis distances are within `threshold`.
pub fn within_square(x1: f64, y1: f64, x2: f64, y2: f64, threshold: f64) -> bool {
    let (dx, dy) = delta_xy(x1, y1, x2, y2);
    dx <= threshold && dy <= threshold
}

/// Angle of the vector pointing from `(x2, y2)` to `(x1, y1)`.
pub fn angle_between(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (y1 - y2).atan2(x1 - x2)
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}
