//! Mathematical primitives shared by reconstruction and matching.
//!
//! Angles at the public API are in degrees, as reported by the rotation
//! stage and as stored in configuration files.

/// Normalize an angle in degrees to [0, 360).
///
/// # Example
/// ```
/// use rupa_scan::core::math::normalize_degrees;
///
/// assert_eq!(normalize_degrees(370.0), 10.0);
/// assert_eq!(normalize_degrees(-90.0), 270.0);
/// assert_eq!(normalize_degrees(360.0), 0.0);
/// ```
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if a >= 360.0 { 0.0 } else { a }
}

/// Shortest signed angular difference from `a` to `b`, in degrees within (-180, 180].
///
/// # Example
/// ```
/// use rupa_scan::core::math::angle_diff_degrees;
///
/// assert_eq!(angle_diff_degrees(350.0, 10.0), 20.0);
/// assert_eq!(angle_diff_degrees(10.0, 350.0), -20.0);
/// ```
#[inline]
pub fn angle_diff_degrees(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(b - a);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Sign of `x` as -1, 0 or 1.
///
/// Unlike [`f64::signum`], zero maps to zero.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
