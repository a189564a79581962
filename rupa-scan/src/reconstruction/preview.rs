//! Synthetic full-revolution preview from a single profile.
//!
//! Used while tuning pose parameters: one captured profile is placed at
//! stage angle 0, clipped, and copied around the turntable axis. This
//! approximates a scan of a rotationally symmetric object only.

use serde::{Deserialize, Serialize};

use crate::core::types::{PointCloud, PoseParameters, ProfilePoint};

use super::transformer::{clip, transform};

/// Preview settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Copies of the profile, evenly spaced over 360°
    pub samples: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { samples: 2 }
    }
}

/// Build a preview cloud by replicating one profile around the Z axis.
///
/// Copies sit at `k · 360° / samples`. Heights are clipped but not
/// floored, matching what the tuning view shows. `samples == 0` yields an
/// empty cloud.
pub fn preview(profile: &[ProfilePoint], pose: &PoseParameters, samples: usize) -> PointCloud {
    if samples == 0 {
        return PointCloud::new();
    }

    let base = clip(&transform(profile, 0.0, pose), pose);
    if base.is_empty() {
        return base;
    }

    let step = 360.0 / samples as f64;
    let mut cloud = PointCloud::with_capacity(base.len() * samples);
    for k in 0..samples {
        cloud.extend(&base.rotate_z(k as f64 * step));
    }
    cloud
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pose() -> PoseParameters {
        PoseParameters {
            offset_radial: 0.0,
            offset_angle_deg: 0.0,
            offset_z: 0.0,
            z_min: -100.0,
            z_max: 100.0,
            modulo_max: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_samples_is_empty() {
        let cloud = preview(&[ProfilePoint::new(1.0, 1.0)], &pose(), 0);
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_two_samples_mirror_profile() {
        let cloud = preview(&[ProfilePoint::new(10.0, -5.0)], &pose(), 2);
        assert_eq!(cloud.len(), 2);
        let (a, b) = (cloud.point_at(0), cloud.point_at(1));
        assert_relative_eq!(a.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(b.x, -10.0, epsilon = 1e-12);
        assert_relative_eq!(b.y, 0.0, epsilon = 1e-9);
        // No floor shift
        assert_eq!(a.z, -5.0);
        assert_eq!(b.z, -5.0);
    }

    #[test]
    fn test_clipped_profile_is_empty() {
        let cloud = preview(&[ProfilePoint::new(500.0, 0.0)], &pose(), 8);
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_copies_evenly_spaced() {
        let cloud = preview(&[ProfilePoint::new(10.0, 0.0)], &pose(), 4);
        assert_eq!(cloud.len(), 4);
        let p = cloud.point_at(1);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 10.0, epsilon = 1e-9);
    }
}
