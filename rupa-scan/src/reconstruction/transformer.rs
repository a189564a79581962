//! Coordinate transformer: profile points to calibrated 3D points.
//!
//! Each stage is a pure function returning a new cloud:
//!
//! 1. [`project_profile`]: radial offset, placement angle, polar to Cartesian
//! 2. [`calibrate`]: Z offset, uniform scale, XY and Z aspect
//! 3. [`clip`]: height band and radial limit
//! 4. [`floor`]: shift so that `z_min` becomes z = 0
//!
//! [`transform`] chains 1 and 2 for one sample; [`clip_and_floor`] applies
//! 3 and 4 once to the accumulated scan.

use crate::core::types::{PointCloud, PoseParameters, ProfilePoint};

/// Place a profile at a stage angle.
///
/// The offset radius is taken by magnitude, so any profile point whose
/// offset radius is negative folds onto the positive side.
pub fn project_profile(
    profile: &[ProfilePoint],
    stage_angle_deg: f64,
    pose: &PoseParameters,
) -> PointCloud {
    let placement = (stage_angle_deg + pose.offset_angle_deg).to_radians();
    let (sin_a, cos_a) = placement.sin_cos();

    let mut cloud = PointCloud::with_capacity(profile.len());
    for p in profile {
        let radius = (p.radius + pose.offset_radial).abs();
        cloud.push_xyz(radius * cos_a, radius * sin_a, p.height);
    }
    cloud
}

/// Apply Z offset, then scale, then per-axis aspect factors.
pub fn calibrate(cloud: &PointCloud, pose: &PoseParameters) -> PointCloud {
    let xy = pose.scale_factor * pose.xy_aspect_factor;
    let z = pose.scale_factor * pose.z_aspect_factor;
    cloud
        .translated(0.0, 0.0, pose.offset_z)
        .scaled_axes(xy, xy, z)
}

/// Full per-sample transform: profile at a stage angle to calibrated points.
pub fn transform(
    profile: &[ProfilePoint],
    stage_angle_deg: f64,
    pose: &PoseParameters,
) -> PointCloud {
    calibrate(&project_profile(profile, stage_angle_deg, pose), pose)
}

/// Keep points with `z_min <= z <= z_max` and radial distance `<= modulo_max`.
///
/// Non-finite points never pass.
pub fn clip(cloud: &PointCloud, pose: &PoseParameters) -> PointCloud {
    cloud.filtered(|p| p.z >= pose.z_min && p.z <= pose.z_max && p.radial() <= pose.modulo_max)
}

/// Shift heights so `z_min` sits at zero.
pub fn floor(cloud: &PointCloud, z_min: f64) -> PointCloud {
    cloud.translated(0.0, 0.0, -z_min)
}

/// Final scan filter: [`clip`] followed by [`floor`].
pub fn clip_and_floor(cloud: &PointCloud, pose: &PoseParameters) -> PointCloud {
    floor(&clip(cloud, pose), pose.z_min)
}
