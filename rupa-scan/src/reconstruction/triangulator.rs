//! Ray / laser-plane triangulation.
//!
//! # Rig geometry
//!
//! The laser plane contains the turntable axis (world Z) and is tilted by
//! `theta_deg` about it, giving the world normal `(sin θ, -cos θ, 0)`.
//! The camera sits at `(cam_radius, 0, cam_height)` looking at the axis.
//! Camera-to-world rotation is two fixed quarter turns (about Z, then Y)
//! followed by the pitch about the camera X axis:
//!
//! ```text
//! R = R_y(-90°) · R_z(-90°) · R_x(pitch)
//! ```
//!
//! A ray with world direction `d` hits the plane at `C + t·d` with
//! `t = -(n·C) / (n·d)`.

use nalgebra::{Matrix3, Vector3};

use crate::core::math::sign;
use crate::core::types::{CameraRay, PoseParameters, ProfilePoint};

/// Below this |n·d| a ray is treated as parallel to the laser plane.
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// Intersects camera rays with the fixed laser plane.
///
/// All rig-dependent quantities are computed once in [`RayTriangulator::new`],
/// so a triangulator is built per scan and reused for every sample.
#[derive(Debug, Clone)]
pub struct RayTriangulator {
    plane_normal: Vector3<f64>,
    camera_position: Vector3<f64>,
    camera_to_world: Matrix3<f64>,
}

impl RayTriangulator {
    /// Build the plane and camera frame for a pose.
    pub fn new(pose: &PoseParameters) -> Self {
        let theta = pose.theta_deg.to_radians();
        let pitch = pose.cam_pitch_deg.to_radians();

        let plane_normal = Vector3::new(theta.sin(), -theta.cos(), 0.0);
        let camera_position = Vector3::new(pose.cam_radius, 0.0, pose.cam_height);

        #[rustfmt::skip]
        let r_z_neg90 = Matrix3::new(
            0.0, 1.0, 0.0,
            -1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        );
        #[rustfmt::skip]
        let r_y_neg90 = Matrix3::new(
            0.0, 0.0, -1.0,
            0.0, 1.0, 0.0,
            1.0, 0.0, 0.0,
        );
        let (sin_p, cos_p) = pitch.sin_cos();
        #[rustfmt::skip]
        let r_pitch = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, cos_p, -sin_p,
            0.0, sin_p, cos_p,
        );

        Self {
            plane_normal,
            camera_position,
            camera_to_world: r_y_neg90 * r_z_neg90 * r_pitch,
        }
    }

    /// World-frame unit normal of the laser plane.
    pub fn plane_normal(&self) -> Vector3<f64> {
        self.plane_normal
    }

    /// World-frame camera centre.
    pub fn camera_position(&self) -> Vector3<f64> {
        self.camera_position
    }

    /// Rotation taking camera-frame directions to world frame.
    pub fn camera_to_world(&self) -> Matrix3<f64> {
        self.camera_to_world
    }

    /// World-frame intersection of one ray with the laser plane.
    ///
    /// Returns `None` when the ray is parallel to the plane or the
    /// intersection lies behind the camera.
    pub fn intersect_world(&self, ray: &CameraRay) -> Option<Vector3<f64>> {
        let dir = self.camera_to_world * Vector3::new(ray.x, ray.y, ray.z);
        let denom = self.plane_normal.dot(&dir);
        if denom.abs() < PARALLEL_EPSILON {
            log::trace!("Ray {:?} parallel to laser plane (n·d = {:e})", ray, denom);
            return None;
        }

        let t = -self.plane_normal.dot(&self.camera_position) / denom;
        if t <= 0.0 {
            log::trace!("Ray {:?} meets laser plane behind camera (t = {})", ray, t);
            return None;
        }

        Some(self.camera_position + dir * t)
    }

    /// Profile point for one ray.
    ///
    /// The radius takes the sign of the ray's camera-frame X so that points
    /// left and right of the image centre stay on opposite sides of the axis.
    pub fn intersect(&self, ray: &CameraRay) -> Option<ProfilePoint> {
        self.intersect_world(ray).map(|p| {
            let radius = sign(ray.x) * p.x.hypot(p.y);
            ProfilePoint::new(radius, -p.z)
        })
    }

    /// Profile points for all surviving rays, in input order.
    ///
    /// Rejected rays are omitted, so the output is not index-aligned with
    /// the input. An empty result means "no detection" for this sample.
    pub fn triangulate(&self, rays: &[CameraRay]) -> Vec<ProfilePoint> {
        rays.iter().filter_map(|ray| self.intersect(ray)).collect()
    }
}

/// Triangulate one sample's rays with a pose.
///
/// Convenience wrapper over [`RayTriangulator`]; build the triangulator
/// directly when processing many samples with the same pose.
pub fn triangulate(rays: &[CameraRay], pose: &PoseParameters) -> Vec<ProfilePoint> {
    RayTriangulator::new(pose).triangulate(rays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Camera-frame ray whose world direction is `world_dir`.
    fn ray_with_world_direction(tri: &RayTriangulator, world_dir: Vector3<f64>) -> CameraRay {
        let cam = tri.camera_to_world().transpose() * world_dir.normalize();
        CameraRay::new(cam.x, cam.y, cam.z)
    }

    #[test]
    fn test_camera_frame_is_rotation() {
        let tri = RayTriangulator::new(&PoseParameters::default());
        let r = tri.camera_to_world();
        let should_be_identity = r.transpose() * r;
        assert_relative_eq!(should_be_identity, Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_optical_axis_points_at_turntable() {
        let pose = PoseParameters {
            cam_pitch_deg: 0.0,
            ..Default::default()
        };
        let tri = RayTriangulator::new(&pose);
        let axis = tri.camera_to_world() * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(axis, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_ray_discarded() {
        let tri = RayTriangulator::new(&PoseParameters::default());
        // Straight up lies in every plane containing the Z axis
        let ray = ray_with_world_direction(&tri, Vector3::new(0.0, 0.0, 1.0));
        assert!(tri.triangulate(&[ray]).is_empty());
    }

    #[test]
    fn test_ray_behind_camera_discarded() {
        let tri = RayTriangulator::new(&PoseParameters::default());
        // Away from the axis: the plane is only reachable with t < 0
        let ray = ray_with_world_direction(&tri, Vector3::new(1.0, 0.0, 0.0));
        assert!(tri.intersect(&ray).is_none());
        assert!(tri.triangulate(&[ray]).is_empty());
    }

    #[test]
    fn test_hit_lies_on_plane() {
        let pose = PoseParameters::default();
        let tri = RayTriangulator::new(&pose);
        let ray = CameraRay::normalized(0.05, -0.1, 1.0).unwrap();
        let hit = tri.intersect_world(&ray).unwrap();
        assert_relative_eq!(tri.plane_normal().dot(&hit), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_profile_from_known_plane_point() {
        let pose = PoseParameters::default();
        let tri = RayTriangulator::new(&pose);
        let theta = pose.theta_deg.to_radians();

        // Point on the plane, 20 units from the axis, 15 below the origin
        let target = Vector3::new(20.0 * theta.cos(), 20.0 * theta.sin(), -15.0);
        let ray = ray_with_world_direction(&tri, target - tri.camera_position());

        let profile = tri.intersect(&ray).unwrap();
        assert_relative_eq!(profile.radius.abs(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(profile.height, 15.0, epsilon = 1e-9);
        assert_eq!(profile.radius.signum(), sign(ray.x));
    }

    #[test]
    fn test_zero_camera_x_gives_zero_radius() {
        let tri = RayTriangulator::new(&PoseParameters::default());
        let ray = CameraRay::normalized(0.0, 0.05, 1.0).unwrap();
        if let Some(profile) = tri.intersect(&ray) {
            assert_eq!(profile.radius, 0.0);
        }
    }

    #[test]
    fn test_drops_are_not_index_aligned() {
        let tri = RayTriangulator::new(&PoseParameters::default());
        let good = CameraRay::normalized(0.05, -0.1, 1.0).unwrap();
        let parallel = ray_with_world_direction(&tri, Vector3::new(0.0, 0.0, 1.0));
        let out = tri.triangulate(&[parallel, good, parallel]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], tri.intersect(&good).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(triangulate(&[], &PoseParameters::default()).is_empty());
    }
}
