//! Core data types for reconstruction and matching.
//!
//! Geometry:
//! - [`Point3D`]: 3D point in rig units
//! - [`ProfilePoint`]: (radius, height) point on the laser plane
//! - [`CameraRay`]: Unit direction in camera-local coordinates
//!
//! Collections:
//! - [`PointCloud`]: Struct-of-arrays 3D point cloud
//!
//! Rig description:
//! - [`PoseParameters`]: Laser plane, camera placement and calibration factors

mod cloud;
mod point;
mod pose;

pub use cloud::PointCloud;
pub use point::{CameraRay, Point3D, ProfilePoint};
pub use pose::PoseParameters;
