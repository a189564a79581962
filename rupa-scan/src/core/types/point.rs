//! Point and ray types.

use serde::{Deserialize, Serialize};

/// A 3D point in rig units (millimetres on the reference rig).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate (turntable axis, floor at 0 after clipping)
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Distance from the Z axis.
    #[inline]
    pub fn radial(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// True if every coordinate is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A point on the laser plane before it is placed at a stage angle.
///
/// `radius` is signed: its sign records which side of the image centre the
/// laser pixel was on, so concave and convex profiles stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Signed distance from the turntable axis
    pub radius: f64,
    /// Height along the turntable axis
    pub height: f64,
}

impl ProfilePoint {
    /// Create a new profile point.
    #[inline]
    pub fn new(radius: f64, height: f64) -> Self {
        Self { radius, height }
    }
}

/// Unit direction of a back-projected laser pixel, in camera coordinates.
///
/// Camera convention: +Z along the optical axis, +X to the image right,
/// +Y to the image bottom. Rays arrive already undistorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraRay {
    /// Image right
    pub x: f64,
    /// Image down
    pub y: f64,
    /// Along the optical axis
    pub z: f64,
}

impl CameraRay {
    /// Create a ray from components that are already unit length.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a ray by normalizing an arbitrary direction.
    ///
    /// Returns `None` for zero-length or non-finite directions.
    pub fn normalized(x: f64, y: f64, z: f64) -> Option<Self> {
        let norm = (x * x + y * y + z * z).sqrt();
        if !norm.is_finite() || norm < f64::EPSILON {
            return None;
        }
        Some(Self::new(x / norm, y / norm, z / norm))
    }

    /// Ray through a normalized image coordinate (x/z, y/z) on the z = 1 plane.
    pub fn from_normalized_image(u: f64, v: f64) -> Self {
        let norm = (u * u + v * v + 1.0).sqrt();
        Self::new(u / norm, v / norm, 1.0 / norm)
    }

    /// Euclidean length of the direction.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}
