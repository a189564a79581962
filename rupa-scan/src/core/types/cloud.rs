//! 3D point cloud type.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::point::Point3D;

/// Collection of 3D points using Struct of Arrays (SoA) layout.
///
/// Stores `xs`, `ys` and `zs` as separate vectors so per-axis passes
/// (bounds, scaling, rotation about Z) stay cache friendly.
///
/// Point order carries no meaning for matching, but every per-point
/// result (distances, similarities) is index-aligned with the cloud it
/// was computed for. All transforms return a new cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PointCloud {
    /// X coordinates
    pub xs: Vec<f64>,
    /// Y coordinates
    pub ys: Vec<f64>,
    /// Z coordinates
    pub zs: Vec<f64>,
}

impl PointCloud {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            zs: Vec::with_capacity(capacity),
        }
    }

    /// Create from a vector of points (converts AoS to SoA).
    pub fn from_points(points: &[Point3D]) -> Self {
        let mut cloud = Self::with_capacity(points.len());
        for p in points {
            cloud.push(*p);
        }
        cloud
    }

    /// Add a point.
    #[inline]
    pub fn push(&mut self, point: Point3D) {
        self.push_xyz(point.x, point.y, point.z);
    }

    /// Add a point by coordinates.
    #[inline]
    pub fn push_xyz(&mut self, x: f64, y: f64, z: f64) {
        self.xs.push(x);
        self.ys.push(y);
        self.zs.push(z);
    }

    /// Append all points of another cloud.
    pub fn extend(&mut self, other: &PointCloud) {
        self.xs.extend_from_slice(&other.xs);
        self.ys.extend_from_slice(&other.ys);
        self.zs.extend_from_slice(&other.zs);
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Get point at index.
    ///
    /// # Panics
    /// Panics if index is out of bounds.
    #[inline]
    pub fn point_at(&self, i: usize) -> Point3D {
        Point3D::new(self.xs[i], self.ys[i], self.zs[i])
    }

    /// Get point at index, returning None if out of bounds.
    #[inline]
    pub fn try_point_at(&self, i: usize) -> Option<Point3D> {
        if i < self.len() {
            Some(self.point_at(i))
        } else {
            None
        }
    }

    /// Iterate over points.
    pub fn iter(&self) -> impl Iterator<Item = Point3D> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .zip(self.zs.iter())
            .map(|((&x, &y), &z)| Point3D::new(x, y, z))
    }

    /// True if every coordinate of every point is finite.
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Index of the first point holding a NaN or infinite coordinate.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.len()).find(|&i| {
            !(self.xs[i].is_finite() && self.ys[i].is_finite() && self.zs[i].is_finite())
        })
    }

    /// Axis-aligned bounding box as (min corner, max corner).
    pub fn bounds(&self) -> Option<(Point3D, Point3D)> {
        if self.is_empty() {
            return None;
        }

        let mut min = Point3D::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3D::new(f64::MIN, f64::MIN, f64::MIN);
        for p in self.iter() {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// Length of the bounding box diagonal. Zero for empty or single-point clouds.
    pub fn bounding_diagonal(&self) -> f64 {
        self.bounds().map(|(min, max)| min.distance(&max)).unwrap_or(0.0)
    }

    /// Centroid (mean of all points).
    pub fn centroid(&self) -> Option<Point3D> {
        if self.is_empty() {
            return None;
        }
        let inv_n = 1.0 / self.len() as f64;
        Some(Point3D::new(
            self.xs.iter().sum::<f64>() * inv_n,
            self.ys.iter().sum::<f64>() * inv_n,
            self.zs.iter().sum::<f64>() * inv_n,
        ))
    }

    /// Mean-subtracted copy of the cloud, together with the removed centroid.
    ///
    /// An empty cloud is returned unchanged with a zero centroid.
    pub fn centered(&self) -> (PointCloud, Point3D) {
        match self.centroid() {
            Some(c) => (self.translated(-c.x, -c.y, -c.z), c),
            None => (self.clone(), Point3D::default()),
        }
    }

    /// Rotation about the Z axis by `angle_deg` degrees (counter-clockwise).
    pub fn rotate_z(&self, angle_deg: f64) -> PointCloud {
        let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
        let n = self.len();
        let mut result = PointCloud::with_capacity(n);
        for i in 0..n {
            let (x, y) = (self.xs[i], self.ys[i]);
            result.push_xyz(x * cos_a - y * sin_a, x * sin_a + y * cos_a, self.zs[i]);
        }
        result
    }

    /// Translation by (dx, dy, dz).
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> PointCloud {
        PointCloud {
            xs: self.xs.iter().map(|x| x + dx).collect(),
            ys: self.ys.iter().map(|y| y + dy).collect(),
            zs: self.zs.iter().map(|z| z + dz).collect(),
        }
    }

    /// Uniform scale of all axes.
    pub fn scaled(&self, factor: f64) -> PointCloud {
        self.scaled_axes(factor, factor, factor)
    }

    /// Independent scale per axis.
    pub fn scaled_axes(&self, sx: f64, sy: f64, sz: f64) -> PointCloud {
        PointCloud {
            xs: self.xs.iter().map(|x| x * sx).collect(),
            ys: self.ys.iter().map(|y| y * sy).collect(),
            zs: self.zs.iter().map(|z| z * sz).collect(),
        }
    }

    /// Points for which `keep` returns true, in original order.
    pub fn filtered<F>(&self, mut keep: F) -> PointCloud
    where
        F: FnMut(&Point3D) -> bool,
    {
        let mut result = PointCloud::new();
        for p in self.iter() {
            if keep(&p) {
                result.push(p);
            }
        }
        result
    }

    /// Points at the given indices, in the order given.
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> PointCloud {
        let mut result = PointCloud::with_capacity(indices.len());
        for &i in indices {
            result.push(self.point_at(i));
        }
        result
    }

    /// Uniform random subset of at most `max_points` points, drawn without replacement.
    ///
    /// Clouds already within budget are returned as an unchanged copy and
    /// consume no randomness.
    pub fn subsample<R: Rng + ?Sized>(&self, max_points: usize, rng: &mut R) -> PointCloud {
        if self.len() <= max_points {
            return self.clone();
        }
        let indices = rand::seq::index::sample(rng, self.len(), max_points).into_vec();
        self.select(&indices)
    }
}

impl FromIterator<Point3D> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3D>>(iter: I) -> Self {
        let mut cloud = PointCloud::new();
        for p in iter {
            cloud.push(p);
        }
        cloud
    }
}
