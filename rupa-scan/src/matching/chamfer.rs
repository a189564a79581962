//! Nearest-neighbour index and symmetric chamfer distance.
//!
//! Uses an R-tree (bulk loaded, O(N log N)) so both directions of the
//! chamfer sum cost O(M log N) for clouds of tens of thousands of points.
//! Coincident and duplicated points are fine: they simply yield distance 0.
//! Clouds holding NaN or infinite coordinates are not comparable and give
//! an infinite distance.

use rstar::RTree;

use crate::core::types::{Point3D, PointCloud};

/// Nearest-neighbour index over one point cloud.
///
/// # Example
/// ```
/// use rupa_scan::core::types::{Point3D, PointCloud};
/// use rupa_scan::matching::SpatialIndex;
///
/// let cloud = PointCloud::from_points(&[Point3D::new(0.0, 0.0, 0.0), Point3D::new(5.0, 0.0, 0.0)]);
/// let index = SpatialIndex::new(&cloud);
/// assert_eq!(index.nearest_distance(&Point3D::new(4.0, 0.0, 0.0)), Some(1.0));
/// ```
#[derive(Clone)]
pub struct SpatialIndex {
    tree: RTree<[f64; 3]>,
}

impl SpatialIndex {
    /// Build an index over the finite points of `cloud`.
    pub fn new(cloud: &PointCloud) -> Self {
        let points: Vec<[f64; 3]> = cloud
            .iter()
            .filter(Point3D::is_finite)
            .map(Point3D::to_array)
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest indexed point to `query`, `None` if empty or `query` is not finite.
    pub fn nearest(&self, query: &Point3D) -> Option<Point3D> {
        if !query.is_finite() {
            return None;
        }
        self.tree
            .nearest_neighbor(&query.to_array())
            .map(|p| Point3D::new(p[0], p[1], p[2]))
    }

    /// Distance from `query` to its nearest indexed point, `None` if empty.
    pub fn nearest_distance(&self, query: &Point3D) -> Option<f64> {
        self.nearest(query).map(|p| p.distance(query))
    }

    /// Nearest-neighbour distance for every point of `queries`, index-aligned.
    ///
    /// Every entry is `f64::INFINITY` when the index is empty.
    pub fn nearest_distances(&self, queries: &PointCloud) -> Vec<f64> {
        queries
            .iter()
            .map(|q| self.nearest_distance(&q).unwrap_or(f64::INFINITY))
            .collect()
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len())
            .finish()
    }
}

/// Result of a chamfer comparison of A against B.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamferResult {
    /// mean(A→B) + mean(B→A); infinite if either cloud is empty or not finite
    pub distance: f64,
    /// Nearest-neighbour distance from each point of A into B (length |A|)
    pub per_point: Vec<f64>,
}

/// Symmetric chamfer distance between `a` and `b`.
///
/// Builds both indices; use [`chamfer_indexed`] when one side is reused.
pub fn chamfer(a: &PointCloud, b: &PointCloud) -> ChamferResult {
    chamfer_indexed(a, &SpatialIndex::new(a), b, &SpatialIndex::new(b))
}

/// Symmetric chamfer distance with prebuilt indices.
///
/// `a_index` must index `a` and `b_index` must index `b`.
pub fn chamfer_indexed(
    a: &PointCloud,
    a_index: &SpatialIndex,
    b: &PointCloud,
    b_index: &SpatialIndex,
) -> ChamferResult {
    if a.is_empty() || b.is_empty() || !a.is_finite() || !b.is_finite() {
        return ChamferResult {
            distance: f64::INFINITY,
            per_point: vec![f64::INFINITY; a.len()],
        };
    }

    let a_to_b = b_index.nearest_distances(a);
    let b_to_a = a_index.nearest_distances(b);

    ChamferResult {
        distance: mean(&a_to_b) + mean(&b_to_a),
        per_point: a_to_b,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_utils::{grid_cloud, helix_cloud};
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_clouds_zero() {
        let cloud = helix_cloud(200);
        let result = chamfer(&cloud, &cloud);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.per_point.len(), 200);
        assert!(result.per_point.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_duplicate_points() {
        let a = PointCloud::from_points(&[Point3D::new(1.0, 1.0, 1.0); 64]);
        let b = PointCloud::from_points(&[Point3D::new(1.0, 1.0, 1.0), Point3D::new(1.0, 1.0, 2.0)]);
        let result = chamfer(&a, &b);
        assert_eq!(result.per_point, vec![0.0; 64]);
        // B→A: 0 and 1, mean 0.5
        assert_relative_eq!(result.distance, 0.5);
    }

    #[test]
    fn test_asymmetric_sizes() {
        let a = PointCloud::from_points(&[Point3D::new(0.0, 0.0, 0.0)]);
        let b = PointCloud::from_points(&[Point3D::new(3.0, 0.0, 0.0), Point3D::new(0.0, 4.0, 0.0)]);
        let result = chamfer(&a, &b);
        assert_eq!(result.per_point, vec![3.0]);
        // mean(A→B) = 3, mean(B→A) = (3 + 4) / 2
        assert_relative_eq!(result.distance, 6.5);
    }

    #[test]
    fn test_translation_gives_offset() {
        let a = grid_cloud(5, 1.0);
        let b = a.translated(0.0, 0.0, 0.25);
        let result = chamfer(&a, &b);
        assert_relative_eq!(result.distance, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_infinite() {
        let a = grid_cloud(3, 1.0);
        let empty = PointCloud::new();
        let result = chamfer(&a, &empty);
        assert!(result.distance.is_infinite());
        assert_eq!(result.per_point.len(), a.len());
        assert!(chamfer(&empty, &a).per_point.is_empty());
    }

    #[test]
    fn test_non_finite_is_infinite() {
        let a = helix_cloud(200);
        let mut b = a.clone();
        b.push_xyz(f64::NAN, 1.0, 0.0);

        let result = chamfer(&a, &b);
        assert!(result.distance.is_infinite());
        assert_eq!(result.per_point.len(), a.len());
        assert!(result.per_point.iter().all(|d| d.is_infinite()));

        let result = chamfer(&b, &a);
        assert!(result.distance.is_infinite());
        assert_eq!(result.per_point.len(), b.len());
    }

    #[test]
    fn test_index_skips_non_finite_points() {
        let mut cloud = grid_cloud(3, 1.0);
        cloud.push_xyz(f64::NAN, 0.0, 0.0);
        cloud.push_xyz(0.0, f64::INFINITY, 0.0);
        let index = SpatialIndex::new(&cloud);
        assert_eq!(index.len(), 9);
        assert!(index.nearest_distance(&Point3D::new(0.0, 0.0, 0.0)).is_some());
        assert_eq!(index.nearest(&Point3D::new(f64::NAN, 0.0, 0.0)), None);
    }

    #[test]
    fn test_index_matches_brute_force() {
        let cloud = helix_cloud(300);
        let index = SpatialIndex::new(&cloud);
        let query = Point3D::new(0.3, -1.7, 2.2);
        let brute = cloud
            .iter()
            .map(|p| p.distance(&query))
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(index.nearest_distance(&query).unwrap(), brute);
    }
}
