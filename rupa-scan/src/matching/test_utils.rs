//! Shared test utilities for matching and identification.
//!
//! Synthetic point clouds with known geometry, used across the chamfer,
//! alignment, similarity and identification test suites.

use std::f64::consts::TAU;

use crate::core::types::{Point3D, PointCloud};

/// Square grid of `n × n` points in the z = 0 plane, centred on the origin.
///
/// # Example
///
/// ```ignore
/// let grid = grid_cloud(5, 1.0);
/// assert_eq!(grid.len(), 25);
/// ```
pub fn grid_cloud(n: usize, spacing: f64) -> PointCloud {
    let half = (n as f64 - 1.0) / 2.0;
    let mut cloud = PointCloud::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            cloud.push_xyz(
                (i as f64 - half) * spacing,
                (j as f64 - half) * spacing,
                0.0,
            );
        }
    }
    cloud
}

/// Three turns of a helix with radius 2 and pitch 1.
pub fn helix_cloud(n: usize) -> PointCloud {
    (0..n)
        .map(|i| {
            let t = 3.0 * TAU * i as f64 / n as f64;
            Point3D::new(2.0 * t.cos(), 2.0 * t.sin(), t / TAU)
        })
        .collect()
}

/// Centred solid of revolution with no rotational symmetry.
///
/// Cross-section radius `10 + 4 cos t + 2 sin 2t`, repeated over `layers`
/// heights with `points_per_layer` samples each. The single lobe gives a
/// unique chamfer minimum over a full turn.
pub fn lobed_cloud(points_per_layer: usize, layers: usize) -> PointCloud {
    let mut cloud = PointCloud::with_capacity(points_per_layer * layers);
    for layer in 0..layers {
        let z = layer as f64 * 2.0;
        for i in 0..points_per_layer {
            let t = TAU * i as f64 / points_per_layer as f64;
            let r = 10.0 + 4.0 * t.cos() + 2.0 * (2.0 * t).sin();
            cloud.push_xyz(r * t.cos(), r * t.sin(), z);
        }
    }
    cloud.centered().0
}
