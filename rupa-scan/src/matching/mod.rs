//! Point cloud matching.
//!
//! Compares a scanned cloud with a reference pattern in three stages:
//!
//! - [`SpatialIndex`] / [`chamfer`]: R-tree nearest neighbours and the
//!   symmetric chamfer distance
//! - [`RotationalAligner`]: coarse-to-fine search for the Z rotation that
//!   minimises the chamfer distance between centred clouds
//! - [`SimilarityScorer`]: distance to a 0-100 % similarity relative to the
//!   pattern's bounding diagonal
//!
//! # Example
//!
//! ```
//! use rupa_scan::core::types::{Point3D, PointCloud};
//! use rupa_scan::matching::{SimilarityConfig, align, score};
//!
//! let pattern: PointCloud = (0..40)
//!     .map(|i| {
//!         let t = i as f64 * 0.4;
//!         Point3D::new((3.0 + t.cos()) * t.cos(), (3.0 + t.cos()) * t.sin(), t)
//!     })
//!     .collect();
//! let (pattern, _) = pattern.centered();
//!
//! let result = align(&pattern, &pattern);
//! assert_eq!(result.distance, 0.0);
//! assert_eq!(score(&pattern, result.distance, &SimilarityConfig::default()), 100.0);
//! ```

mod alignment;
mod chamfer;
mod similarity;

#[cfg(test)]
pub(crate) mod test_utils;

pub use alignment::{
    AlignmentConfig, AlignmentResult, MAX_REFINE_ITERATIONS, MIN_ANGLE_STEP_DEG,
    MIN_POSITIVE_STEP_DEG, RotationalAligner, align,
};
pub use chamfer::{ChamferResult, SpatialIndex, chamfer, chamfer_indexed};
pub use similarity::{
    SimilarityConfig, SimilarityScorer, ScoringLaw, THRESHOLD_EPSILON, score,
};
