//! Rotational alignment about the Z axis.
//!
//! Finds the rotation of a comparison cloud that minimises its chamfer
//! distance to a fixed pattern. Both clouds must already be centred;
//! translation is not searched.
//!
//! # Algorithm
//!
//! 1. Coarse scan at `0, step, 2·step, …` below 360°
//! 2. Bisection refinement: for each iteration evaluate
//!    `best ± half` (mod 360), keep any strict improvement, then halve
//!    `half`. Halving happens whether or not the iteration improved, so
//!    this is a bounded local search that can settle on a wrong basin
//!    when the coarse step misses the global optimum.
//!
//! The search is deterministic.

use serde::{Deserialize, Serialize};

use super::chamfer::{SpatialIndex, chamfer_indexed};
use crate::core::math::normalize_degrees;
use crate::core::types::PointCloud;
use crate::error::{Error, Result};

/// Step used when the configured coarse step is not positive.
pub const MIN_ANGLE_STEP_DEG: f64 = 5.0;

/// Smallest positive coarse step a configuration may request.
pub const MIN_POSITIVE_STEP_DEG: f64 = 0.01;

/// Upper bound on refinement iterations.
pub const MAX_REFINE_ITERATIONS: u32 = 64;

/// Configuration for the rotational search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Coarse scan step in degrees.
    ///
    /// Values `<= 0` fall back to [`MIN_ANGLE_STEP_DEG`]; positive values
    /// below [`MIN_POSITIVE_STEP_DEG`] are raised to it.
    pub angle_step_deg: f64,

    /// Number of bisection refinement iterations, at most
    /// [`MAX_REFINE_ITERATIONS`].
    pub refine_iterations: u32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            angle_step_deg: 45.0,
            refine_iterations: 5,
        }
    }
}

impl AlignmentConfig {
    /// Reject steps that would make the coarse scan unbounded and
    /// iteration counts past [`MAX_REFINE_ITERATIONS`].
    pub fn validate(&self) -> Result<()> {
        let step = self.angle_step_deg;
        if !step.is_finite() {
            return Err(Error::Config(format!(
                "alignment.angle_step_deg must be finite, got {}",
                step
            )));
        }
        if step > 0.0 && step < MIN_POSITIVE_STEP_DEG {
            return Err(Error::Config(format!(
                "alignment.angle_step_deg must be <= 0 or >= {}, got {}",
                MIN_POSITIVE_STEP_DEG, step
            )));
        }
        if self.refine_iterations > MAX_REFINE_ITERATIONS {
            return Err(Error::Config(format!(
                "alignment.refine_iterations must be <= {}, got {}",
                MAX_REFINE_ITERATIONS, self.refine_iterations
            )));
        }
        Ok(())
    }

    /// Coarse step actually used by the search.
    pub fn effective_step(&self) -> f64 {
        if self.angle_step_deg > 0.0 && self.angle_step_deg.is_finite() {
            self.angle_step_deg.max(MIN_POSITIVE_STEP_DEG)
        } else {
            MIN_ANGLE_STEP_DEG
        }
    }

    /// Refinement iterations actually run.
    pub fn effective_iterations(&self) -> u32 {
        self.refine_iterations.min(MAX_REFINE_ITERATIONS)
    }

    /// Half-width of the last refinement bracket, i.e. the angular
    /// resolution of the search.
    pub fn resolution(&self) -> f64 {
        self.effective_step() / 2f64.powi(self.effective_iterations() as i32)
    }

    /// Number of coarse scan angles.
    pub fn coarse_count(&self) -> usize {
        let step = self.effective_step();
        let mut k = 0usize;
        while (k as f64) * step < 360.0 {
            k += 1;
        }
        k
    }
}

/// Result of a rotational alignment.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Rotation applied to the comparison cloud, degrees in [0, 360)
    pub angle_deg: f64,

    /// Chamfer distance at that rotation; infinite if either cloud is empty
    pub distance: f64,

    /// Distance from each point of `aligned` to its nearest pattern point
    pub per_point: Vec<f64>,

    /// Comparison cloud rotated by `angle_deg`
    pub aligned: PointCloud,

    /// Chamfer evaluations performed
    pub evaluations: usize,
}

/// Coarse-to-fine rotational aligner.
#[derive(Debug, Clone, Default)]
pub struct RotationalAligner {
    config: AlignmentConfig,
}

impl RotationalAligner {
    /// Create a new aligner.
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Find the rotation of `comparison` that best matches `pattern`.
    ///
    /// Empty or non-finite clouds cannot be compared: the result has an
    /// infinite distance and no evaluations.
    pub fn align(&self, pattern: &PointCloud, comparison: &PointCloud) -> AlignmentResult {
        if pattern.is_empty()
            || comparison.is_empty()
            || !pattern.is_finite()
            || !comparison.is_finite()
        {
            return AlignmentResult {
                angle_deg: 0.0,
                distance: f64::INFINITY,
                per_point: vec![f64::INFINITY; comparison.len()],
                aligned: comparison.clone(),
                evaluations: 0,
            };
        }

        let pattern_index = SpatialIndex::new(pattern);
        let (best_angle, best_distance, evaluations) = self.search(|angle| {
            let rotated = comparison.rotate_z(angle);
            let rotated_index = SpatialIndex::new(&rotated);
            chamfer_indexed(&rotated, &rotated_index, pattern, &pattern_index).distance
        });

        let aligned = comparison.rotate_z(best_angle);
        let per_point = pattern_index.nearest_distances(&aligned);

        log::debug!(
            "Aligned at {:.3}° (chamfer {:.6}, {} evaluations)",
            best_angle,
            best_distance,
            evaluations
        );

        AlignmentResult {
            angle_deg: normalize_degrees(best_angle),
            distance: best_distance,
            per_point,
            aligned,
            evaluations,
        }
    }

    /// Coarse scan then bisection refinement over `evaluate(angle)`.
    ///
    /// Returns (best angle, best distance, evaluations).
    fn search<F>(&self, mut evaluate: F) -> (f64, f64, usize)
    where
        F: FnMut(f64) -> f64,
    {
        let step = self.config.effective_step();
        let mut evaluations = 0usize;

        // Coarse scan
        let mut best_angle = 0.0;
        let mut best_distance = f64::INFINITY;
        for k in 0..self.config.coarse_count() {
            let angle = k as f64 * step;
            let distance = evaluate(angle);
            evaluations += 1;
            if distance < best_distance {
                best_angle = angle;
                best_distance = distance;
            }
        }
        log::trace!(
            "Coarse scan: best {:.3}° (chamfer {:.6})",
            best_angle,
            best_distance
        );

        // Bisection refinement
        let mut half = step / 2.0;
        for _ in 0..self.config.effective_iterations() {
            let center = best_angle;
            for candidate in [center - half, center + half] {
                let angle = normalize_degrees(candidate);
                let distance = evaluate(angle);
                evaluations += 1;
                if distance < best_distance {
                    best_angle = angle;
                    best_distance = distance;
                }
            }
            half /= 2.0;
        }

        (best_angle, best_distance, evaluations)
    }
}

/// Align with the default search configuration.
pub fn align(pattern: &PointCloud, comparison: &PointCloud) -> AlignmentResult {
    RotationalAligner::default().align(pattern, comparison)
}
