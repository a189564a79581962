//! Chamfer distance to similarity percentage.
//!
//! Distances are judged relative to the pattern's size:
//!
//! ```text
//! threshold = max(ε, chamfer_fraction · diagonal(pattern))
//! ```
//!
//! and mapped through one of two laws:
//!
//! - exponential: `100 · exp(-d / threshold)`
//! - linear: `100 · max(0, 1 - d / threshold)`

use serde::{Deserialize, Serialize};

use crate::core::types::PointCloud;
use crate::error::{Error, Result};

/// Lower bound for thresholds and sensitivity divisors.
pub const THRESHOLD_EPSILON: f64 = 1e-9;

/// Mapping from normalised distance to similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringLaw {
    /// `exp(-d / threshold)`; never reaches zero
    #[default]
    Exponential,
    /// `1 - d / threshold`, floored at zero
    Linear,
}

impl ScoringLaw {
    /// Similarity in [0, 1] for a distance/threshold ratio.
    #[inline]
    pub fn apply(self, ratio: f64) -> f64 {
        let s = match self {
            ScoringLaw::Exponential => (-ratio).exp(),
            ScoringLaw::Linear => 1.0 - ratio,
        };
        s.clamp(0.0, 1.0)
    }
}

impl std::fmt::Display for ScoringLaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringLaw::Exponential => write!(f, "exponential"),
            ScoringLaw::Linear => write!(f, "linear"),
        }
    }
}

/// Configuration for similarity scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Scoring law.
    pub law: ScoringLaw,

    /// Fraction of the pattern's bounding diagonal used as threshold.
    ///
    /// Observed useful range: 0.1 to 0.25.
    pub chamfer_fraction: f64,

    /// Divides the threshold for per-point similarity only.
    ///
    /// Higher values make diagnostic colouring stricter; the accept/reject
    /// score never uses it.
    pub visual_sensitivity: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            law: ScoringLaw::Exponential,
            chamfer_fraction: 0.1,
            visual_sensitivity: 1.0,
        }
    }
}

impl SimilarityConfig {
    /// Check the fraction and sensitivity are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.chamfer_fraction > 0.0 && self.chamfer_fraction.is_finite()) {
            return Err(Error::Config(format!(
                "similarity.chamfer_fraction must be > 0, got {}",
                self.chamfer_fraction
            )));
        }
        if !(self.visual_sensitivity > 0.0 && self.visual_sensitivity.is_finite()) {
            return Err(Error::Config(format!(
                "similarity.visual_sensitivity must be > 0, got {}",
                self.visual_sensitivity
            )));
        }
        Ok(())
    }
}

/// Converts chamfer distances into similarity values.
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    config: SimilarityConfig,
}

impl SimilarityScorer {
    /// Create a new scorer.
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Decision threshold for a pattern with the given bounding diagonal.
    pub fn threshold(&self, diagonal: f64) -> f64 {
        (self.config.chamfer_fraction * diagonal).max(THRESHOLD_EPSILON)
    }

    /// Similarity percentage in [0, 100] for a chamfer distance.
    ///
    /// A zero-size pattern scores 100 only for an exact match. Non-finite
    /// distances (empty clouds) score 0.
    pub fn score(&self, pattern: &PointCloud, distance: f64) -> f64 {
        self.score_with_diagonal(pattern.bounding_diagonal(), distance)
    }

    /// [`score`](Self::score) with a precomputed bounding diagonal.
    pub fn score_with_diagonal(&self, diagonal: f64, distance: f64) -> f64 {
        if !distance.is_finite() {
            return 0.0;
        }
        if diagonal == 0.0 {
            return if distance == 0.0 { 100.0 } else { 0.0 };
        }
        100.0 * self.config.law.apply(distance / self.threshold(diagonal))
    }

    /// Per-point similarity in [0, 1], index-aligned with `distances`.
    ///
    /// Uses the decision threshold divided by `visual_sensitivity`.
    pub fn point_similarity(&self, pattern: &PointCloud, distances: &[f64]) -> Vec<f64> {
        let diagonal = pattern.bounding_diagonal();
        let sensitivity = self.config.visual_sensitivity.max(THRESHOLD_EPSILON);
        let threshold = (self.threshold(diagonal) / sensitivity).max(THRESHOLD_EPSILON);

        distances
            .iter()
            .map(|&d| {
                if !d.is_finite() {
                    0.0
                } else if diagonal == 0.0 {
                    if d == 0.0 { 1.0 } else { 0.0 }
                } else {
                    self.config.law.apply(d / threshold)
                }
            })
            .collect()
    }
}

/// Score a distance against a pattern with the given configuration.
pub fn score(pattern: &PointCloud, distance: f64, config: &SimilarityConfig) -> f64 {
    SimilarityScorer::new(*config).score(pattern, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;
    use crate::matching::test_utils::grid_cloud;
    use approx::assert_relative_eq;

    fn scorer(law: ScoringLaw) -> SimilarityScorer {
        SimilarityScorer::new(SimilarityConfig {
            law,
            ..Default::default()
        })
    }

    #[test]
    fn test_zero_distance_is_perfect() {
        let pattern = grid_cloud(5, 1.0);
        for law in [ScoringLaw::Exponential, ScoringLaw::Linear] {
            assert_eq!(scorer(law).score(&pattern, 0.0), 100.0);
        }
    }

    #[test]
    fn test_monotone_non_increasing() {
        let pattern = grid_cloud(5, 1.0);
        for law in [ScoringLaw::Exponential, ScoringLaw::Linear] {
            let s = scorer(law);
            let mut previous = f64::INFINITY;
            for i in 0..200 {
                let value = s.score(&pattern, i as f64 * 0.01);
                assert!(value <= previous, "{law}: {value} > {previous} at step {i}");
                assert!((0.0..=100.0).contains(&value));
                previous = value;
            }
        }
    }

    #[test]
    fn test_known_values() {
        // 5x5 grid with spacing 1: diagonal = sqrt(32), threshold = 0.1 * sqrt(32)
        let pattern = grid_cloud(5, 1.0);
        let threshold = 0.1 * 32f64.sqrt();
        let d = threshold / 2.0;
        assert_relative_eq!(
            scorer(ScoringLaw::Exponential).score(&pattern, d),
            100.0 * (-0.5f64).exp(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scorer(ScoringLaw::Linear).score(&pattern, d),
            50.0,
            epsilon = 1e-9
        );
        assert_eq!(scorer(ScoringLaw::Linear).score(&pattern, threshold * 2.0), 0.0);
    }

    #[test]
    fn test_degenerate_diagonal() {
        let single = PointCloud::from_points(&[Point3D::new(1.0, 2.0, 3.0)]);
        let s = scorer(ScoringLaw::Exponential);
        assert_eq!(s.score(&single, 0.0), 100.0);
        assert_eq!(s.score(&single, 0.001), 0.0);
    }

    #[test]
    fn test_infinite_distance_scores_zero() {
        let pattern = grid_cloud(3, 1.0);
        assert_eq!(scorer(ScoringLaw::Exponential).score(&pattern, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_visual_sensitivity_only_affects_points() {
        let pattern = grid_cloud(5, 1.0);
        let relaxed = SimilarityScorer::new(SimilarityConfig::default());
        let strict = SimilarityScorer::new(SimilarityConfig {
            visual_sensitivity: 4.0,
            ..Default::default()
        });

        assert_eq!(relaxed.score(&pattern, 0.2), strict.score(&pattern, 0.2));

        let distances = [0.0, 0.2, 0.4];
        let loose = relaxed.point_similarity(&pattern, &distances);
        let tight = strict.point_similarity(&pattern, &distances);
        assert_eq!(loose[0], 1.0);
        assert_eq!(tight[0], 1.0);
        assert!(tight[1] < loose[1]);
        assert!(tight[2] < loose[2]);
        assert_relative_eq!(loose[1] * 100.0, relaxed.score(&pattern, 0.2), epsilon = 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(SimilarityConfig::default().validate().is_ok());
        let bad = SimilarityConfig {
            chamfer_fraction: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::Config(_))));
        let bad = SimilarityConfig {
            visual_sensitivity: f64::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_law_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            law: ScoringLaw,
        }
        let w: Wrapper = basic_toml::from_str("law = \"linear\"").unwrap();
        assert_eq!(w.law, ScoringLaw::Linear);
    }
}
