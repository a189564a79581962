//! Scan-versus-registry identification.
//!
//! For every registered pattern:
//!
//! 1. Load the cloud and check it is non-empty and finite
//! 2. Centre it; the scan is centred once per run
//! 3. Subsample both clouds to at most `max_points`
//! 4. Align ([`RotationalAligner`]) and score the subsampled clouds
//! 5. Recompute per-point distances on the full-resolution clouds at the
//!    found angle, for diagnostics
//!
//! A pattern that fails to load or validate scores 0 and has no artifacts;
//! the remaining patterns are still compared.
//!
//! # Reproducibility
//!
//! Subsampling is random. Each pattern gets its own `StdRng` seeded from the
//! run's master RNG before any comparison starts, so the outcome depends only
//! on the master seed, not on scheduling: sequential and parallel runs with
//! the same seed agree exactly.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::registry::{PatternRegistry, RegisteredPattern};
use crate::core::types::PointCloud;
use crate::error::{Error, Result};
use crate::matching::{
    AlignmentConfig, RotationalAligner, SimilarityConfig, SimilarityScorer, SpatialIndex,
};

/// Configuration for identification runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    /// Point budget per cloud for alignment and scoring
    pub max_points: usize,

    /// Minimum similarity (percent) for the best match to be approved
    pub acceptance_threshold: f64,

    /// Master seed for subsampling; `None` draws one from the OS
    pub seed: Option<u64>,

    /// Compare patterns on the rayon thread pool
    pub parallel: bool,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            max_points: 30_000,
            acceptance_threshold: 75.0,
            seed: None,
            parallel: false,
        }
    }
}

impl IdentificationConfig {
    /// Check the point budget and threshold are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(Error::Config(
                "identification.max_points must be > 0".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.acceptance_threshold) {
            return Err(Error::Config(format!(
                "identification.acceptance_threshold must be within [0, 100], got {}",
                self.acceptance_threshold
            )));
        }
        Ok(())
    }
}

/// Diagnostics for one successful pattern comparison.
#[derive(Debug, Clone)]
pub struct ComparisonArtifacts {
    /// Rotation applied to the scan, degrees in [0, 360)
    pub angle_deg: f64,

    /// Chamfer distance on the subsampled clouds
    pub distance: f64,

    /// Centred full-resolution pattern
    pub pattern: PointCloud,

    /// Centred full-resolution scan rotated by `angle_deg`
    pub aligned: PointCloud,

    /// Distance from each point of `aligned` to the nearest pattern point
    pub per_point: Vec<f64>,

    /// Per-point similarity in [0, 1], index-aligned with `aligned`
    pub point_similarity: Vec<f64>,

    /// Chamfer evaluations spent by the search
    pub evaluations: usize,
}

/// Outcome of comparing the scan with one pattern.
#[derive(Debug, Clone)]
pub struct ComparisonRecord {
    /// Pattern name
    pub name: String,

    /// Similarity percentage in [0, 100]
    pub similarity: f64,

    /// Present only when the pattern loaded and validated
    pub artifacts: Option<ComparisonArtifacts>,

    /// Why the pattern could not be compared
    pub failure: Option<String>,
}

impl ComparisonRecord {
    fn failed(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            similarity: 0.0,
            artifacts: None,
            failure: Some(reason),
        }
    }
}

/// Outcome of one identification run.
#[derive(Debug, Clone)]
pub struct IdentificationResult {
    /// Index of the best record in `records`
    pub best_index: usize,

    /// Best similarity reached the acceptance threshold
    pub approved: bool,

    /// Acceptance threshold used (percent)
    pub threshold: f64,

    /// One record per pattern, in registration order
    pub records: Vec<ComparisonRecord>,
}

impl IdentificationResult {
    /// Record of the best-matching pattern.
    pub fn best(&self) -> &ComparisonRecord {
        &self.records[self.best_index]
    }
}

/// Compares scans against a pattern registry.
#[derive(Debug, Clone, Default)]
pub struct IdentificationEngine {
    aligner: RotationalAligner,
    scorer: SimilarityScorer,
    config: IdentificationConfig,
}

impl IdentificationEngine {
    /// Create a new engine.
    pub fn new(
        alignment: AlignmentConfig,
        similarity: SimilarityConfig,
        config: IdentificationConfig,
    ) -> Self {
        Self {
            aligner: RotationalAligner::new(alignment),
            scorer: SimilarityScorer::new(similarity),
            config,
        }
    }

    /// Get the identification configuration.
    pub fn config(&self) -> &IdentificationConfig {
        &self.config
    }

    /// Identify a scan using the configured seed (or OS entropy).
    pub fn identify(
        &self,
        comparison: &PointCloud,
        registry: &PatternRegistry,
    ) -> Result<IdentificationResult> {
        let mut rng = self.master_rng();
        self.run(comparison, registry, &mut rng, None)
    }

    /// Identify a scan drawing all randomness from `rng`.
    pub fn identify_with_rng<R: Rng + ?Sized>(
        &self,
        comparison: &PointCloud,
        registry: &PatternRegistry,
        rng: &mut R,
    ) -> Result<IdentificationResult> {
        self.run(comparison, registry, rng, None)
    }

    /// Identify a scan, aborting with [`Error::Cancelled`] once `cancel` is set.
    ///
    /// The flag is checked before each pattern comparison; a comparison in
    /// progress always runs to completion.
    pub fn identify_with_cancel(
        &self,
        comparison: &PointCloud,
        registry: &PatternRegistry,
        cancel: &AtomicBool,
    ) -> Result<IdentificationResult> {
        let mut rng = self.master_rng();
        self.run(comparison, registry, &mut rng, Some(cancel))
    }

    fn master_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn run<R: Rng + ?Sized>(
        &self,
        comparison: &PointCloud,
        registry: &PatternRegistry,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<IdentificationResult> {
        self.config.validate()?;
        if registry.is_empty() {
            return Err(Error::Config("pattern registry is empty".to_string()));
        }
        if comparison.is_empty() {
            return Err(Error::invalid_data("scan", "point cloud is empty"));
        }
        if let Some(i) = comparison.first_non_finite() {
            return Err(Error::invalid_data(
                "scan",
                format!("point {i} has a non-finite coordinate"),
            ));
        }

        let (scan, _) = comparison.centered();
        let seeds: Vec<u64> = registry.patterns().iter().map(|_| rng.random()).collect();
        let is_cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));

        log::info!(
            "Identifying scan ({} points) against {} patterns{}",
            scan.len(),
            registry.len(),
            if self.config.parallel { " in parallel" } else { "" }
        );

        let records: Vec<ComparisonRecord> = if self.config.parallel {
            registry
                .patterns()
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(pattern, &seed)| {
                    if is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    Ok(self.compare(pattern, &scan, seed))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut records = Vec::with_capacity(registry.len());
            for (pattern, &seed) in registry.patterns().iter().zip(&seeds) {
                if is_cancelled() {
                    return Err(Error::Cancelled);
                }
                records.push(self.compare(pattern, &scan, seed));
            }
            records
        };

        // Strict maximum; ties keep the earliest registered pattern
        let mut best_index = 0;
        for (i, record) in records.iter().enumerate() {
            if record.similarity > records[best_index].similarity {
                best_index = i;
            }
        }

        let best = &records[best_index];
        let approved = best.similarity >= self.config.acceptance_threshold;
        log::info!(
            "Best match: {} ({:.2}%), {} (threshold {:.2}%)",
            best.name,
            best.similarity,
            if approved { "approved" } else { "rejected" },
            self.config.acceptance_threshold
        );

        Ok(IdentificationResult {
            best_index,
            approved,
            threshold: self.config.acceptance_threshold,
            records,
        })
    }

    /// Compare the centred scan with one pattern.
    fn compare(&self, registered: &RegisteredPattern, scan: &PointCloud, seed: u64) -> ComparisonRecord {
        let name = registered.name.as_str();
        let entry = match registered.load() {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Pattern '{}' skipped: {}", name, e);
                return ComparisonRecord::failed(name, e.to_string());
            }
        };
        if entry.cloud.is_empty() {
            log::warn!(
                "Pattern '{}' skipped: {} has no points",
                name,
                registered.source.describe()
            );
            return ComparisonRecord::failed(name, "pattern cloud is empty".to_string());
        }
        if let Some(i) = entry.cloud.first_non_finite() {
            log::warn!(
                "Pattern '{}' skipped: point {} of {} is not finite",
                name,
                i,
                registered.source.describe()
            );
            return ComparisonRecord::failed(name, format!("point {i} has a non-finite coordinate"));
        }

        let (pattern, _) = entry.cloud.centered();

        let mut rng = StdRng::seed_from_u64(seed);
        let pattern_sample = pattern.subsample(self.config.max_points, &mut rng);
        let scan_sample = scan.subsample(self.config.max_points, &mut rng);

        let alignment = self.aligner.align(&pattern_sample, &scan_sample);
        let similarity = self.scorer.score(&pattern_sample, alignment.distance);

        // Full-resolution diagnostics at the found angle
        let aligned = scan.rotate_z(alignment.angle_deg);
        let per_point = SpatialIndex::new(&pattern).nearest_distances(&aligned);
        let point_similarity = self.scorer.point_similarity(&pattern, &per_point);

        log::info!(
            "Pattern '{}': {:.2}% at {:.2}° (chamfer {:.4})",
            name,
            similarity,
            alignment.angle_deg,
            alignment.distance
        );

        ComparisonRecord {
            name: name.to_string(),
            similarity,
            artifacts: Some(ComparisonArtifacts {
                angle_deg: alignment.angle_deg,
                distance: alignment.distance,
                pattern,
                aligned,
                per_point,
                point_similarity,
                evaluations: alignment.evaluations,
            }),
            failure: None,
        }
    }
}

/// Identify a scan with default search settings and the given acceptance threshold.
pub fn identify(
    comparison: &PointCloud,
    registry: &PatternRegistry,
    threshold: f64,
) -> Result<IdentificationResult> {
    let config = IdentificationConfig {
        acceptance_threshold: threshold,
        ..Default::default()
    };
    IdentificationEngine::new(AlignmentConfig::default(), SimilarityConfig::default(), config)
        .identify(comparison, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;
    use crate::matching::test_utils::{grid_cloud, helix_cloud, lobed_cloud};

    fn seeded_engine(seed: u64, max_points: usize) -> IdentificationEngine {
        IdentificationEngine::new(
            AlignmentConfig::default(),
            SimilarityConfig::default(),
            IdentificationConfig {
                max_points,
                seed: Some(seed),
                ..Default::default()
            },
        )
    }

    fn registry_of(patterns: Vec<(&str, PointCloud)>) -> PatternRegistry {
        let mut registry = PatternRegistry::new();
        for (name, cloud) in patterns {
            registry.register_cloud(name, cloud).unwrap();
        }
        registry
    }

    #[test]
    fn test_picks_matching_pattern() {
        let target = lobed_cloud(180, 3);
        let registry = registry_of(vec![
            ("helix", helix_cloud(400).scaled(4.0)),
            ("lobed", target.clone()),
            ("grid", grid_cloud(12, 2.0)),
        ]);
        let scan = target.rotate_z(90.0).translated(5.0, -3.0, 1.0);

        let result = seeded_engine(1, 30_000).identify(&scan, &registry).unwrap();
        assert_eq!(result.best().name, "lobed");
        assert!(result.best().similarity > 99.9);
        assert!(result.approved);
        assert_eq!(result.records.len(), 3);
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let cloud = grid_cloud(4, 1.0);
        let registry = registry_of(vec![("first", cloud.clone()), ("second", cloud.clone())]);
        let result = seeded_engine(3, 30_000).identify(&cloud, &registry).unwrap();
        assert_eq!(result.records[0].similarity, result.records[1].similarity);
        assert_eq!(result.best_index, 0);
    }

    #[test]
    fn test_failures_do_not_abort() {
        let target = lobed_cloud(90, 2);
        let mut registry = PatternRegistry::new();
        registry.register_file("missing", "/no/such/file.csv").unwrap();
        registry
            .register_cloud(
                "nan",
                PointCloud::from_points(&[Point3D::new(f64::NAN, 0.0, 0.0)]),
            )
            .unwrap();
        registry.register_cloud("empty", PointCloud::new()).unwrap();
        registry.register_cloud("good", target.clone()).unwrap();

        let result = seeded_engine(5, 30_000).identify(&target, &registry).unwrap();
        for record in &result.records[..3] {
            assert_eq!(record.similarity, 0.0);
            assert!(record.artifacts.is_none());
            assert!(record.failure.is_some());
        }
        assert_eq!(result.best().name, "good");
        assert!(result.best().artifacts.is_some());
    }

    #[test]
    fn test_all_failed_selects_first() {
        let mut registry = PatternRegistry::new();
        registry.register_file("a", "/no/a.csv").unwrap();
        registry.register_file("b", "/no/b.csv").unwrap();
        let scan = grid_cloud(3, 1.0);
        let result = seeded_engine(0, 100).identify(&scan, &registry).unwrap();
        assert_eq!(result.best().name, "a");
        assert!(!result.approved);
    }

    #[test]
    fn test_invalid_scan_is_fatal() {
        let registry = registry_of(vec![("p", grid_cloud(3, 1.0))]);
        let engine = seeded_engine(0, 100);
        assert!(matches!(
            engine.identify(&PointCloud::new(), &registry),
            Err(Error::InvalidData { .. })
        ));
        let bad = PointCloud::from_points(&[Point3D::new(0.0, f64::INFINITY, 0.0)]);
        assert!(matches!(
            engine.identify(&bad, &registry),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let scan = grid_cloud(3, 1.0);
        assert!(matches!(
            seeded_engine(0, 100).identify(&scan, &PatternRegistry::new()),
            Err(Error::Config(_))
        ));
        let registry = registry_of(vec![("p", scan.clone())]);
        assert!(matches!(
            seeded_engine(0, 0).identify(&scan, &registry),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_same_seed_same_result() {
        let target = lobed_cloud(400, 4);
        let registry = registry_of(vec![
            ("lobed", target.clone()),
            ("helix", helix_cloud(900).scaled(5.0)),
        ]);
        let scan = target.rotate_z(20.0);

        let a = seeded_engine(42, 500).identify(&scan, &registry).unwrap();
        let b = seeded_engine(42, 500).identify(&scan, &registry).unwrap();
        for (ra, rb) in a.records.iter().zip(&b.records) {
            assert_eq!(ra.similarity, rb.similarity);
            let (xa, xb) = (ra.artifacts.as_ref().unwrap(), rb.artifacts.as_ref().unwrap());
            assert_eq!(xa.angle_deg, xb.angle_deg);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let target = lobed_cloud(400, 4);
        let registry = registry_of(vec![
            ("helix", helix_cloud(900).scaled(5.0)),
            ("lobed", target.clone()),
            ("grid", grid_cloud(20, 1.5)),
        ]);
        let scan = target.rotate_z(200.0);

        let sequential = seeded_engine(9, 600).identify(&scan, &registry).unwrap();
        let mut parallel_engine = seeded_engine(9, 600);
        parallel_engine.config.parallel = true;
        let parallel = parallel_engine.identify(&scan, &registry).unwrap();

        assert_eq!(sequential.best_index, parallel.best_index);
        for (s, p) in sequential.records.iter().zip(&parallel.records) {
            assert_eq!(s.name, p.name);
            assert_eq!(s.similarity, p.similarity);
        }
    }

    #[test]
    fn test_full_resolution_artifacts() {
        let target = lobed_cloud(300, 4);
        let registry = registry_of(vec![("lobed", target.clone())]);
        let result = seeded_engine(11, 200).identify(&target, &registry).unwrap();
        let artifacts = result.best().artifacts.as_ref().unwrap();
        assert_eq!(artifacts.aligned.len(), target.len());
        assert_eq!(artifacts.per_point.len(), target.len());
        assert_eq!(artifacts.point_similarity.len(), target.len());
        assert_eq!(artifacts.pattern.len(), target.len());
    }

    #[test]
    fn test_cancel_before_start() {
        let registry = registry_of(vec![("p", grid_cloud(3, 1.0))]);
        let cancel = AtomicBool::new(true);
        let err = seeded_engine(0, 100)
            .identify_with_cancel(&grid_cloud(3, 1.0), &registry, &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_identify_free_function() {
        let cloud = grid_cloud(5, 1.0);
        let registry = registry_of(vec![("grid", cloud.clone())]);
        let result = identify(&cloud.rotate_z(90.0), &registry, 90.0).unwrap();
        assert!(result.approved);
        assert_eq!(result.threshold, 90.0);
    }
}
