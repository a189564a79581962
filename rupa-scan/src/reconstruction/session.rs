//! Multi-sample scan accumulation.

use crate::core::types::{CameraRay, PointCloud, PoseParameters, ProfilePoint};

use super::transformer::{clip_and_floor, transform};
use super::triangulator::RayTriangulator;

/// One turntable scan in progress.
///
/// Feed one sample per stage angle with [`add_sample`](Self::add_sample),
/// then call [`finish`](Self::finish) to clip and floor the accumulated
/// points. The pose is copied in at construction and never changes.
///
/// # Example
///
/// ```
/// use rupa_scan::core::types::{CameraRay, PoseParameters};
/// use rupa_scan::reconstruction::ScanSession;
///
/// let mut session = ScanSession::new(PoseParameters::default());
/// for step in 0..4 {
///     let rays = [CameraRay::normalized(0.05, -0.1, 1.0).unwrap()];
///     session.add_sample(step as f64 * 90.0, &rays);
/// }
/// assert_eq!(session.sample_count(), 4);
/// let cloud = session.finish();
/// assert!(cloud.len() <= 4);
/// ```
#[derive(Debug, Clone)]
pub struct ScanSession {
    pose: PoseParameters,
    triangulator: RayTriangulator,
    raw: PointCloud,
    samples: usize,
    empty_samples: usize,
}

impl ScanSession {
    /// Start a scan with a fixed pose.
    pub fn new(pose: PoseParameters) -> Self {
        Self {
            triangulator: RayTriangulator::new(&pose),
            pose,
            raw: PointCloud::new(),
            samples: 0,
            empty_samples: 0,
        }
    }

    /// Pose used by this scan.
    pub fn pose(&self) -> &PoseParameters {
        &self.pose
    }

    /// Triangulate and place one sample. Returns the points it contributed.
    pub fn add_sample(&mut self, stage_angle_deg: f64, rays: &[CameraRay]) -> usize {
        let profile = self.triangulator.triangulate(rays);
        if !rays.is_empty() && profile.is_empty() {
            log::debug!(
                "Sample at {:.2}°: all {} rays rejected by the laser plane",
                stage_angle_deg,
                rays.len()
            );
        }
        self.add_profile(stage_angle_deg, &profile)
    }

    /// Place an already-triangulated profile. Returns the points it contributed.
    pub fn add_profile(&mut self, stage_angle_deg: f64, profile: &[ProfilePoint]) -> usize {
        self.samples += 1;
        if profile.is_empty() {
            self.empty_samples += 1;
            log::debug!(
                "Sample {} at {:.2}°: no laser detected",
                self.samples,
                stage_angle_deg
            );
            return 0;
        }

        let points = transform(profile, stage_angle_deg, &self.pose);
        let added = points.len();
        self.raw.extend(&points);
        log::debug!(
            "Sample {} at {:.2}°: {} points",
            self.samples,
            stage_angle_deg,
            added
        );
        added
    }

    /// Samples seen so far, including those without detections.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Samples that produced no points.
    pub fn empty_sample_count(&self) -> usize {
        self.empty_samples
    }

    /// Points accumulated before clipping.
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Accumulated points before clipping.
    pub fn raw_cloud(&self) -> &PointCloud {
        &self.raw
    }

    /// Clip, floor and return the scanned cloud.
    pub fn finish(self) -> PointCloud {
        let cloud = clip_and_floor(&self.raw, &self.pose);
        log::info!(
            "Scan complete: {} samples ({} empty), {} points, {} after filtering",
            self.samples,
            self.empty_samples,
            self.raw.len(),
            cloud.len()
        );
        cloud
    }
}
