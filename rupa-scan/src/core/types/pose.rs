//! Rig pose and calibration parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Image-centre offset of the factory rig, in rig units.
const FACTORY_OFFSET_X: f64 = -7.2 - 15.62;
const FACTORY_OFFSET_Y: f64 = -4.3 - 9.027;

/// Geometry and calibration of one laser-triangulation rig.
///
/// Frozen for the duration of a scan. Field names follow Rust naming; the
/// upper-case names used by the calibration tool's parameter files are
/// accepted as aliases, so those files deserialize unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseParameters {
    /// Laser plane tilt about the turntable axis (degrees)
    #[serde(alias = "THETA_DEG")]
    pub theta_deg: f64,
    /// Camera distance from the turntable axis
    #[serde(alias = "CAM_RADIUS")]
    pub cam_radius: f64,
    /// Camera height above the world origin
    #[serde(alias = "CAM_HEIGHT")]
    pub cam_height: f64,
    /// Camera pitch (degrees, negative looks down)
    #[serde(alias = "CAM_PITCH")]
    pub cam_pitch_deg: f64,
    /// Added to the signed profile radius before taking its magnitude
    #[serde(alias = "OFFSET_RADIAL")]
    pub offset_radial: f64,
    /// Added to the stage angle when placing a profile (degrees)
    #[serde(alias = "OFFSET_ANGLE_DEG")]
    pub offset_angle_deg: f64,
    /// Added to every height before scaling
    #[serde(alias = "OFFSET_Z")]
    pub offset_z: f64,
    /// Uniform scale applied to all axes
    #[serde(alias = "SCALE_FACTOR")]
    pub scale_factor: f64,
    /// Extra scale on X and Y
    #[serde(alias = "XY_ASPECT_FACTOR")]
    pub xy_aspect_factor: f64,
    /// Extra scale on Z
    #[serde(alias = "Z_ASPECT_FACTOR")]
    pub z_aspect_factor: f64,
    /// Lowest kept height; becomes the floor (z = 0) after clipping
    #[serde(alias = "Z_MIN")]
    pub z_min: f64,
    /// Highest kept height
    #[serde(alias = "Z_MAX")]
    pub z_max: f64,
    /// Largest kept distance from the turntable axis
    #[serde(alias = "MODULO_MAX")]
    pub modulo_max: f64,
}

impl Default for PoseParameters {
    fn default() -> Self {
        Self {
            theta_deg: 30.0,
            cam_radius: 226.0,
            cam_height: 100.0,
            cam_pitch_deg: -10.0,
            offset_radial: FACTORY_OFFSET_X.hypot(FACTORY_OFFSET_Y),
            offset_angle_deg: FACTORY_OFFSET_Y.atan2(FACTORY_OFFSET_X).to_degrees(),
            offset_z: 240.0,
            scale_factor: 1.0,
            xy_aspect_factor: 1.0,
            z_aspect_factor: 1.0,
            z_min: 0.0,
            z_max: 110.0,
            modulo_max: 100.0,
        }
    }
}

impl PoseParameters {
    /// Parse a JSON parameter object. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON parameter file as written by the calibration tool.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let pose = Self::from_json_str(&contents)?;
        log::info!("Loaded pose parameters from {}", path.display());
        Ok(pose)
    }

    /// Serialize to the calibration tool's JSON layout.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameter sets that cannot describe a physical rig.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("theta_deg", self.theta_deg),
            ("cam_radius", self.cam_radius),
            ("cam_height", self.cam_height),
            ("cam_pitch_deg", self.cam_pitch_deg),
            ("offset_radial", self.offset_radial),
            ("offset_angle_deg", self.offset_angle_deg),
            ("offset_z", self.offset_z),
            ("scale_factor", self.scale_factor),
            ("xy_aspect_factor", self.xy_aspect_factor),
            ("z_aspect_factor", self.z_aspect_factor),
            ("z_min", self.z_min),
            ("z_max", self.z_max),
            ("modulo_max", self.modulo_max),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!("pose.{name} must be finite, got {value}")));
        }
        if self.z_min > self.z_max {
            return Err(Error::Config(format!(
                "pose.z_min ({}) is above pose.z_max ({})",
                self.z_min, self.z_max
            )));
        }
        if self.modulo_max < 0.0 {
            return Err(Error::Config(format!(
                "pose.modulo_max must be >= 0, got {}",
                self.modulo_max
            )));
        }
        Ok(())
    }
}
