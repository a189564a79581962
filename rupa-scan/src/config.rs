//! TOML configuration.
//!
//! Every section is optional and falls back to its defaults:
//!
//! ```toml
//! [pose]
//! theta_deg = 30.0
//! z_max = 110.0
//!
//! [alignment]
//! angle_step_deg = 45.0
//! refine_iterations = 5
//!
//! [similarity]
//! law = "exponential"
//! chamfer_fraction = 0.1
//!
//! [identification]
//! acceptance_threshold = 75.0
//! seed = 7
//!
//! [[patterns]]
//! name = "bracket"
//! path = "patterns/bracket.csv"
//! ```
//!
//! Relative pattern paths resolve against the directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::types::PoseParameters;
use crate::error::{Error, Result};
use crate::identification::{IdentificationConfig, IdentificationEngine, PatternRegistry};
use crate::matching::{AlignmentConfig, SimilarityConfig};
use crate::reconstruction::PreviewConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "rupa-scan.toml";

/// One `[[patterns]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Unique pattern name
    pub name: String,
    /// CSV point cloud path
    pub path: PathBuf,
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Rig geometry and calibration
    #[serde(default)]
    pub pose: PoseParameters,
    /// Rotational search
    #[serde(default)]
    pub alignment: AlignmentConfig,
    /// Distance to similarity mapping
    #[serde(default)]
    pub similarity: SimilarityConfig,
    /// Identification runs
    #[serde(default)]
    pub identification: IdentificationConfig,
    /// Single-profile preview
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Pattern registry, in file order
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,

    /// Directory relative pattern paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ScanConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the configuration for a run.
    ///
    /// An explicit `path` must load. Otherwise [`DEFAULT_CONFIG_FILE`] in
    /// `search_dir` is used when present, and built-in defaults when it is
    /// absent. A default file that exists but fails to parse or validate is
    /// an error, never silently replaced by defaults.
    pub fn load_or_default(path: Option<&Path>, search_dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = search_dir.join(DEFAULT_CONFIG_FILE);
        if default.exists() {
            return Self::load(default);
        }
        log::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = basic_toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(basic_toml::to_string(self)?)
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<()> {
        self.pose.validate()?;
        self.similarity.validate()?;
        self.identification.validate()?;
        self.alignment.validate()?;
        // Registry construction checks names
        self.registry().map(|_| ())
    }

    /// Resolve a possibly relative path against the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Pattern registry in file order.
    pub fn registry(&self) -> Result<PatternRegistry> {
        let mut registry = PatternRegistry::new();
        for pattern in &self.patterns {
            registry.register_file(pattern.name.as_str(), self.resolve(&pattern.path))?;
        }
        Ok(registry)
    }

    /// Identification engine for this configuration.
    pub fn engine(&self) -> IdentificationEngine {
        IdentificationEngine::new(self.alignment, self.similarity, self.identification)
    }
}
