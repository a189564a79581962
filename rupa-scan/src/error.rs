//! Error types for RupaScan

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// RupaScan error types
///
/// Geometric degeneracies (rays parallel to the laser plane, intersections
/// behind the camera, zero-size clouds) are not errors; they are handled
/// in-band by the component that meets them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A point cloud, ray log or parameter file does not exist
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Missing path
        path: PathBuf,
    },

    /// Malformed or non-finite data in a named source
    #[error("Invalid data in {source_name}: {reason}")]
    InvalidData {
        /// File path or pattern name the data came from
        source_name: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unusable configuration; raised before any comparison runs
    #[error("Configuration error: {0}")]
    Config(String),

    /// Run aborted by the caller's cancellation flag
    #[error("Cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] basic_toml::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidData`].
    pub fn invalid_data(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidData {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
