//! RupaScan - Laser-triangulation reconstruction and shape identification
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 main / config                       │  ← CLI, TOML settings
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │             (csv_cloud, ray_log)                    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                identification/                      │  ← Orchestration
//! │               (registry, engine)                    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────────┐ ┌────────────────────────┐
//! │     reconstruction/      │ │       matching/        │  ← Core algorithms
//! │ (triangulator, transform │ │ (chamfer, alignment,   │
//! │  session, preview)       │ │  similarity)           │
//! └──────────────────────────┘ └────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipelines
//!
//! ## Reconstruction
//! - Camera rays intersected with the laser plane give (radius, height)
//!   profile points per turntable sample
//! - Profiles placed at their stage angle and calibrated (offsets, scale,
//!   aspect)
//! - Accumulated scan clipped to the working volume and floored at z = 0
//!
//! ## Identification
//! - Scan and each pattern centred, optionally subsampled
//! - Coarse-to-fine Z rotation search over the chamfer distance
//! - Distance mapped to a similarity percentage relative to pattern size
//! - Best pattern approved when it reaches the acceptance threshold

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;
pub mod error;

// ============================================================================
// Layer 2: Algorithms (depends on core)
// ============================================================================
pub mod matching;
pub mod reconstruction;

// ============================================================================
// Layer 3: I/O infrastructure (depends on core)
// ============================================================================
pub mod io;

// ============================================================================
// Layer 4: Identification (depends on matching, io)
// ============================================================================
pub mod identification;

// ============================================================================
// Layer 5: Configuration (depends on all layers)
// ============================================================================
pub mod config;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{CameraRay, Point3D, PointCloud, PoseParameters, ProfilePoint};

// Errors
pub use error::{Error, Result};

// Reconstruction
pub use reconstruction::{PreviewConfig, RayTriangulator, ScanSession, preview, transform, triangulate};

// Matching
pub use matching::{
    AlignmentConfig, AlignmentResult, ChamferResult, RotationalAligner, ScoringLaw,
    SimilarityConfig, SimilarityScorer, SpatialIndex, align, chamfer, score,
};

// Identification
pub use identification::{
    ComparisonArtifacts, ComparisonRecord, IdentificationConfig, IdentificationEngine,
    IdentificationResult, PatternEntry, PatternRegistry, PatternSource, identify,
};

// Configuration
pub use config::{PatternConfig, ScanConfig};
