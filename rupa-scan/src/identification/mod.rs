//! Pattern identification.
//!
//! Compares one scanned cloud with every pattern of a [`PatternRegistry`]
//! and reports the best match together with an accept/reject verdict.
//!
//! # Example
//!
//! ```no_run
//! use rupa_scan::identification::{IdentificationConfig, IdentificationEngine, PatternRegistry};
//! use rupa_scan::io::read_cloud;
//! use rupa_scan::matching::{AlignmentConfig, SimilarityConfig};
//!
//! let mut registry = PatternRegistry::new();
//! registry.register_file("bracket", "patterns/bracket.csv")?;
//! registry.register_file("flange", "patterns/flange.csv")?;
//!
//! let engine = IdentificationEngine::new(
//!     AlignmentConfig::default(),
//!     SimilarityConfig::default(),
//!     IdentificationConfig { seed: Some(7), ..Default::default() },
//! );
//! let scan = read_cloud("Escaneo.csv")?;
//! let result = engine.identify(&scan, &registry)?;
//! println!("{} {:.1}% approved={}", result.best().name, result.best().similarity, result.approved);
//! # Ok::<(), rupa_scan::Error>(())
//! ```

mod engine;
mod registry;

pub use engine::{
    ComparisonArtifacts, ComparisonRecord, IdentificationConfig, IdentificationEngine,
    IdentificationResult, identify,
};
pub use registry::{PatternEntry, PatternRegistry, PatternSource, RegisteredPattern};
