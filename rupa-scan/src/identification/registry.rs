//! Registry of reference patterns.

use std::path::{Path, PathBuf};

use crate::core::types::PointCloud;
use crate::error::{Error, Result};
use crate::io::read_cloud;

/// Where a pattern's point cloud comes from.
#[derive(Debug, Clone)]
pub enum PatternSource {
    /// CSV point cloud file, loaded on every identification run
    File(PathBuf),
    /// Cloud already in memory
    Memory(PointCloud),
}

impl PatternSource {
    /// Human-readable origin for log messages.
    pub fn describe(&self) -> String {
        match self {
            PatternSource::File(path) => path.display().to_string(),
            PatternSource::Memory(cloud) => format!("<memory, {} points>", cloud.len()),
        }
    }
}

/// A named pattern whose cloud has not been loaded yet.
#[derive(Debug, Clone)]
pub struct RegisteredPattern {
    /// Unique pattern name
    pub name: String,
    /// Cloud source
    pub source: PatternSource,
}

impl RegisteredPattern {
    /// Load the pattern's cloud.
    pub fn load(&self) -> Result<PatternEntry> {
        let cloud = match &self.source {
            PatternSource::File(path) => read_cloud(path)?,
            PatternSource::Memory(cloud) => cloud.clone(),
        };
        Ok(PatternEntry {
            name: self.name.clone(),
            cloud,
        })
    }
}

/// A loaded pattern, owned for the duration of one identification run.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    /// Unique pattern name
    pub name: String,
    /// Pattern cloud as loaded
    pub cloud: PointCloud,
}

/// Ordered name → source mapping.
///
/// Registration order is significant: identification breaks similarity
/// ties in favour of the pattern registered first.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<RegisteredPattern>,
}

impl PatternRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern. Names must be non-empty and unique.
    pub fn register(&mut self, name: impl Into<String>, source: PatternSource) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("pattern name must not be empty".to_string()));
        }
        if self.get(&name).is_some() {
            return Err(Error::Config(format!("duplicate pattern name '{name}'")));
        }
        self.patterns.push(RegisteredPattern { name, source });
        Ok(())
    }

    /// Register a CSV pattern file.
    pub fn register_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        self.register(name, PatternSource::File(path.as_ref().to_path_buf()))
    }

    /// Register an in-memory cloud.
    pub fn register_cloud(&mut self, name: impl Into<String>, cloud: PointCloud) -> Result<()> {
        self.register(name, PatternSource::Memory(cloud))
    }

    /// Look up a pattern by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Patterns in registration order.
    pub fn patterns(&self) -> &[RegisteredPattern] {
        &self.patterns
    }

    /// Pattern names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;

    #[test]
    fn test_registration_order_kept() {
        let mut registry = PatternRegistry::new();
        registry.register_file("b", "b.csv").unwrap();
        registry.register_file("a", "a.csv").unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = PatternRegistry::new();
        registry.register_file("part", "one.csv").unwrap();
        let err = registry.register_file("part", "two.csv").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = PatternRegistry::new();
        assert!(registry.register_cloud("  ", PointCloud::new()).is_err());
    }

    #[test]
    fn test_load_memory() {
        let mut registry = PatternRegistry::new();
        let cloud = PointCloud::from_points(&[Point3D::new(1.0, 2.0, 3.0)]);
        registry.register_cloud("mem", cloud.clone()).unwrap();
        let entry = registry.get("mem").unwrap().load().unwrap();
        assert_eq!(entry.name, "mem");
        assert_eq!(entry.cloud, cloud);
    }

    #[test]
    fn test_load_missing_file() {
        let mut registry = PatternRegistry::new();
        registry.register_file("ghost", "/no/such/pattern.csv").unwrap();
        let err = registry.patterns()[0].load().unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
