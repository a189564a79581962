//! Core foundation layer.
//!
//! This is the bottom layer of the scanner stack with no internal dependencies.
//! All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (points, rays, clouds, rig pose)
//! - [`math`]: Mathematical primitives (degree normalization, sign)

pub mod math;
pub mod types;
