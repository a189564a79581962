//! I/O layer.
//!
//! File formats exchanged with the acquisition tools and viewers.
//!
//! # Contents
//!
//! - [`csv_cloud`]: point cloud CSV (`X,Y,Z`)
//! - [`ray_log`]: recorded per-sample camera rays

pub mod csv_cloud;
pub mod ray_log;

// Re-export common functions
pub use csv_cloud::{read_cloud, write_cloud};
pub use ray_log::{RaySample, read_ray_log, write_ray_log};
