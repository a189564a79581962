//! Scan reconstruction.
//!
//! Turns per-sample camera rays into a calibrated 3D point cloud.
//!
//! ```text
//! rays ──► RayTriangulator ──► profile (r, h) ──► transform(angle) ──► points
//!                                                                        │
//!                         ScanSession accumulates samples, then clip + floor
//! ```
//!
//! - [`RayTriangulator`]: ray / laser-plane intersection
//! - [`transformer`]: pure calibration pipeline stages
//! - [`ScanSession`]: per-scan accumulation
//! - [`preview()`]: single-profile revolution preview

mod preview;
mod session;
pub mod transformer;
mod triangulator;

pub use preview::{PreviewConfig, preview};
pub use session::ScanSession;
pub use transformer::{clip_and_floor, transform};
pub use triangulator::{PARALLEL_EPSILON, RayTriangulator, triangulate};
