//! Recorded camera-ray samples.
//!
//! A ray log stores the rays detected for each turntable sample so a scan
//! can be reconstructed offline with different pose parameters.
//!
//! ```text
//! sample,angle_deg,x,y,z
//! 0,0.0,0.0123,-0.0871,0.9961
//! 0,0.0,0.0125,-0.0850,0.9963
//! 1,1.8,0.0119,-0.0874,0.9961
//! ```
//!
//! Consecutive rows sharing a `sample` id form one sample. Samples in which
//! no laser was detected have no rows and are therefore not recorded.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::core::types::CameraRay;
use crate::error::{Error, Result};

/// Rays detected at one stage angle.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySample {
    /// Sample id as recorded
    pub id: u64,
    /// Stage angle reported by the turntable controller (degrees)
    pub angle_deg: f64,
    /// Unit camera-frame rays
    pub rays: Vec<CameraRay>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RayRow {
    sample: u64,
    angle_deg: f64,
    x: f64,
    y: f64,
    z: f64,
}

/// Read a ray log file.
pub fn read_ray_log(path: impl AsRef<Path>) -> Result<Vec<RaySample>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;

    let samples = read_ray_log_from_reader(file, &path.display().to_string())?;
    log::debug!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Read a ray log from any reader. `source_name` labels errors.
///
/// Rays are renormalised; zero-length or non-finite rays are rejected.
pub fn read_ray_log_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<RaySample>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut samples: Vec<RaySample> = Vec::new();
    for (row, result) in csv_reader.deserialize::<RayRow>().enumerate() {
        let record = result.map_err(|e| Error::invalid_data(source_name, e.to_string()))?;
        let ray = CameraRay::normalized(record.x, record.y, record.z).ok_or_else(|| {
            Error::invalid_data(
                source_name,
                format!("row {}: ray ({}, {}, {}) has no direction", row + 1, record.x, record.y, record.z),
            )
        })?;

        match samples.last_mut() {
            Some(last) if last.id == record.sample => last.rays.push(ray),
            _ => samples.push(RaySample {
                id: record.sample,
                angle_deg: record.angle_deg,
                rays: vec![ray],
            }),
        }
    }
    Ok(samples)
}

/// Write samples to a ray log file, replacing any existing file.
pub fn write_ray_log(path: impl AsRef<Path>, samples: &[RaySample]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_ray_log_to_writer(file, samples)?;
    log::info!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Write samples to any writer.
pub fn write_ray_log_to_writer<W: Write>(writer: W, samples: &[RaySample]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    for sample in samples {
        for ray in &sample.rays {
            csv_writer.serialize(RayRow {
                sample: sample.id,
                angle_deg: sample.angle_deg,
                x: ray.x,
                y: ray.y,
                z: ray.z,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
