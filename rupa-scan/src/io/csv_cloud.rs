//! Point cloud CSV files.
//!
//! Format: one header line (ignored on read), then one `x,y,z` row per
//! point. Extra trailing columns are ignored. The writer emits the header
//! `X,Y,Z` and six decimal places.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::core::types::PointCloud;
use crate::error::{Error, Result};

/// Read a point cloud from a CSV file.
pub fn read_cloud(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;

    let cloud = read_cloud_from_reader(file, &path.display().to_string())?;
    log::debug!("Read {} points from {}", cloud.len(), path.display());
    Ok(cloud)
}

/// Read a point cloud from any reader. `source_name` labels errors.
pub fn read_cloud_from_reader<R: Read>(reader: R, source_name: &str) -> Result<PointCloud> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut cloud = PointCloud::new();
    let mut record = StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() < 3 {
            return Err(Error::invalid_data(
                source_name,
                format!("line {line}: expected at least 3 columns, found {}", record.len()),
            ));
        }
        let x = parse_field(&record, 0, line, source_name)?;
        let y = parse_field(&record, 1, line, source_name)?;
        let z = parse_field(&record, 2, line, source_name)?;
        cloud.push_xyz(x, y, z);
    }
    Ok(cloud)
}

fn parse_field(record: &StringRecord, column: usize, line: u64, source_name: &str) -> Result<f64> {
    let field = record.get(column).unwrap_or("");
    field.parse::<f64>().map_err(|_| {
        Error::invalid_data(
            source_name,
            format!("line {line}, column {}: '{field}' is not a number", column + 1),
        )
    })
}

/// Write a point cloud to a CSV file, replacing any existing file.
pub fn write_cloud(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_cloud_to_writer(file, cloud)?;
    log::info!("Wrote {} points to {}", cloud.len(), path.display());
    Ok(())
}

/// Write a point cloud to any writer.
pub fn write_cloud_to_writer<W: Write>(writer: W, cloud: &PointCloud) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(["X", "Y", "Z"])?;
    for p in cloud.iter() {
        csv_writer.write_record([
            format!("{:.6}", p.x),
            format!("{:.6}", p.y),
            format!("{:.6}", p.z),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
