//! Output writers.
//!
//! Two shapes are supported:
//! - [`OutputFormat::GeoJson`]: a FeatureCollection with one polygon per cell
//! - [`OutputFormat::Csv`]: `h3_index,value,longitude,latitude` rows
//!
//! Files are written atomically: rows are streamed into a temporary file in
//! the destination directory which is renamed over the target only once
//! everything has been flushed.
//!
//! Both writers refuse result sets holding a non-finite value: JSON has no
//! encoding for infinities, and the two formats must carry the same values.

mod csv;
mod geojson;

pub use self::csv::{write_csv, CSV_HEADER};
pub use self::geojson::{
    write_geojson, CellFeature, CellFeatureCollection, CellGeometryJson, CellProperties,
};

use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConversionError, Result};
use crate::types::ResultSet;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// GeoJSON FeatureCollection.
    GeoJson,
    /// Flat CSV table.
    Csv,
}

impl OutputFormat {
    /// Format implied by the geometry flag.
    pub fn for_geometry(include_geometry: bool) -> Self {
        if include_geometry {
            OutputFormat::GeoJson
        } else {
            OutputFormat::Csv
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::GeoJson => "geojson",
            OutputFormat::Csv => "csv",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Some(OutputFormat::GeoJson),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::GeoJson => write!(f, "GeoJSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// Fails with `InvalidData` on the first record whose value is NaN or infinite.
fn ensure_finite(results: &ResultSet) -> io::Result<()> {
    match results.records.iter().find(|r| !r.value.is_finite()) {
        Some(record) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("cell {} has non-finite value {}", record.cell, record.value),
        )),
        None => Ok(()),
    }
}

/// Write `results` to `path` in `format`.
///
/// Creates the parent directory if needed. Either the complete file appears
/// at `path` or nothing does; a non-finite value fails before any file is
/// created.
pub fn write_result_set(results: &ResultSet, path: &Path, format: OutputFormat) -> Result<()> {
    ensure_finite(results).map_err(|e| ConversionError::write(path, e))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| ConversionError::write(parent, e))?;

    let tmp = NamedTempFile::new_in(parent).map_err(|e| ConversionError::write(path, e))?;
    let mut out = BufWriter::new(tmp);

    match format {
        OutputFormat::GeoJson => write_geojson(results, &mut out),
        OutputFormat::Csv => write_csv(results, &mut out),
    }
    .map_err(|e| ConversionError::write(path, e))?;

    out.flush().map_err(|e| ConversionError::write(path, e))?;
    let tmp = out
        .into_inner()
        .map_err(|e| ConversionError::write(path, e.into_error()))?;
    tmp.persist(path)
        .map_err(|e| ConversionError::write(path, e.error))?;

    debug!(
        path = %path.display(),
        format = %format,
        records = results.len(),
        "Wrote result set"
    );
    Ok(())
}
