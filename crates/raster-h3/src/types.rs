//! Core types for raster to H3 conversion.

use std::path::PathBuf;
use std::time::Duration;

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

use crate::writer::OutputFormat;

/// A WGS84 geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordinates in GeoJSON `[longitude, latitude]` order.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<LatLng> for GeoPoint {
    fn from(ll: LatLng) -> Self {
        Self::new(ll.lat(), ll.lng())
    }
}

/// Geometry attached to a result record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellGeometry {
    /// Hexagon (or pentagon) boundary vertices, unclosed.
    Boundary(Vec<GeoPoint>),
    /// Canonical cell center.
    Centroid(GeoPoint),
}

/// One aggregated H3 cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// H3 cell identifier.
    pub cell: CellIndex,
    /// Arithmetic mean of all contributing pixel values.
    pub value: f64,
    /// Number of pixels that contributed to `value`.
    pub pixel_count: usize,
    /// Boundary polygon or centroid, depending on the geometry flag.
    pub geometry: CellGeometry,
}

impl ResultRecord {
    /// Cell identifier in its canonical hexadecimal string form.
    pub fn h3_index(&self) -> String {
        self.cell.to_string()
    }
}

/// Materialized output of one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Resolution all cells belong to.
    pub resolution: Resolution,
    /// Whether records carry boundary polygons.
    pub include_geometry: bool,
    /// One record per populated cell, in unspecified order.
    pub records: Vec<ResultRecord>,
}

impl ResultSet {
    /// An explicitly empty result set.
    pub fn empty(resolution: Resolution, include_geometry: bool) -> Self {
        Self {
            resolution,
            include_geometry,
            records: Vec::new(),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a cell.
    pub fn get(&self, cell: CellIndex) -> Option<&ResultRecord> {
        self.records.iter().find(|r| r.cell == cell)
    }
}

/// Summary of a completed conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    /// Path of the raster that was converted.
    pub source_path: PathBuf,
    /// Path of the written output file.
    pub output_path: PathBuf,
    /// Output format written.
    pub format: OutputFormat,
    /// H3 resolution used.
    pub resolution: u8,
    /// Number of H3 cells written.
    pub cell_count: usize,
    /// Pixels that contributed to a cell.
    pub pixels_used: u64,
    /// Pixels skipped as no-data or NaN.
    pub pixels_skipped: u64,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Terminal state of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// All rows were scanned and the output was written.
    Completed(ConversionSummary),
    /// The run observed a cancellation request. Nothing was written.
    Cancelled {
        /// Rows fully scanned before cancellation was observed.
        rows_scanned: usize,
        /// Total rows in the raster.
        total_rows: usize,
    },
}

impl ConversionOutcome {
    /// Check if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConversionOutcome::Cancelled { .. })
    }

    /// Summary of a completed run.
    pub fn summary(&self) -> Option<&ConversionSummary> {
        match self {
            ConversionOutcome::Completed(summary) => Some(summary),
            ConversionOutcome::Cancelled { .. } => None,
        }
    }
}
