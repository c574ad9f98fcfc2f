//! Reduces per-cell contributions into result records.

use h3o::{CellIndex, LatLng, Resolution};

use crate::aggregator::CellAccumulator;
use crate::types::{CellGeometry, GeoPoint, ResultRecord, ResultSet};

/// Arithmetic mean, summed in `f64`.
///
/// When the plain sum overflows, the values are scaled by the count before
/// summing, so finite inputs always give a finite mean.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }
    Some(values.iter().map(|v| v / n).sum())
}

/// Boundary vertices of `cell`, unclosed.
pub fn cell_boundary(cell: CellIndex) -> Vec<GeoPoint> {
    cell.boundary().iter().copied().map(GeoPoint::from).collect()
}

/// Canonical center of `cell`.
pub fn cell_centroid(cell: CellIndex) -> GeoPoint {
    GeoPoint::from(LatLng::from(cell))
}

/// Build one record per populated cell.
///
/// Geometry is derived from the cell index alone: a boundary ring when
/// `include_geometry` is set, otherwise the cell center.
pub fn materialize(accumulator: CellAccumulator, resolution: Resolution, include_geometry: bool) -> ResultSet {
    let records = accumulator
        .into_iter()
        .filter_map(|(cell, values)| {
            let value = mean(&values)?;
            let geometry = if include_geometry {
                CellGeometry::Boundary(cell_boundary(cell))
            } else {
                CellGeometry::Centroid(cell_centroid(cell))
            };
            Some(ResultRecord {
                cell,
                value,
                pixel_count: values.len(),
                geometry,
            })
        })
        .collect();

    ResultSet {
        resolution,
        include_geometry,
        records,
    }
}
