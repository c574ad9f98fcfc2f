//! GeoJSON FeatureCollection writer.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::types::{CellGeometry, GeoPoint, ResultRecord, ResultSet};

/// GeoJSON geometry of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum CellGeometryJson {
    /// Single closed exterior ring, `[lng, lat]` pairs.
    Polygon(Vec<Vec<[f64; 2]>>),
    /// `[lng, lat]`
    Point([f64; 2]),
}

impl From<&CellGeometry> for CellGeometryJson {
    fn from(geometry: &CellGeometry) -> Self {
        match geometry {
            CellGeometry::Boundary(vertices) => CellGeometryJson::Polygon(vec![closed_ring(vertices)]),
            CellGeometry::Centroid(point) => CellGeometryJson::Point(point.to_lng_lat()),
        }
    }
}

/// Properties carried by every cell feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellProperties {
    pub h3_index: String,
    pub value: f64,
}

/// GeoJSON Feature for one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFeature {
    /// Always "Feature".
    #[serde(rename = "type")]
    pub feature_type: String,

    pub geometry: CellGeometryJson,

    pub properties: CellProperties,
}

impl From<&ResultRecord> for CellFeature {
    fn from(record: &ResultRecord) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            geometry: CellGeometryJson::from(&record.geometry),
            properties: CellProperties {
                h3_index: record.h3_index(),
                value: record.value,
            },
        }
    }
}

/// GeoJSON FeatureCollection of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFeatureCollection {
    /// Always "FeatureCollection".
    #[serde(rename = "type")]
    pub collection_type: String,

    pub features: Vec<CellFeature>,
}

impl From<&ResultSet> for CellFeatureCollection {
    fn from(results: &ResultSet) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features: results.records.iter().map(CellFeature::from).collect(),
        }
    }
}

/// Serialize `results` as a GeoJSON FeatureCollection.
///
/// Fails with `InvalidData` if any value is not finite.
pub fn write_geojson<W: Write>(results: &ResultSet, out: &mut W) -> io::Result<()> {
    super::ensure_finite(results)?;
    let collection = CellFeatureCollection::from(results);
    serde_json::to_writer(&mut *out, &collection).map_err(io::Error::from)?;
    writeln!(out)
}

/// `[lng, lat]` ring with the first vertex repeated at the end.
fn closed_ring(vertices: &[GeoPoint]) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = vertices.iter().map(|p| p.to_lng_lat()).collect();
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}
