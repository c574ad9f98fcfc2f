//! Pixel to geographic coordinate reprojection.

use projection::{CoordTransformer, GeoTransform, ProjectionError};
use raster_common::Crs;

use crate::error::{ConversionError, Result};
use crate::source::RasterSource;
use crate::types::GeoPoint;

/// Maps pixel centers of one raster to WGS84.
#[derive(Debug)]
pub struct PixelReprojector {
    transform: GeoTransform,
    transformer: CoordTransformer,
}

impl PixelReprojector {
    /// Build a reprojector for a transform and declared CRS.
    ///
    /// # Errors
    /// [`ConversionError::MissingCrs`] when `crs` is `None`,
    /// [`ConversionError::InvalidCrs`] when it cannot be resolved.
    pub fn new(transform: GeoTransform, crs: Option<&Crs>) -> Result<Self> {
        let crs = crs.ok_or(ConversionError::MissingCrs)?;
        let transformer =
            CoordTransformer::to_wgs84(crs).map_err(|e| ConversionError::invalid_crs(e.to_string()))?;

        Ok(Self {
            transform,
            transformer,
        })
    }

    /// Build a reprojector for a raster source.
    pub fn for_source<S: RasterSource + ?Sized>(source: &S) -> Result<Self> {
        Self::new(*source.geo_transform(), source.crs())
    }

    /// True when the source already is WGS84.
    pub fn is_identity(&self) -> bool {
        self.transformer.is_identity()
    }

    /// Geographic position of the center of pixel (`row`, `col`).
    pub fn pixel_to_geo(&self, row: usize, col: usize) -> Result<GeoPoint> {
        let (x, y) = self.transform.pixel_center(row, col);
        let (lng, lat) = self
            .transformer
            .transform(x, y)
            .map_err(|e| reprojection_error(row, col, e))?;
        Ok(GeoPoint::new(lat, lng))
    }

    /// Fill `out` with the `(lng, lat)` centers of the pixels at `cols` in `row`.
    ///
    /// `out` is cleared first so a single buffer can be reused across rows.
    pub fn project_columns(&self, row: usize, cols: &[usize], out: &mut Vec<(f64, f64)>) -> Result<()> {
        out.clear();
        out.extend(cols.iter().map(|&col| self.transform.pixel_center(row, col)));

        self.transformer.transform_batch(out).map_err(|e| match e {
            ProjectionError::BatchPointFailed { index, inner } => {
                let col = cols.get(index).copied().unwrap_or(index);
                reprojection_error(row, col, *inner)
            }
            other => reprojection_error(row, cols.first().copied().unwrap_or(0), other),
        })
    }
}

fn reprojection_error(row: usize, col: usize, err: ProjectionError) -> ConversionError {
    ConversionError::Reprojection {
        row,
        col,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_uses_pixel_center() {
        let reprojector =
            PixelReprojector::new(GeoTransform::from_origin(10.0, 50.0, 0.1, 0.1), Some(&Crs::wgs84()))
                .unwrap();
        assert!(reprojector.is_identity());

        let p = reprojector.pixel_to_geo(0, 0).unwrap();
        assert!((p.lng - 10.05).abs() < 1e-12);
        assert!((p.lat - 49.95).abs() < 1e-12);
    }

    #[test]
    fn test_missing_crs() {
        let result = PixelReprojector::new(GeoTransform::from_origin(0.0, 0.0, 1.0, 1.0), None);
        assert!(matches!(result, Err(ConversionError::MissingCrs)));
    }

    #[test]
    fn test_unknown_epsg_is_invalid_crs() {
        let result =
            PixelReprojector::new(GeoTransform::from_origin(0.0, 0.0, 1.0, 1.0), Some(&Crs::Epsg(1)));
        assert!(matches!(result, Err(ConversionError::InvalidCrs(_))));
    }

    #[test]
    fn test_project_columns_matches_single_points() {
        let reprojector = PixelReprojector::new(
            GeoTransform::from_origin(1_000_000.0, 6_000_000.0, 100.0, 100.0),
            Some(&Crs::Epsg(3857)),
        )
        .unwrap();

        let cols = [0, 2, 5];
        let mut points = Vec::new();
        reprojector.project_columns(3, &cols, &mut points).unwrap();
        assert_eq!(points.len(), 3);

        for (&col, &(lng, lat)) in cols.iter().zip(points.iter()) {
            let p = reprojector.pixel_to_geo(3, col).unwrap();
            assert!((p.lng - lng).abs() < 1e-12);
            assert!((p.lat - lat).abs() < 1e-12);
        }
    }
}
