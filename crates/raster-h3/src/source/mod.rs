//! Raster sources.
//!
//! The engine only reads rasters through [`RasterSource`]; [`RasterBand`] is
//! the in-memory implementation produced by the GeoTIFF reader and by tests.

mod geotiff;

pub use geotiff::{read_geotiff, read_geotiff_from};

use projection::GeoTransform;
use raster_common::{BoundingBox, Crs};

use crate::error::{ConversionError, Result};

/// Read-only access to a single georeferenced raster band.
pub trait RasterSource {
    /// Number of columns.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;

    /// Pixel to source-CRS affine transform.
    fn geo_transform(&self) -> &GeoTransform;

    /// Declared coordinate reference system, if any.
    fn crs(&self) -> Option<&Crs>;

    /// No-data sentinel, if any.
    fn nodata(&self) -> Option<f64>;

    /// Pixel values of one row, `width()` long. `row` must be `< height()`.
    fn row(&self, row: usize) -> &[f64];

    /// Total number of pixels.
    fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Check if `value` must be skipped (no-data sentinel or NaN).
    #[inline]
    fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || self.nodata().is_some_and(|nd| value == nd)
    }

    /// Extent in source CRS units.
    fn bounds(&self) -> BoundingBox {
        self.geo_transform().bounds(self.width(), self.height())
    }
}

/// An in-memory raster band with row-major samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBand {
    data: Vec<f64>,
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: Option<Crs>,
    nodata: Option<f64>,
}

impl RasterBand {
    /// Create a new band.
    ///
    /// # Errors
    /// Fails if `data.len() != width * height` or the transform is degenerate.
    pub fn new(
        data: Vec<f64>,
        width: usize,
        height: usize,
        transform: GeoTransform,
        crs: Option<Crs>,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(ConversionError::source_error(format!(
                "raster data has {} samples, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        if !transform.is_invertible() {
            return Err(ConversionError::source_error(
                "raster geo-transform is degenerate (zero pixel size)",
            ));
        }

        Ok(Self {
            data,
            width,
            height,
            transform,
            crs,
            nodata: None,
        })
    }

    /// Set the no-data sentinel.
    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Replace the declared CRS.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// All samples in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get the value at a specific pixel.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }
}

impl RasterSource for RasterBand {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn geo_transform(&self) -> &GeoTransform {
        &self.transform
    }

    fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn row(&self, row: usize) -> &[f64] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(data: Vec<f64>, width: usize, height: usize) -> Result<RasterBand> {
        RasterBand::new(
            data,
            width,
            height,
            GeoTransform::from_origin(0.0, 10.0, 1.0, 1.0),
            Some(Crs::wgs84()),
        )
    }

    #[test]
    fn test_rows_are_row_major() {
        let band = band(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        assert_eq!(band.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(band.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(band.get(1, 2), Some(6.0));
        assert_eq!(band.get(2, 0), None);
        assert_eq!(band.pixel_count(), 6);
    }

    #[test]
    fn test_size_mismatch_is_source_error() {
        assert!(matches!(
            band(vec![1.0; 5], 3, 2),
            Err(ConversionError::Source(_))
        ));
    }

    #[test]
    fn test_degenerate_transform_rejected() {
        let result = RasterBand::new(
            vec![0.0; 4],
            2,
            2,
            GeoTransform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_is_nodata() {
        let band = band(vec![0.0; 4], 2, 2).unwrap().with_nodata(Some(-9999.0));
        assert!(band.is_nodata(-9999.0));
        assert!(band.is_nodata(f64::NAN));
        assert!(!band.is_nodata(0.0));

        let no_sentinel = band.clone().with_nodata(None);
        assert!(!no_sentinel.is_nodata(-9999.0));
        assert!(no_sentinel.is_nodata(f64::NAN));
    }
}
