//! Affine geo-transform between pixel space and a raster's source CRS.
//!
//! Coefficients follow the usual raster affine convention:
//!
//! ```text
//! x = a * col + b * row + c
//! y = d * col + e * row + f
//! ```
//!
//! For a north-up raster `b` and `d` are zero, `a` is the pixel width and `e`
//! is the (negative) pixel height.

use nalgebra::{Matrix3, Vector3};
use raster_common::BoundingBox;

/// Affine pixel-to-CRS transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    matrix: Matrix3<f64>,
}

impl GeoTransform {
    /// Create a transform from the six affine coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            matrix: Matrix3::new(a, b, c, d, e, f, 0.0, 0.0, 1.0),
        }
    }

    /// Create a transform from a GDAL-ordered geo-transform
    /// `[origin_x, pixel_w, row_rot, origin_y, col_rot, pixel_h]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// North-up transform anchored at the upper-left corner.
    ///
    /// `x_size` and `y_size` are positive pixel dimensions in CRS units.
    pub fn from_origin(west: f64, north: f64, x_size: f64, y_size: f64) -> Self {
        Self::new(x_size, 0.0, west, 0.0, -y_size, north)
    }

    /// Apply the transform to fractional pixel coordinates.
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let p = self.matrix * Vector3::new(col, row, 1.0);
        (p.x, p.y)
    }

    /// Source-CRS coordinate of a pixel's center (half-pixel offset on both axes).
    #[inline]
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Pixel dimensions `(width, height)` in CRS units, always positive.
    pub fn pixel_size(&self) -> (f64, f64) {
        let m = &self.matrix;
        (
            m[(0, 0)].hypot(m[(1, 0)]),
            m[(0, 1)].hypot(m[(1, 1)]),
        )
    }

    /// True when the transform can be inverted (non-degenerate pixel size).
    pub fn is_invertible(&self) -> bool {
        let m = &self.matrix;
        let det = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
        det.is_finite() && det != 0.0
    }

    /// Translate the transform by a fractional number of pixels.
    ///
    /// Used to re-anchor PixelIsPoint rasters, whose tie points refer to
    /// pixel centers rather than corners.
    pub fn shifted(&self, d_col: f64, d_row: f64) -> Self {
        let (c, f) = self.apply(d_col, d_row);
        let m = &self.matrix;
        Self::new(m[(0, 0)], m[(0, 1)], c, m[(1, 0)], m[(1, 1)], f)
    }

    /// Extent covered by a `width` x `height` grid, in source CRS units.
    pub fn bounds(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        BoundingBox::from_points([
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ])
        .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }
}
