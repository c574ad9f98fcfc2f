//! Coordinate reference system transformations.
//!
//! Two stages take a raster pixel to geographic coordinates:
//!
//! 1. [`GeoTransform`] maps a (row, column) pixel position into the raster's
//!    own CRS using its affine geo-transform.
//! 2. [`CoordTransformer`] reprojects source-CRS coordinates to WGS84
//!    longitude/latitude, short-circuiting when the source already is WGS84.

pub mod affine;
pub mod error;
pub mod transform;

pub use affine::GeoTransform;
pub use error::{ProjectionError, Result};
pub use transform::{crs_is_geographic, get_proj_string, is_geographic_crs, CoordTransformer};
