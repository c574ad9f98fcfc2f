//! Common types shared by the raster-h3 workspace crates.

pub mod bbox;
pub mod crs;

pub use bbox::BoundingBox;
pub use crs::{Crs, CrsParseError, EPSG_WGS84};
