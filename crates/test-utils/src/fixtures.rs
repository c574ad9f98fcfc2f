//! Common test fixtures for raster conversion tests.

/// EPSG codes used across the tests.
pub mod crs {
    /// WGS84 geographic
    pub const WGS84: u16 = 4326;

    /// Web Mercator
    pub const WEB_MERCATOR: u16 = 3857;

    /// UTM zone 33 north (central meridian 15°E)
    pub const UTM_33N: u16 = 32633;
}

/// Named places as `(lat, lng)` in degrees.
pub mod location {
    pub const MUNICH: (f64, f64) = (48.137, 11.575);
    pub const SYDNEY: (f64, f64) = (-33.868, 151.209);
    pub const QUITO: (f64, f64) = (-0.180, -78.467);
    pub const NULL_ISLAND: (f64, f64) = (0.0, 0.0);
}

/// Description of a synthetic north-up raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSpec {
    pub width: usize,
    pub height: usize,
    /// X of the upper-left corner in CRS units.
    pub west: f64,
    /// Y of the upper-left corner in CRS units.
    pub north: f64,
    /// Pixel size in CRS units.
    pub pixel_size: f64,
    pub epsg: u16,
}

impl RasterSpec {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// GDAL-ordered geo-transform `[west, size, 0, north, 0, -size]`.
    pub fn gdal_transform(&self) -> [f64; 6] {
        [self.west, self.pixel_size, 0.0, self.north, 0.0, -self.pixel_size]
    }

    /// `(x, y)` of a pixel center in CRS units.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.west + (col as f64 + 0.5) * self.pixel_size,
            self.north - (row as f64 + 0.5) * self.pixel_size,
        )
    }
}

/// Ready-made raster layouts.
pub mod raster {
    use super::{crs, RasterSpec};

    /// 2x2 WGS84 tile of ~1 m pixels near Munich
    pub const TINY_WGS84: RasterSpec = RasterSpec {
        width: 2,
        height: 2,
        west: 11.575,
        north: 48.137,
        pixel_size: 0.00001,
        epsg: crs::WGS84,
    };

    /// 64x48 WGS84 tile of ~30 m (1 arc-second) pixels
    pub const SRTM_TILE: RasterSpec = RasterSpec {
        width: 64,
        height: 48,
        west: 11.5,
        north: 48.2,
        pixel_size: 1.0 / 3600.0,
        epsg: crs::WGS84,
    };

    /// 40x30 UTM 33N tile of 100 m pixels straddling the central meridian
    pub const UTM_TILE: RasterSpec = RasterSpec {
        width: 40,
        height: 30,
        west: 498_000.0,
        north: 5_300_000.0,
        pixel_size: 100.0,
        epsg: crs::UTM_33N,
    };

    /// 32x32 Web Mercator tile of 500 m pixels around the equator
    pub const MERCATOR_TILE: RasterSpec = RasterSpec {
        width: 32,
        height: 32,
        west: -8_000.0,
        north: 8_000.0,
        pixel_size: 500.0,
        epsg: crs::WEB_MERCATOR,
    };
}
