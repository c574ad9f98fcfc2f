//! Resolution advisor.
//!
//! Recommends H3 levels for a raster's ground resolution and estimates run
//! time and hexagon area. Purely advisory: nothing here affects conversion.

use std::fmt;

use projection::crs_is_geographic;
use serde::Serialize;

use crate::config::MAX_RESOLUTION;
use crate::error::{ConversionError, Result};
use crate::source::RasterSource;

/// Approximate hexagon edge length in metres per level 0..=15.
pub const EDGE_LENGTH_M: [f64; 16] = [
    1_107_000.0,
    418_000.0,
    158_000.0,
    59_000.0,
    22_000.0,
    8_300.0,
    3_100.0,
    1_150.0,
    430.0,
    160.0,
    60.0,
    23.0,
    8.5,
    3.2,
    1.2,
    0.45,
];

/// Flat-topped hexagon area factor (3√3 / 2, rounded).
const HEX_AREA_FACTOR: f64 = 2.598;

/// Baseline throughput: seconds per million pixels at the optimal level.
const SECONDS_PER_MEGAPIXEL: f64 = 10.0;

/// Run-time growth per level finer than optimal.
const LEVEL_TIME_FACTOR: f64 = 1.5;

/// Metres per degree of latitude (WGS84 mean).
const METRES_PER_DEGREE: f64 = 111_320.0;

/// Recommended H3 levels for a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Coarsest sensible level; each hexagon spans many pixels.
    pub min_level: u8,
    /// Finest supported level.
    pub max_level: u8,
    /// Level whose hexagon edge roughly matches one pixel.
    pub optimal_level: u8,
}

/// Recommend levels for an average pixel size in metres.
pub fn recommend(avg_pixel_size_m: f64) -> Recommendation {
    Recommendation {
        min_level: first_level_not_larger_than(avg_pixel_size_m * 10.0),
        max_level: MAX_RESOLUTION,
        optimal_level: first_level_not_larger_than(avg_pixel_size_m),
    }
}

/// Smallest level whose edge length is <= `size_m`, else the finest level.
fn first_level_not_larger_than(size_m: f64) -> u8 {
    EDGE_LENGTH_M
        .iter()
        .position(|&edge| size_m >= edge)
        .map(|i| i as u8)
        .unwrap_or(MAX_RESOLUTION)
}

/// Estimated run time in seconds for converting `total_pixels` at `level`.
pub fn estimated_seconds(total_pixels: u64, level: u8, optimal_level: u8) -> f64 {
    let base = total_pixels as f64 / 1_000_000.0 * SECONDS_PER_MEGAPIXEL;
    let exponent = i32::from(level) - i32::from(optimal_level);
    base * LEVEL_TIME_FACTOR.powi(exponent)
}

/// Human-readable duration estimate: `"x.x sec"` below a minute, else `"x.x min"`.
pub fn format_estimate(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1} sec", seconds)
    } else {
        format!("{:.1} min", seconds / 60.0)
    }
}

/// Approximate hexagon area in km² at `level` (clamped to the finest level).
pub fn hexagon_area_km2(level: u8) -> f64 {
    let edge_km = EDGE_LENGTH_M[usize::from(level.min(MAX_RESOLUTION))] / 1000.0;
    HEX_AREA_FACTOR * edge_km * edge_km
}

/// Pre-run metadata summary of a raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterReport {
    /// Pixel width in metres.
    pub pixel_size_x_m: f64,
    /// Pixel height in metres.
    pub pixel_size_y_m: f64,
    pub width: usize,
    pub height: usize,
    /// Size of the raster file, when read from disk.
    pub file_size_bytes: Option<u64>,
    /// Level the estimates are computed for.
    pub level: u8,
    pub recommendation: Recommendation,
}

impl RasterReport {
    /// Build a report for `source` at `level`.
    ///
    /// Pixel sizes of geographic rasters are converted from degrees to metres
    /// at the raster's central latitude.
    pub fn new(source: &dyn RasterSource, level: u8, file_size_bytes: Option<u64>) -> Result<Self> {
        if level > MAX_RESOLUTION {
            return Err(ConversionError::InvalidResolution(level));
        }

        let (mut size_x, mut size_y) = source.geo_transform().pixel_size();
        if source.crs().is_some_and(crs_is_geographic) {
            let center_lat = source.bounds().center().1;
            size_x *= METRES_PER_DEGREE * center_lat.to_radians().cos().abs();
            size_y *= METRES_PER_DEGREE;
        }

        let avg = (size_x + size_y) / 2.0;
        Ok(Self {
            pixel_size_x_m: size_x,
            pixel_size_y_m: size_y,
            width: source.width(),
            height: source.height(),
            file_size_bytes,
            level,
            recommendation: recommend(avg),
        })
    }

    /// Mean of pixel width and height, in metres.
    pub fn avg_pixel_size_m(&self) -> f64 {
        (self.pixel_size_x_m + self.pixel_size_y_m) / 2.0
    }

    /// Pixel area in m².
    pub fn pixel_area_m2(&self) -> f64 {
        self.pixel_size_x_m * self.pixel_size_y_m
    }

    pub fn total_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Estimated run time at the report's level.
    pub fn estimated_seconds(&self) -> f64 {
        estimated_seconds(self.total_pixels(), self.level, self.recommendation.optimal_level)
    }

    /// Estimated hexagon area at the report's level, in km².
    pub fn hexagon_area_km2(&self) -> f64 {
        hexagon_area_km2(self.level)
    }
}

fn format_file_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.2} KB", kb)
    } else {
        format!("{:.2} MB", kb / 1024.0)
    }
}

/// Group the integer part with thousands separators.
fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value);
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{}{}", sign, out)
}

impl fmt::Display for RasterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rec = &self.recommendation;
        let area_km2 = self.hexagon_area_km2();

        writeln!(f, "=== Raster Metadata Summary ===")?;
        writeln!(
            f,
            "Pixel size       : {:.2} m x {:.2} m",
            self.pixel_size_x_m, self.pixel_size_y_m
        )?;
        writeln!(f, "Pixel area       : {:.2} m²", self.pixel_area_m2())?;
        writeln!(f, "Raster dimension : {} cols x {} rows", self.width, self.height)?;
        writeln!(f, "Total pixels     : {}", self.total_pixels())?;
        if let Some(bytes) = self.file_size_bytes {
            writeln!(f, "File size        : {}", format_file_size(bytes))?;
        }
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(
            f,
            "H3 recommendation : Min {}, Max {}, Optimal {}",
            rec.min_level, rec.max_level, rec.optimal_level
        )?;
        writeln!(f, "Est. duration     : {}", format_estimate(self.estimated_seconds()))?;
        write!(
            f,
            "Est. hexagon area : ~{:.4} km² / {} m² (level {})",
            area_km2,
            format_thousands(area_km2 * 1_000_000.0),
            self.level
        )
    }
}
