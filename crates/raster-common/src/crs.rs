//! Coordinate Reference System identifiers.
//!
//! Rasters declare their CRS either as an EPSG code (from GeoTIFF geokeys or
//! a user-supplied `EPSG:xxxx` string) or as a raw PROJ.4 definition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of the WGS84 geographic reference used for all H3 lookups.
pub const EPSG_WGS84: u16 = 4326;

/// A coordinate reference system as declared by a raster source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// A registered EPSG code.
    Epsg(u16),
    /// A raw PROJ.4 definition string (e.g. `+proj=utm +zone=33 +datum=WGS84`).
    Proj4(String),
}

impl Crs {
    /// The WGS84 geographic reference (EPSG:4326).
    pub fn wgs84() -> Self {
        Crs::Epsg(EPSG_WGS84)
    }

    /// Parse a CRS identifier string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32633", "epsg:4326"
    /// - "urn:ogc:def:crs:EPSG::3857"
    /// - "CRS:84" / "OGC:CRS84" (WGS84 with lon/lat axis order)
    /// - "+proj=merc +a=6378137 ..." (PROJ.4 string)
    /// - "4326" (bare EPSG code)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CrsParseError::Empty);
        }

        if trimmed.starts_with("+proj=") || trimmed.starts_with("+init=") {
            return Ok(Crs::Proj4(trimmed.to_string()));
        }

        let normalized = trimmed.to_uppercase();
        match normalized.as_str() {
            "CRS:84" | "OGC:CRS84" | "WGS84" => return Ok(Crs::wgs84()),
            _ => {}
        }

        let code = if let Some(rest) = normalized.strip_prefix("EPSG:") {
            rest
        } else if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // Optional version segment: "EPSG::4326" or "EPSG:9.9:4326"
            rest.rsplit(':').next().unwrap_or(rest)
        } else if normalized.chars().all(|c| c.is_ascii_digit()) {
            normalized.as_str()
        } else {
            return Err(CrsParseError::Malformed(trimmed.to_string()));
        };

        code.parse::<u16>()
            .ok()
            .filter(|c| *c > 0)
            .map(Crs::Epsg)
            .ok_or_else(|| CrsParseError::InvalidCode(trimmed.to_string()))
    }

    /// EPSG code, if this CRS is identified by one.
    pub fn epsg(&self) -> Option<u16> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj4(_) => None,
        }
    }

    /// Check if this is exactly the WGS84 geographic reference.
    pub fn is_wgs84(&self) -> bool {
        matches!(self, Crs::Epsg(EPSG_WGS84))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj4(def) => write!(f, "{}", def),
        }
    }
}

impl std::str::FromStr for Crs {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crs::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrsParseError {
    #[error("CRS identifier is empty")]
    Empty,

    #[error("Malformed CRS identifier: {0}")]
    Malformed(String),

    #[error("Invalid EPSG code in CRS identifier: {0}")]
    InvalidCode(String),
}
