//! Tests for CRS identifiers and bounding boxes as used by raster sources.

use raster_common::{Crs, CrsParseError};

// ============================================================================
// CRS parsing
// ============================================================================

#[test]
fn test_utm_zones_parse_as_epsg() {
    for zone in 1..=60u16 {
        let north = format!("EPSG:{}", 32600 + zone);
        let south = format!("EPSG:{}", 32700 + zone);
        assert_eq!(Crs::parse(&north).unwrap().epsg(), Some(32600 + zone));
        assert_eq!(Crs::parse(&south).unwrap().epsg(), Some(32700 + zone));
    }
}

#[test]
fn test_zero_code_is_invalid() {
    assert!(matches!(
        Crs::parse("EPSG:0"),
        Err(CrsParseError::InvalidCode(_))
    ));
}

#[test]
fn test_from_str_matches_parse() {
    let crs: Crs = "EPSG:3857".parse().unwrap();
    assert_eq!(crs, Crs::parse("EPSG:3857").unwrap());
}

#[test]
fn test_crs_serde_roundtrip() {
    let crs = Crs::Epsg(32633);
    let json = serde_json::to_string(&crs).unwrap();
    let back: Crs = serde_json::from_str(&json).unwrap();
    assert_eq!(crs, back);
}
