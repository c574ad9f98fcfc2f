//! Reprojection from a raster's source CRS to WGS84 longitude/latitude.
//!
//! Definitions come from the `crs-definitions` EPSG database and are executed
//! with `proj4rs`, so any registered projected or geographic CRS (UTM zones,
//! national grids, Web Mercator, ...) is supported without native PROJ.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use raster_common::{Crs, EPSG_WGS84};

use crate::error::{ProjectionError, Result};

/// Get the PROJ.4 string for an EPSG code.
#[inline]
pub fn get_proj_string(epsg: u16) -> Option<&'static str> {
    crs_definitions::from_code(epsg).map(|def| def.proj4)
}

/// Check if an EPSG code represents a geographic (lon/lat) CRS.
pub fn is_geographic_crs(epsg: u16) -> bool {
    match get_proj_string(epsg) {
        Some(def) => is_longlat_definition(def),
        None => epsg == EPSG_WGS84,
    }
}

/// Check if a CRS uses geographic (degree) coordinates.
pub fn crs_is_geographic(crs: &Crs) -> bool {
    match crs {
        Crs::Epsg(code) => is_geographic_crs(*code),
        Crs::Proj4(def) => is_longlat_definition(def),
    }
}

fn is_longlat_definition(def: &str) -> bool {
    def.contains("+proj=longlat") || def.contains("+proj=latlong")
}

enum Strategy {
    /// Source already is WGS84; coordinates pass through unchanged.
    Identity,
    /// Generic proj4rs transform.
    Proj4rs {
        source: Box<Proj>,
        target: Box<Proj>,
        source_is_geographic: bool,
    },
}

/// Reusable transformer from one source CRS to WGS84.
///
/// Output coordinates are always `(longitude, latitude)` in degrees.
pub struct CoordTransformer {
    strategy: Strategy,
    source_crs: Crs,
}

impl std::fmt::Debug for CoordTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strategy = match &self.strategy {
            Strategy::Identity => "identity",
            Strategy::Proj4rs { .. } => "proj4rs",
        };
        f.debug_struct("CoordTransformer")
            .field("source_crs", &self.source_crs)
            .field("strategy", &strategy)
            .finish_non_exhaustive()
    }
}

impl CoordTransformer {
    /// Build a transformer from `source` to WGS84.
    ///
    /// # Errors
    /// Fails if the EPSG code is unknown or the definition cannot be parsed.
    pub fn to_wgs84(source: &Crs) -> Result<Self> {
        if source.is_wgs84() {
            return Ok(Self {
                strategy: Strategy::Identity,
                source_crs: source.clone(),
            });
        }

        let (source_def, source_is_geographic) = match source {
            Crs::Epsg(code) => {
                let def = get_proj_string(*code).ok_or(ProjectionError::UnsupportedEpsg(*code))?;
                (def.to_string(), is_longlat_definition(def))
            }
            Crs::Proj4(def) => (def.clone(), is_longlat_definition(def)),
        };
        let target_def =
            get_proj_string(EPSG_WGS84).ok_or(ProjectionError::UnsupportedEpsg(EPSG_WGS84))?;

        let source_proj = parse_proj(&source_def)?;
        let target_proj = parse_proj(target_def)?;

        Ok(Self {
            strategy: Strategy::Proj4rs {
                source: Box::new(source_proj),
                target: Box::new(target_proj),
                source_is_geographic,
            },
            source_crs: source.clone(),
        })
    }

    /// The CRS this transformer reads from.
    pub fn source_crs(&self) -> &Crs {
        &self.source_crs
    }

    /// True when no reprojection is performed.
    pub fn is_identity(&self) -> bool {
        matches!(self.strategy, Strategy::Identity)
    }

    /// Transform one source-CRS coordinate to `(longitude, latitude)`.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match &self.strategy {
            Strategy::Identity => Ok((x, y)),
            Strategy::Proj4rs {
                source,
                target,
                source_is_geographic,
            } => {
                // proj4rs uses radians for geographic coordinates
                let mut point = if *source_is_geographic {
                    (x.to_radians(), y.to_radians(), 0.0)
                } else {
                    (x, y, 0.0)
                };

                transform(source, target, &mut point).map_err(|e| self.failure(x, y, format!("{e:?}")))?;

                let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
                if !lon.is_finite() || !lat.is_finite() {
                    return Err(self.failure(x, y, "non-finite result".to_string()));
                }
                Ok((lon, lat))
            }
        }
    }

    /// Transform a batch of coordinates in place.
    ///
    /// Equivalent to calling [`transform`](Self::transform) on each point;
    /// stops at the first failure and reports its index.
    pub fn transform_batch(&self, points: &mut [(f64, f64)]) -> Result<()> {
        if self.is_identity() {
            return Ok(());
        }
        for (index, point) in points.iter_mut().enumerate() {
            *point = self
                .transform(point.0, point.1)
                .map_err(|e| ProjectionError::BatchPointFailed {
                    index,
                    inner: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn failure(&self, x: f64, y: f64, reason: String) -> ProjectionError {
        ProjectionError::TransformFailed {
            source_crs: self.source_crs.to_string(),
            x,
            y,
            reason,
        }
    }
}

fn parse_proj(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| ProjectionError::InvalidDefinition {
        definition: definition.to_string(),
        reason: format!("{e:?}"),
    })
}
