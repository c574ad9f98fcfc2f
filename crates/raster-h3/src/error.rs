//! Error types for raster to H3 conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion run.
///
/// Cancellation is not an error; see
/// [`ConversionOutcome::Cancelled`](crate::ConversionOutcome::Cancelled).
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The raster could not be opened or its metadata is corrupt.
    #[error("failed to read raster source: {0}")]
    Source(String),

    /// The raster declares no coordinate reference system.
    #[error("raster source has no coordinate reference system")]
    MissingCrs,

    /// The declared coordinate reference system cannot be used.
    #[error("invalid coordinate reference system: {0}")]
    InvalidCrs(String),

    /// A pixel center could not be reprojected to WGS84.
    #[error("reprojection failed at pixel (row {row}, col {col}): {message}")]
    Reprojection {
        row: usize,
        col: usize,
        message: String,
    },

    /// Resolution outside the supported 0-15 range.
    #[error("invalid H3 resolution {0} (expected 0-15)")]
    InvalidResolution(u8),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    /// Create a Source error.
    pub fn source_error(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create an InvalidCrs error.
    pub fn invalid_crs(msg: impl Into<String>) -> Self {
        Self::InvalidCrs(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Write error for `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<tiff::TiffError> for ConversionError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Source(err.to_string())
    }
}

impl From<raster_common::CrsParseError> for ConversionError {
    fn from(err: raster_common::CrsParseError) -> Self {
        Self::InvalidCrs(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConversionError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
