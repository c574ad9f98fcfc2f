//! Error types for coordinate transformations.

use thiserror::Error;

/// Errors that can occur while building or applying a reprojection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The EPSG code has no known definition.
    #[error("EPSG:{0} is not in the crs-definitions database")]
    UnsupportedEpsg(u16),

    /// A PROJ.4 definition could not be parsed.
    #[error("invalid projection definition '{definition}': {reason}")]
    InvalidDefinition { definition: String, reason: String },

    /// Transforming a single coordinate failed.
    #[error("failed to transform ({x}, {y}) from {source_crs}: {reason}")]
    TransformFailed {
        source_crs: String,
        x: f64,
        y: f64,
        reason: String,
    },

    /// Transforming one coordinate of a batch failed.
    #[error("failed to transform point {index} of batch: {inner}")]
    BatchPointFailed {
        index: usize,
        inner: Box<ProjectionError>,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
