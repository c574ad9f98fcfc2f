//! Raster to H3 conversion engine.
//!
//! Converts a georeferenced raster band into Uber H3 hexagon cells: every
//! valid pixel is assigned to the cell containing its center, and each cell
//! receives the mean of its pixels. Results are written as GeoJSON polygons
//! or as a CSV table of cell centroids.
//!
//! # Architecture
//!
//! ```text
//! GeoTIFF ──► read_geotiff ──► RasterBand (impl RasterSource)
//!                                   │
//!                                   ▼
//!                  CellAggregator::run (row-major scan)
//!                                   │
//!                                   ├─► poll CancellationFlag per row
//!                                   ├─► ProgressObserver every N rows
//!                                   ├─► skip no-data / NaN
//!                                   ├─► PixelReprojector (pixel center → WGS84)
//!                                   └─► LatLng::to_cell(resolution)
//!                                   │
//!                                   ▼
//!                            CellAccumulator
//!                                   │
//!                                   ▼
//!                     materialize (mean + geometry)
//!                                   │
//!                                   ▼
//!                 write_result_set (GeoJSON | CSV, atomic)
//! ```
//!
//! [`advisor`] recommends resolutions and estimates run time before a run;
//! it never influences the conversion itself.
//!
//! # Example
//!
//! ```ignore
//! use raster_h3::{CancellationFlag, ConversionConfig, ConversionLog, H3Converter, NoProgress};
//!
//! let converter = H3Converter::new(ConversionConfig { resolution: 8, ..Default::default() })?;
//! let mut log = ConversionLog::open(converter.config().expanded_log_path());
//! let outcome = converter.convert_file(
//!     Path::new("dem.tif"),
//!     &CancellationFlag::new(),
//!     &mut log,
//!     &mut NoProgress,
//! )?;
//! ```

pub mod advisor;
pub mod aggregator;
pub mod cancel;
pub mod config;
pub mod conversion_log;
pub mod error;
pub mod materializer;
pub mod progress;
pub mod reproject;
pub mod service;
pub mod source;
pub mod types;
pub mod writer;

// Re-export commonly used types at crate root
pub use advisor::{recommend, Recommendation, RasterReport};
pub use aggregator::{Aggregation, AggregationOutcome, CellAccumulator, CellAggregator};
pub use cancel::CancellationFlag;
pub use config::{default_output_path, ConversionConfig};
pub use conversion_log::ConversionLog;
pub use error::{ConversionError, Result};
pub use materializer::materialize;
pub use progress::{NoProgress, ProgressEvent, ProgressObserver};
pub use reproject::PixelReprojector;
pub use service::{Conversion, H3Converter};
pub use source::{read_geotiff, read_geotiff_from, RasterBand, RasterSource};
pub use types::{
    CellGeometry, ConversionOutcome, ConversionSummary, GeoPoint, ResultRecord, ResultSet,
};
pub use writer::{write_result_set, OutputFormat};

pub use h3o::{CellIndex, Resolution};
