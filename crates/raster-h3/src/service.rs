//! End-to-end conversion: read, aggregate, materialize, write.

use std::path::Path;
use std::time::Instant;

use h3o::Resolution;
use raster_common::Crs;
use tracing::{info, instrument};

use crate::aggregator::{AggregationOutcome, CellAggregator};
use crate::cancel::CancellationFlag;
use crate::config::ConversionConfig;
use crate::conversion_log::ConversionLog;
use crate::error::{ConversionError, Result};
use crate::materializer::materialize;
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::source::{read_geotiff, RasterBand, RasterSource};
use crate::types::{ConversionOutcome, ConversionSummary, ResultSet};
use crate::writer::write_result_set;

/// In-memory result of [`H3Converter::convert`].
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Materialized cells. Empty when cancelled.
    pub results: ResultSet,
    /// True if the run observed a cancellation request.
    pub cancelled: bool,
    /// Rows fully scanned.
    pub rows_scanned: usize,
    pub pixels_used: u64,
    pub pixels_skipped: u64,
}

/// Raster to H3 converter.
#[derive(Debug, Clone)]
pub struct H3Converter {
    config: ConversionConfig,
    resolution: Resolution,
    crs_override: Option<Crs>,
}

impl H3Converter {
    /// Create a converter.
    ///
    /// A recognised output path extension overrides `include_geometry`.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn new(config: ConversionConfig) -> Result<Self> {
        let config = config.with_output_format_from_path();
        config.validate()?;
        let resolution = Resolution::try_from(config.resolution)
            .map_err(|_| ConversionError::InvalidResolution(config.resolution))?;

        Ok(Self {
            config,
            resolution,
            crs_override: None,
        })
    }

    /// Use `crs` instead of the CRS declared by input files.
    pub fn with_crs_override(mut self, crs: Crs) -> Self {
        self.crs_override = Some(crs);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Convert an in-memory raster into H3 records without writing anything.
    ///
    /// On cancellation the partial scan is discarded and an empty result set
    /// is returned with `cancelled` set.
    pub fn convert<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        cancel: &CancellationFlag,
        progress: &mut dyn ProgressObserver,
    ) -> Result<Conversion> {
        let aggregator =
            CellAggregator::new(self.resolution).with_progress_interval(self.config.progress_interval_rows);

        match aggregator.run(source, cancel, progress)? {
            AggregationOutcome::Completed(agg) => Ok(Conversion {
                results: materialize(agg.accumulator, self.resolution, self.config.include_geometry),
                cancelled: false,
                rows_scanned: source.height(),
                pixels_used: agg.pixels_used,
                pixels_skipped: agg.pixels_skipped,
            }),
            AggregationOutcome::Cancelled { rows_scanned, .. } => Ok(Conversion {
                results: ResultSet::empty(self.resolution, self.config.include_geometry),
                cancelled: true,
                rows_scanned,
                pixels_used: 0,
                pixels_skipped: 0,
            }),
        }
    }

    /// Read the GeoTIFF at `raster_path`, convert it and write the output file.
    ///
    /// Status messages go to `log`; progress events go to both `log` and
    /// `progress`. A cancelled run writes nothing.
    #[instrument(skip_all, fields(raster = %raster_path.display(), resolution = self.config.resolution))]
    pub fn convert_file(
        &self,
        raster_path: &Path,
        cancel: &CancellationFlag,
        log: &mut ConversionLog,
        progress: &mut dyn ProgressObserver,
    ) -> Result<ConversionOutcome> {
        let started = Instant::now();
        let output_path = self.config.resolve_output_path(raster_path);
        let format = self.config.output_format();

        log.message("Starting H3 raster conversion process...");
        log.message("Reading raster file...");
        let band = self.load(raster_path)?;

        log.message("Converting raster pixels into H3 hexagons...");
        let conversion = {
            let mut observers = FanOut {
                log: &mut *log,
                progress: &mut *progress,
            };
            self.convert(&band, cancel, &mut observers)?
        };

        if conversion.cancelled {
            log.message("Process cancelled by user.");
            return Ok(ConversionOutcome::Cancelled {
                rows_scanned: conversion.rows_scanned,
                total_rows: band.height(),
            });
        }

        log.message("Extraction complete. Saving file...");
        log.message("Writing output file to disk...");
        write_result_set(&conversion.results, &output_path, format)?;
        log.message("Output file saved.");

        log.message("=== Raster to H3 Extraction Summary ===");
        log.message(&format!("Raster file     : {}", raster_path.display()));
        log.message(&format!("H3 resolution   : {}", self.config.resolution));
        log.message(&format!("Total H3 cells  : {}", conversion.results.len()));

        let summary = ConversionSummary {
            source_path: raster_path.to_path_buf(),
            output_path,
            format,
            resolution: self.config.resolution,
            cell_count: conversion.results.len(),
            pixels_used: conversion.pixels_used,
            pixels_skipped: conversion.pixels_skipped,
            duration: started.elapsed(),
        };
        info!(
            cells = summary.cell_count,
            output = %summary.output_path.display(),
            elapsed_ms = summary.duration.as_millis() as u64,
            "Conversion complete"
        );
        Ok(ConversionOutcome::Completed(summary))
    }

    /// Read the configured band and apply the CRS override, if any.
    pub fn load(&self, raster_path: &Path) -> Result<RasterBand> {
        let band = read_geotiff(raster_path, self.config.band)?;
        Ok(match &self.crs_override {
            Some(crs) => band.with_crs(crs.clone()),
            None => band,
        })
    }
}

/// Forwards progress events to the conversion log and the caller.
struct FanOut<'a> {
    log: &'a mut ConversionLog,
    progress: &'a mut dyn ProgressObserver,
}

impl ProgressObserver for FanOut<'_> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.log.on_progress(event);
        self.progress.on_progress(event);
    }
}
