//! Cell aggregator: scans a raster and buckets pixel values by H3 cell.

use std::collections::hash_map::{self, HashMap};

use h3o::{CellIndex, LatLng, Resolution};
use tracing::{debug, instrument};

use crate::cancel::CancellationFlag;
use crate::config::DEFAULT_PROGRESS_INTERVAL_ROWS;
use crate::error::{ConversionError, Result};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::reproject::PixelReprojector;
use crate::source::RasterSource;

/// Pixel values collected per H3 cell.
///
/// Owned by a single run; entries are created on the first contribution, so
/// every stored list is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAccumulator {
    cells: HashMap<CellIndex, Vec<f64>>,
}

impl CellAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to `cell`'s contributions.
    #[inline]
    pub fn push(&mut self, cell: CellIndex, value: f64) {
        self.cells.entry(cell).or_default().push(value);
    }

    /// Number of distinct cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Contributions recorded for `cell`.
    pub fn values(&self, cell: CellIndex) -> Option<&[f64]> {
        self.cells.get(&cell).map(Vec::as_slice)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, CellIndex, Vec<f64>> {
        self.cells.iter()
    }
}

impl IntoIterator for CellAccumulator {
    type Item = (CellIndex, Vec<f64>);
    type IntoIter = hash_map::IntoIter<CellIndex, Vec<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Result of a full scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub accumulator: CellAccumulator,
    /// Pixels that contributed to a cell.
    pub pixels_used: u64,
    /// Pixels skipped as no-data or NaN.
    pub pixels_skipped: u64,
}

/// How a scan ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationOutcome {
    Completed(Aggregation),
    /// Cancellation was observed before `rows_scanned` of `total_rows`.
    /// Partial contributions are dropped.
    Cancelled { rows_scanned: usize, total_rows: usize },
}

/// Scans a raster in row-major order and assigns each valid pixel to the H3
/// cell containing its center.
#[derive(Debug, Clone, Copy)]
pub struct CellAggregator {
    resolution: Resolution,
    progress_interval_rows: usize,
}

impl CellAggregator {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            progress_interval_rows: DEFAULT_PROGRESS_INTERVAL_ROWS,
        }
    }

    /// Emit a progress event every `rows` rows (clamped to at least 1).
    pub fn with_progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval_rows = rows.max(1);
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Scan `source`.
    ///
    /// `cancel` is polled before each row and once more after the last one;
    /// `progress` is notified before each row whose index is a multiple of the
    /// progress interval.
    ///
    /// # Errors
    /// Fails if the source has no usable CRS, returns a row of the wrong
    /// length, or a pixel center cannot be mapped to a valid geographic
    /// coordinate.
    #[instrument(skip_all, fields(resolution = %self.resolution, width = source.width(), height = source.height()))]
    pub fn run<S: RasterSource + ?Sized>(
        &self,
        source: &S,
        cancel: &CancellationFlag,
        progress: &mut dyn ProgressObserver,
    ) -> Result<AggregationOutcome> {
        let reprojector = PixelReprojector::for_source(source)?;
        let (width, height) = (source.width(), source.height());

        let mut accumulator = CellAccumulator::new();
        let mut pixels_used = 0u64;
        let mut pixels_skipped = 0u64;

        let mut cols: Vec<usize> = Vec::with_capacity(width);
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(width);

        for row in 0..height {
            if cancel.is_cancelled() {
                debug!(row, "Cancellation observed");
                return Ok(AggregationOutcome::Cancelled {
                    rows_scanned: row,
                    total_rows: height,
                });
            }

            if row % self.progress_interval_rows == 0 {
                progress.on_progress(&ProgressEvent::new(row, height));
            }

            let values = source.row(row);
            if values.len() != width {
                return Err(ConversionError::source_error(format!(
                    "row {} has {} values, expected {}",
                    row,
                    values.len(),
                    width
                )));
            }
            cols.clear();
            cols.extend((0..width).filter(|&col| !source.is_nodata(values[col])));
            pixels_skipped += (width - cols.len()) as u64;
            if cols.is_empty() {
                continue;
            }

            reprojector.project_columns(row, &cols, &mut points)?;

            for (&col, &(lng, lat)) in cols.iter().zip(points.iter()) {
                let cell = LatLng::new(lat, lng)
                    .map_err(|e| ConversionError::Reprojection {
                        row,
                        col,
                        message: e.to_string(),
                    })?
                    .to_cell(self.resolution);
                accumulator.push(cell, values[col]);
            }
            pixels_used += cols.len() as u64;
        }

        // A request that arrived during the final row still discards the run.
        if cancel.is_cancelled() {
            return Ok(AggregationOutcome::Cancelled {
                rows_scanned: height,
                total_rows: height,
            });
        }

        debug!(
            cells = accumulator.len(),
            pixels_used, pixels_skipped, "Aggregation complete"
        );

        Ok(AggregationOutcome::Completed(Aggregation {
            accumulator,
            pixels_used,
            pixels_skipped,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::source::RasterBand;
    use projection::GeoTransform;
    use raster_common::Crs;

    fn small_band(data: Vec<f64>, width: usize, height: usize) -> RasterBand {
        // 1e-5 degree pixels: a whole test raster falls in one res-5 cell
        RasterBand::new(
            data,
            width,
            height,
            GeoTransform::from_origin(11.5, 48.1, 1e-5, 1e-5),
            Some(Crs::wgs84()),
        )
        .unwrap()
    }

    #[test]
    fn test_accumulator_lazy_entries() {
        let cell = LatLng::new(0.0, 0.0).unwrap().to_cell(Resolution::Three);
        let mut acc = CellAccumulator::new();
        assert!(acc.values(cell).is_none());

        acc.push(cell, 1.0);
        acc.push(cell, 3.0);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.values(cell), Some(&[1.0, 3.0][..]));
    }

    #[test]
    fn test_skips_nodata_and_nan() {
        let band = small_band(vec![1.0, -9999.0, f64::NAN, 5.0], 2, 2).with_nodata(Some(-9999.0));
        let outcome = CellAggregator::new(Resolution::Five)
            .run(&band, &CancellationFlag::new(), &mut NoProgress)
            .unwrap();

        let AggregationOutcome::Completed(agg) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(agg.pixels_used, 2);
        assert_eq!(agg.pixels_skipped, 2);
        assert_eq!(agg.accumulator.len(), 1);
        let (_, values) = agg.accumulator.iter().next().unwrap();
        assert_eq!(values, &vec![1.0, 5.0]);
    }

    #[test]
    fn test_cancel_before_first_row() {
        let band = small_band(vec![1.0; 4], 2, 2);
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let outcome = CellAggregator::new(Resolution::Five)
            .run(&band, &cancel, &mut NoProgress)
            .unwrap();
        assert_eq!(
            outcome,
            AggregationOutcome::Cancelled {
                rows_scanned: 0,
                total_rows: 2
            }
        );
    }

    #[test]
    fn test_cancel_from_progress_callback_stops_at_next_row() {
        let band = small_band(vec![1.0; 3 * 25], 3, 25);
        let cancel = CancellationFlag::new();
        let handle = cancel.clone();
        let mut observer = |e: &ProgressEvent| {
            if e.row == 10 {
                handle.cancel();
            }
        };

        let outcome = CellAggregator::new(Resolution::Five)
            .run(&band, &cancel, &mut observer)
            .unwrap();
        // Row 10 is still scanned; the flag is seen before row 11.
        assert_eq!(
            outcome,
            AggregationOutcome::Cancelled {
                rows_scanned: 11,
                total_rows: 25
            }
        );
    }

    #[test]
    fn test_progress_cadence() {
        let band = small_band(vec![0.0; 25], 1, 25);
        let mut rows = Vec::new();
        let mut observer = |e: &ProgressEvent| rows.push(e.row);

        CellAggregator::new(Resolution::Five)
            .run(&band, &CancellationFlag::new(), &mut observer)
            .unwrap();
        assert_eq!(rows, vec![0, 10, 20]);
    }

    #[test]
    fn test_missing_crs_fails() {
        let band = RasterBand::new(
            vec![1.0],
            1,
            1,
            GeoTransform::from_origin(0.0, 0.0, 1.0, 1.0),
            None,
        )
        .unwrap();
        let result = CellAggregator::new(Resolution::Five).run(&band, &CancellationFlag::new(), &mut NoProgress);
        assert!(matches!(result, Err(ConversionError::MissingCrs)));
    }

    #[test]
    fn test_invalid_coordinate_is_reprojection_error() {
        let band = RasterBand::new(
            vec![1.0],
            1,
            1,
            GeoTransform::from_origin(f64::INFINITY, 0.0, 1.0, 1.0),
            Some(Crs::wgs84()),
        )
        .unwrap();
        let result = CellAggregator::new(Resolution::Five).run(&band, &CancellationFlag::new(), &mut NoProgress);
        assert!(matches!(
            result,
            Err(ConversionError::Reprojection { row: 0, col: 0, .. })
        ));
    }

    /// Source whose rows are one value short of its declared width.
    struct ShortRows {
        transform: GeoTransform,
        crs: Crs,
        row: Vec<f64>,
    }

    impl RasterSource for ShortRows {
        fn width(&self) -> usize {
            self.row.len() + 1
        }

        fn height(&self) -> usize {
            3
        }

        fn geo_transform(&self) -> &GeoTransform {
            &self.transform
        }

        fn crs(&self) -> Option<&Crs> {
            Some(&self.crs)
        }

        fn nodata(&self) -> Option<f64> {
            None
        }

        fn row(&self, _row: usize) -> &[f64] {
            &self.row
        }
    }

    #[test]
    fn test_short_row_is_source_error() {
        let source = ShortRows {
            transform: GeoTransform::from_origin(11.5, 48.1, 1e-5, 1e-5),
            crs: Crs::wgs84(),
            row: vec![1.0, 2.0],
        };
        let result = CellAggregator::new(Resolution::Five).run(&source, &CancellationFlag::new(), &mut NoProgress);
        match result {
            Err(ConversionError::Source(msg)) => assert!(msg.contains("row 0 has 2 values, expected 3")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
