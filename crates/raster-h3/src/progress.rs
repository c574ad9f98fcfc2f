//! Progress reporting for the row scan.

/// A progress event emitted while scanning raster rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Row about to be scanned (0-based).
    pub row: usize,
    /// Total number of rows in the raster.
    pub total_rows: usize,
    /// Human-readable status line.
    pub message: String,
}

impl ProgressEvent {
    /// Create an event for `row` of `total_rows`.
    pub fn new(row: usize, total_rows: usize) -> Self {
        Self {
            row,
            total_rows,
            message: format!("Processing row {}/{}", row, total_rows),
        }
    }

    /// Completed fraction in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.row as f64 / self.total_rows as f64
    }

    /// Completed percentage, truncated to a whole number.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0) as u8
    }
}

/// Receives progress events. Called on the scanning thread between rows,
/// so implementations may flush logs or repaint before returning.
pub trait ProgressObserver {
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}
