//! Terminal progress bar driven by the row scan.

use indicatif::{ProgressBar, ProgressStyle};
use raster_h3::{ProgressEvent, ProgressObserver};

/// Renders progress events as an indicatif bar over raster rows.
#[derive(Clone)]
pub struct RowProgressBar {
    bar: ProgressBar,
}

impl RowProgressBar {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }

    pub fn finish(&self, msg: &'static str) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
        self.bar.finish_with_message(msg);
    }

    pub fn abandon(&self, msg: &'static str) {
        self.bar.abandon_with_message(msg);
    }
}

impl ProgressObserver for RowProgressBar {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.bar.set_length(event.total_rows as u64);
        self.bar.set_position(event.row as u64);
        self.bar.set_message(format!("{}%", event.percent()));
    }
}
