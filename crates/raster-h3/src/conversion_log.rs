//! Append-only conversion log.
//!
//! Every status message is emitted through `tracing` and also appended to a
//! plain-text file as `[%Y-%m-%d %H:%M:%S] message`, so a run can be audited
//! after the fact without a log collector. File errors never abort a run.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::progress::{ProgressEvent, ProgressObserver};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamped status log for conversion runs.
#[derive(Debug)]
pub struct ConversionLog {
    path: Option<PathBuf>,
    file: Option<File>,
}

impl ConversionLog {
    /// Open (or create) the log file at `path` in append mode.
    ///
    /// If the parent directory cannot be created or the file cannot be
    /// opened, a warning is emitted and messages only go to `tracing`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let parent_ready = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        };

        let opened = parent_ready
            .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
        let file = match opened {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open conversion log");
                None
            }
        };

        Self {
            path: Some(path),
            file,
        }
    }

    /// A log that only emits `tracing` events.
    pub fn disabled() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a status message.
    pub fn message(&mut self, msg: &str) {
        info!("{}", msg);

        let Some(file) = self.file.as_mut() else {
            return;
        };
        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), msg);
        if let Err(e) = file.write_all(line.as_bytes()) {
            warn!(error = %e, "Failed to append to conversion log; disabling file output");
            self.file = None;
        }
    }
}

impl ProgressObserver for ConversionLog {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.message(&event.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("h3.log");

        let mut log = ConversionLog::open(&path);
        log.message("Reading raster file...");
        log.on_progress(&ProgressEvent::new(10, 40));
        drop(log);

        let mut log = ConversionLog::open(&path);
        log.message("Output file saved.");
        drop(log);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        // "[YYYY-MM-DD HH:MM:SS] " prefix
        for line in &lines {
            assert!(line.starts_with('['));
            assert_eq!(&line[20..22], "] ");
        }
        assert!(lines[0].ends_with("Reading raster file..."));
        assert!(lines[1].ends_with("Processing row 10/40"));
        assert!(lines[2].ends_with("Output file saved."));
    }

    #[test]
    fn test_unwritable_path_does_not_fail() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let mut log = ConversionLog::open(dir.path());
        log.message("still fine");
        assert_eq!(log.path(), Some(dir.path()));
        assert!(log.file.is_none());
    }

    #[test]
    fn test_uncreatable_parent_does_not_fail() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();
        let path = blocker.join("h3.log");

        let mut log = ConversionLog::open(&path);
        assert!(log.file.is_none());
        log.message("still fine");
        assert_eq!(log.path(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
    }

    #[test]
    fn test_disabled() {
        let mut log = ConversionLog::disabled();
        log.message("nothing written");
        assert!(log.path().is_none());
    }
}
