//! Configuration for a raster to H3 conversion run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConversionError, Result};
use crate::writer::OutputFormat;

/// Default H3 resolution (matches the interactive default of the converter).
pub const DEFAULT_RESOLUTION: u8 = 9;

/// Finest H3 resolution.
pub const MAX_RESOLUTION: u8 = 15;

/// Rows between progress events.
pub const DEFAULT_PROGRESS_INTERVAL_ROWS: usize = 10;

/// Well-known location of the append-only conversion log.
pub const DEFAULT_LOG_PATH: &str = "~/h3_conversion.log";

/// Name of the directory default outputs are placed in, next to the raster.
pub const DEFAULT_OUTPUT_DIR: &str = "H3 Output";

/// Configuration for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// H3 resolution level (0-15).
    pub resolution: u8,

    /// Emit polygon geometry (GeoJSON) instead of centroids (CSV).
    pub include_geometry: bool,

    /// Output file. When unset, derived from the raster path.
    pub output_path: Option<PathBuf>,

    /// Conversion log file. `~` is expanded to the home directory.
    pub log_path: String,

    /// Emit a progress event every N rows.
    pub progress_interval_rows: usize,

    /// 1-based raster band to convert.
    pub band: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            include_geometry: true,
            output_path: None,
            log_path: DEFAULT_LOG_PATH.to_string(),
            progress_interval_rows: DEFAULT_PROGRESS_INTERVAL_ROWS,
            band: 1,
        }
    }
}

impl ConversionConfig {
    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConversionError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides to this configuration.
    ///
    /// Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("H3_RESOLUTION") {
            if let Ok(res) = val.parse() {
                self.resolution = res;
            }
        }

        if let Ok(val) = std::env::var("H3_INCLUDE_GEOMETRY") {
            self.include_geometry = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("H3_OUTPUT_PATH") {
            if !val.is_empty() {
                self.output_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("H3_LOG_PATH") {
            if !val.is_empty() {
                self.log_path = val;
            }
        }

        if let Ok(val) = std::env::var("H3_PROGRESS_INTERVAL") {
            if let Ok(rows) = val.parse() {
                self.progress_interval_rows = rows;
            }
        }

        if let Ok(val) = std::env::var("H3_BAND") {
            if let Ok(band) = val.parse() {
                self.band = band;
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.resolution > MAX_RESOLUTION {
            return Err(ConversionError::InvalidResolution(self.resolution));
        }

        if self.progress_interval_rows == 0 {
            return Err(ConversionError::config("progress_interval_rows must be > 0"));
        }

        if self.band == 0 {
            return Err(ConversionError::config("band is 1-based and must be >= 1"));
        }

        if self.log_path.trim().is_empty() {
            return Err(ConversionError::config("log_path must not be empty"));
        }

        Ok(())
    }

    /// Output format of the run.
    ///
    /// A recognised `output_path` extension (`.geojson`, `.json`, `.csv`)
    /// decides; otherwise the geometry flag does.
    pub fn output_format(&self) -> OutputFormat {
        self.output_path
            .as_deref()
            .and_then(|path| OutputFormat::from_path(path))
            .unwrap_or_else(|| OutputFormat::for_geometry(self.include_geometry))
    }

    /// Align `include_geometry` with [`output_format`](Self::output_format),
    /// whichever layer set the output path.
    pub fn with_output_format_from_path(mut self) -> Self {
        let include_geometry = self.output_format() == OutputFormat::GeoJson;
        if include_geometry != self.include_geometry {
            debug!(
                output = ?self.output_path,
                include_geometry,
                "Output extension overrides the geometry flag"
            );
            self.include_geometry = include_geometry;
        }
        self
    }

    /// Resolve the output path for `raster_path`, deriving a default if unset.
    pub fn resolve_output_path(&self, raster_path: &Path) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => default_output_path(raster_path, self.resolution, self.include_geometry),
        }
    }

    /// Conversion log path with `~` expanded.
    pub fn expanded_log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_path).into_owned())
    }
}

/// Default output file for a raster:
/// `<raster dir>/H3 Output/h3_raster_output_<stem>_<resolution>.<geojson|csv>`.
pub fn default_output_path(raster_path: &Path, resolution: u8, include_geometry: bool) -> PathBuf {
    let dir = raster_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join(DEFAULT_OUTPUT_DIR);
    let stem = raster_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "raster".to_string());
    let ext = OutputFormat::for_geometry(include_geometry).extension();

    dir.join(format!("h3_raster_output_{}_{}.{}", stem, resolution, ext))
}
