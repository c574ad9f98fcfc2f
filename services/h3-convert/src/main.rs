//! Raster to H3 converter.
//!
//! Aggregates the pixels of a GeoTIFF band into H3 hexagons and writes the
//! per-cell mean as GeoJSON polygons or CSV centroids.

mod progress;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use progress::RowProgressBar;
use raster_common::Crs;
use raster_h3::{
    CancellationFlag, ConversionConfig, ConversionLog, ConversionOutcome, H3Converter,
    OutputFormat, RasterReport,
};

#[derive(Parser, Debug)]
#[command(name = "h3-convert")]
#[command(about = "Convert a GeoTIFF raster band into H3 hexagons")]
struct Args {
    /// Input GeoTIFF
    input: PathBuf,

    /// H3 resolution (0-15)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=15))]
    resolution: Option<u8>,

    /// Write cell centroids as CSV instead of GeoJSON polygons
    #[arg(long)]
    no_geometry: bool,

    /// Output file (default: "<input dir>/H3 Output/h3_raster_output_<name>_<res>.<ext>")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "H3_CONFIG")]
    config: Option<PathBuf>,

    /// CRS to assume for the input, replacing any it declares (e.g. "EPSG:32633")
    #[arg(long)]
    crs: Option<String>,

    /// 1-based band to convert
    #[arg(short, long)]
    band: Option<usize>,

    /// Conversion log file
    #[arg(long)]
    log_file: Option<String>,

    /// Print raster metadata and a resolution recommendation, then exit
    #[arg(long)]
    inspect: bool,

    /// Print the conversion summary as JSON
    #[arg(long)]
    json: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    let config = build_config(&args)?;
    let mut converter = H3Converter::new(config)?;
    if let Some(crs) = &args.crs {
        let crs = Crs::parse(crs).with_context(|| format!("invalid --crs value '{}'", crs))?;
        converter = converter.with_crs_override(crs);
    }

    if args.inspect {
        inspect(&converter, &args.input)?;
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = CancellationFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling conversion");
            signal_flag.cancel();
        }
    });

    let log = ConversionLog::open(converter.config().expanded_log_path());
    let bar = RowProgressBar::new(!args.quiet);
    let input = args.input.clone();

    info!(
        input = %input.display(),
        resolution = converter.config().resolution,
        format = %converter.config().output_format(),
        "Starting conversion"
    );

    let worker_bar = bar.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut log = log;
        let mut observer = worker_bar;
        converter.convert_file(&input, &cancel, &mut log, &mut observer)
    })
    .await
    .context("conversion task panicked")?;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            bar.abandon("failed");
            return Err(e.into());
        }
    };

    match outcome {
        ConversionOutcome::Completed(summary) => {
            bar.finish("done");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Raster file     : {}", summary.source_path.display());
                println!("H3 resolution   : {}", summary.resolution);
                println!("Total H3 cells  : {}", summary.cell_count);
                println!("Pixels used     : {}", summary.pixels_used);
                println!("Pixels skipped  : {}", summary.pixels_skipped);
                println!("Output ({:<7}) : {}", summary.format, summary.output_path.display());
                println!("Elapsed         : {:.2?}", summary.duration);
            }
            Ok(ExitCode::SUCCESS)
        }
        ConversionOutcome::Cancelled {
            rows_scanned,
            total_rows,
        } => {
            bar.abandon("cancelled");
            eprintln!(
                "Conversion cancelled after {}/{} rows; no output written",
                rows_scanned, total_rows
            );
            Ok(ExitCode::from(130))
        }
    }
}

/// Layer configuration: YAML file (or defaults), then environment, then flags.
fn build_config(args: &Args) -> Result<ConversionConfig> {
    let config = match &args.config {
        Some(path) => ConversionConfig::from_yaml_file(path)?,
        None => ConversionConfig::default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(resolution) = args.resolution {
        config.resolution = resolution;
    }
    if let Some(band) = args.band {
        config.band = band;
    }
    if let Some(log_file) = &args.log_file {
        config.log_path = log_file.clone();
    }
    if args.no_geometry {
        config.include_geometry = false;
    }
    if let Some(output) = &args.output {
        config.output_path = Some(output.clone());
    }
    if let (true, Some(path)) = (args.no_geometry, &config.output_path) {
        if OutputFormat::from_path(path) == Some(OutputFormat::GeoJson) {
            bail!(
                "--no-geometry writes CSV but the output path '{}' is GeoJSON",
                path.display()
            );
        }
    }

    // The output extension picks the format, whichever layer set the path
    let config = config.with_output_format_from_path();
    config.validate()?;
    Ok(config)
}

/// Print the raster summary and resolution recommendation.
fn inspect(converter: &H3Converter, path: &Path) -> Result<()> {
    let band = converter.load(path)?;
    let file_size = std::fs::metadata(path).ok().map(|m| m.len());
    let report = RasterReport::new(&band, converter.config().resolution, file_size)?;
    println!("{}", report);
    Ok(())
}
