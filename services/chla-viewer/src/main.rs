//! Chlorophyll map viewer.
//!
//! Renders the first few NetCDF chlorophyll rasters of a directory as
//! log10 maps of a coastal window, shown one window at a time or saved as
//! 300 DPI PNG files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chla_common::BoundingBox;
use chla_viewer::{run_batch, Overrides, ViewerConfig};
use renderer::TextPainter;

#[derive(Parser, Debug)]
#[command(name = "chla-viewer")]
#[command(about = "Render chlorophyll-a NetCDF rasters as coastal log10 maps")]
struct Args {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, env = "CHLA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the .nc files
    #[arg(short, long, env = "CHLA_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Number of files to render
    #[arg(short = 'n', long, env = "CHLA_MAX_FILES")]
    max_files: Option<usize>,

    /// Data variable name
    #[arg(long, env = "CHLA_VARIABLE")]
    variable: Option<String>,

    /// Crop window as min_lon,min_lat,max_lon,max_lat
    #[arg(long, env = "CHLA_CROP", value_parser = BoundingBox::from_csv)]
    crop: Option<BoundingBox>,

    /// Save figures to this directory instead of displaying them
    #[arg(short, long, env = "CHLA_SAVE_DIR")]
    save: Option<PathBuf>,

    /// Resolution of the active output mode
    #[arg(long, env = "CHLA_DPI")]
    dpi: Option<f32>,

    /// External image viewer for display mode instead of the built-in window
    #[arg(long, env = "CHLA_VIEWER")]
    viewer: Option<String>,

    /// TrueType font for axis and colorbar text
    #[arg(long, env = "CHLA_FONT")]
    font: Option<PathBuf>,

    /// Continue with the remaining files after a failure
    #[arg(long, env = "CHLA_KEEP_GOING")]
    keep_going: bool,

    /// Log level
    #[arg(long, env = "CHLA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long, env = "CHLA_LOG_FORMAT")]
    log_format: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            input_dir: self.input_dir.clone(),
            max_files: self.max_files,
            variable: self.variable.clone(),
            crop: self.crop,
            save_dir: self.save.clone(),
            dpi: self.dpi,
            viewer: self.viewer.clone(),
            font: self.font.clone(),
            keep_going: self.keep_going,
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply(&args.overrides());
    config.validate()?;

    init_tracing(&config.logging.level, &config.logging.format)?;

    info!("Starting chlorophyll viewer");
    info!(
        crop = ?config.crop,
        mode = ?config.output.mode,
        "Loaded configuration"
    );

    let text = TextPainter::load(config.figure.font_path.as_deref());
    let summary = run_batch(&config, &text)?;

    if !summary.failed.is_empty() {
        anyhow::bail!(
            "{} of {} files failed: {:?}",
            summary.failed.len(),
            summary.processed(),
            summary.failed
        );
    }

    Ok(())
}

fn init_tracing(log_level: &str, format: &str) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_lowercase()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if format == "json" {
        let subscriber = builder.with_thread_ids(true).json().finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.pretty().finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
