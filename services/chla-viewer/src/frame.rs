//! One file through the pipeline: load, crop, log10, render.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use netcdf_parser::RasterDataset;
use renderer::{crop_raster, log10_masked, render_figure, CroppedRaster, Figure, TextPainter};
use tracing::{debug, info};

use crate::config::ViewerConfig;

/// A figure ready for an output sink.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub source: PathBuf,
    pub figure: Figure,
    pub time: Option<DateTime<Utc>>,
    /// (rows, cols) after cropping
    pub cropped_shape: (usize, usize),
    /// Mean of the valid cropped values, before log10
    pub mean: Option<f64>,
    /// Range of the valid log10 values
    pub log_range: Option<(f32, f32)>,
}

impl RenderedFrame {
    /// Output file stem, taken from the source file name.
    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "figure".to_string())
    }
}

#[derive(Debug, Clone)]
pub enum FrameOutcome {
    Rendered(RenderedFrame),
    /// The crop window held no grid points
    NoData,
}

pub fn render_frame(path: &Path, config: &ViewerConfig, text: &TextPainter) -> Result<FrameOutcome> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(file = %name, "Processing file");

    let raster = RasterDataset::open(path, &config.variable_names())
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let (rows, cols) = raster.grid.shape();
    let extent = raster.bbox();
    info!(rows, cols, extent = ?extent, "Shape before cropping");

    let window = config.crop_window();
    let cropped = if extent.is_some_and(|e| e.intersects(&window)) {
        crop_raster(&raster.grid, &raster.lat, &raster.lon, &window)?
    } else {
        None
    };
    let Some(cropped) = cropped.map(CroppedRaster::north_up) else {
        info!(file = %name, "No data within specified crop bounds.");
        return Ok(FrameOutcome::NoData);
    };

    let cropped_shape = cropped.grid.shape();
    let mean = cropped.grid.mean();
    info!(
        rows = cropped_shape.0,
        cols = cropped_shape.1,
        mean = ?mean,
        "Cropped data"
    );

    let log = log10_masked(&cropped.grid);
    let log_range = log.min_max();
    match log_range {
        Some((min, max)) => info!(min, max, "log10 data range"),
        None => info!("log10 data has no valid values"),
    }

    let time = raster.first_time();
    let title = if config.figure.show_title {
        time.map(|t| t.format(&config.figure.title_format).to_string())
    } else {
        None
    };
    let caption = config
        .figure
        .show_colorbar_label
        .then(|| raster.quantity_label());

    let cmap = config.colormap()?;
    let figure_config = config.figure_config(title, caption)?;
    let figure = render_figure(&log, cropped.extent(), &cmap, &figure_config, text)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    debug!(
        width = figure.width(),
        height = figure.height(),
        dpi = figure.dpi,
        "Rendered figure"
    );

    Ok(FrameOutcome::Rendered(RenderedFrame {
        source: path.to_path_buf(),
        figure,
        time,
        cropped_shape,
        mean,
        log_range,
    }))
}
