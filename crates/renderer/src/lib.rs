//! Map rendering for gridded ocean-colour data.
//!
//! The pipeline for one raster is:
//! - [`crop`]: cut the grid down to a lat/lon window
//! - [`logscale`]: mask non-positive cells and take log10
//! - [`figure`]: colour the result with a [`colormap::Colormap`] over a land
//!   mask and draw axes, ticks and a colorbar
//! - [`png`]: encode the figure

pub mod colormap;
pub mod crop;
pub mod error;
pub mod figure;
pub mod logscale;
pub mod png;
pub mod text;

pub use colormap::{Color, Colormap, ColormapError, Normalize, CHLOROPHYLL};
pub use crop::{crop_indices, crop_raster, CroppedRaster};
pub use error::{RenderError, RenderResult};
pub use figure::{
    colorbar_ticks, format_colorbar_tick, render_figure, ColorbarGeometry, Figure, FigureConfig,
};
pub use logscale::log10_masked;
pub use text::TextPainter;
