//! Batch chlorophyll map viewer.
//!
//! Selects the first few NetCDF files of a directory, crops each raster to a
//! lat/lon window, takes log10 and renders a map with a land mask and a
//! colorbar. Figures are shown in a window, handed to an external image viewer,
//! or saved as PNG.

pub mod batch;
pub mod config;
pub mod frame;
pub mod output;
pub mod window;

pub use batch::{run_batch, BatchSummary, InputSelection};
pub use config::{OutputKind, Overrides, ViewerConfig};
pub use frame::{render_frame, FrameOutcome, RenderedFrame};
pub use output::OutputMode;
pub use window::show_figure;
