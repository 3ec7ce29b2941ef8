//! Error types for figure rendering.

use chla_common::GridError;
use thiserror::Error;

use crate::colormap::ColormapError;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid colormap: {0}")]
    Colormap(#[from] ColormapError),

    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    /// Figure size, DPI or colour limits that cannot produce an image
    #[error("Invalid figure configuration: {0}")]
    InvalidConfig(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
