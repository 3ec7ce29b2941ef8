//! Error types for NetCDF parsing operations.

use chla_common::{GridError, TimeParseError};
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time coordinate could not be decoded
    #[error("Invalid time coordinate: {0}")]
    InvalidTime(#[from] TimeParseError),

    /// Variable shape does not fit its coordinates
    #[error("Invalid grid: {0}")]
    InvalidGrid(#[from] GridError),
}
