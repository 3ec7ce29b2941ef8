//! NetCDF reader for gridded ocean-colour products.
//!
//! Reads a single geophysical variable (chlorophyll-a by default) together
//! with its `lat`/`lon` coordinate vectors and CF `time` coordinate through
//! the native netcdf library. CF packing (`scale_factor`, `add_offset`) and
//! validity attributes (`_FillValue`, `missing_value`, `valid_min`,
//! `valid_max`, `valid_range`) are applied while reading, so callers get a
//! [`MaskedGrid`](chla_common::MaskedGrid) of physical values.
//!
//! # Example
//!
//! ```ignore
//! use netcdf_parser::{RasterDataset, VariableNames};
//!
//! let raster = RasterDataset::open("A20200812.L3m_DAY_CHL.nc", &VariableNames::default())?;
//! println!("{} {:?}", raster.quantity_label(), raster.grid.shape());
//! ```

pub mod error;
pub mod native;
pub mod raster;

pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use raster::{superscript_exponents, RasterDataset, VariableNames};
