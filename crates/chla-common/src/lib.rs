//! Common types shared by the chlorophyll viewer crates.

pub mod bbox;
pub mod grid;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use grid::{GridError, MaskedGrid};
pub use time::{decode_cf_times, Calendar, CfTimeUnits, TimeParseError};
