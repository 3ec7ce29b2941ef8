//! Gridded ocean-colour raster reading.
//!
//! A raster file holds one geophysical variable on a regular lat/lon grid,
//! usually with a singleton `time` dimension in front:
//!
//! ```text
//! float chlor_a(time, lat, lon)
//!     chlor_a:_FillValue = -32767.f
//!     chlor_a:units = "mg m^-3"
//!     chlor_a:long_name = "Chlorophyll Concentration, OCI Algorithm"
//! double time(time)
//!     time:units = "days since 2020-08-12 00:00:00"
//!     time:calendar = "standard"
//! ```

use std::path::{Path, PathBuf};

use chla_common::{decode_cf_times, BoundingBox, MaskedGrid};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{
    get_f64_attr, get_f64_pair_attr, get_fill_value, get_string_attr, silence_hdf5_errors,
};

/// Names of the variables read from a raster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNames {
    pub data: String,
    pub lat: String,
    pub lon: String,
    pub time: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            data: "chlor_a".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            time: "time".to_string(),
        }
    }
}

/// One raster variable with its coordinates, fully read into memory.
#[derive(Debug, Clone)]
pub struct RasterDataset {
    /// File the raster was read from
    pub source: PathBuf,
    /// Variable name inside the file
    pub variable: String,
    /// Unpacked values, (lat, lon) row-major
    pub grid: MaskedGrid,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Decoded time steps (UTC)
    pub times: Vec<DateTime<Utc>>,
    pub units: String,
    pub long_name: Option<String>,
}

/// Packing and validity attributes of a CF variable.
#[derive(Debug, Clone, Copy, Default)]
struct Packing {
    fill_value: Option<f64>,
    missing_value: Option<f64>,
    valid_min: Option<f64>,
    valid_max: Option<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl Packing {
    fn read(var: &netcdf::Variable) -> Self {
        let range = get_f64_pair_attr(var, "valid_range");
        Self {
            fill_value: get_fill_value(var),
            missing_value: get_f64_attr(var, "missing_value"),
            valid_min: get_f64_attr(var, "valid_min").or(range.map(|r| r.0)),
            valid_max: get_f64_attr(var, "valid_max").or(range.map(|r| r.1)),
            scale_factor: get_f64_attr(var, "scale_factor").unwrap_or(1.0),
            add_offset: get_f64_attr(var, "add_offset").unwrap_or(0.0),
        }
    }

    /// Whether a packed value is invalid.
    fn is_invalid(&self, raw: f64) -> bool {
        raw.is_nan()
            || self.fill_value.is_some_and(|fill| same_packed(raw, fill))
            || self.missing_value.is_some_and(|miss| same_packed(raw, miss))
            || self.valid_min.is_some_and(|lo| raw < lo)
            || self.valid_max.is_some_and(|hi| raw > hi)
    }

    fn unpack(&self, raw: f64) -> f32 {
        (raw * self.scale_factor + self.add_offset) as f32
    }
}

// Attributes are often stored at a different precision than the data.
fn same_packed(a: f64, b: f64) -> bool {
    a == b || (a as f32) == (b as f32)
}

impl RasterDataset {
    /// Read variable `names.data` and its coordinates from `path`.
    ///
    /// The file handle is closed before returning.
    pub fn open(path: impl AsRef<Path>, names: &VariableNames) -> NetCdfResult<Self> {
        let path = path.as_ref();
        silence_hdf5_errors();

        // Surface a missing file as I/O rather than a format problem.
        std::fs::metadata(path)?;

        let file = netcdf::open(path).map_err(|e| {
            NetCdfError::InvalidFormat(format!("{}: {}", path.display(), e))
        })?;

        let var = file.variable(&names.data).ok_or_else(|| {
            NetCdfError::MissingData(format!("variable '{}'", names.data))
        })?;

        let lat = read_axis(&file, &names.lat)?;
        let lon = read_axis(&file, &names.lon)?;

        let dims: Vec<(String, usize)> = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();
        check_squeezed_shape(&names.data, &dims, lat.len(), lon.len())?;

        let units = get_string_attr(&var, "units").ok_or_else(|| {
            NetCdfError::MissingData(format!("attribute '{}:units'", names.data))
        })?;
        let long_name = get_string_attr(&var, "long_name");

        let raw: Vec<f64> = var
            .get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::InvalidFormat(format!("reading '{}': {}", names.data, e)))?;

        let packing = Packing::read(&var);
        let mut values = Vec::with_capacity(raw.len());
        let mut mask = Vec::with_capacity(raw.len());
        for &r in &raw {
            if packing.is_invalid(r) {
                values.push(f32::NAN);
                mask.push(true);
            } else {
                let v = packing.unpack(r);
                values.push(v);
                mask.push(!v.is_finite());
            }
        }
        let grid = MaskedGrid::new(lon.len(), lat.len(), values, mask)?;

        let times = read_times(&file, &names.time)?;

        debug!(
            file = %path.display(),
            variable = %names.data,
            rows = grid.height(),
            cols = grid.width(),
            masked = grid.len() - grid.valid_count(),
            "Loaded raster"
        );

        Ok(Self {
            source: path.to_path_buf(),
            variable: names.data.clone(),
            grid,
            lat,
            lon,
            times,
            units,
            long_name,
        })
    }

    /// Colorbar caption such as `Chlorophyll Concentration [mg m⁻³]`.
    pub fn quantity_label(&self) -> String {
        let name = self
            .long_name
            .as_deref()
            .and_then(|long| long.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.variable);
        format!("{} [{}]", name, superscript_exponents(&self.units))
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.times.first().copied()
    }

    /// Geographic extent of the full grid.
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(&self.lon, &self.lat)
    }
}

fn read_axis(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("coordinate '{}'", name)))?;
    if var.dimensions().len() != 1 {
        return Err(NetCdfError::InvalidFormat(format!(
            "coordinate '{}' has {} dimensions, expected 1",
            name,
            var.dimensions().len()
        )));
    }
    var.get_values::<f64, _>(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("reading '{}': {}", name, e)))
}

fn read_times(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("coordinate '{}'", name)))?;
    let units = get_string_attr(&var, "units")
        .ok_or_else(|| NetCdfError::MissingData(format!("attribute '{}:units'", name)))?;
    let calendar = get_string_attr(&var, "calendar")
        .ok_or_else(|| NetCdfError::MissingData(format!("attribute '{}:calendar'", name)))?;
    let values = var
        .get_values::<f64, _>(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("reading '{}': {}", name, e)))?;
    Ok(decode_cf_times(&values, &units, &calendar)?)
}

/// Drop length-1 dimensions and check what remains against the coordinates.
///
/// A singleton latitude or longitude axis is squeezed away too, so the check
/// compares the element count when fewer than two dimensions remain.
fn check_squeezed_shape(
    variable: &str,
    dims: &[(String, usize)],
    lat_len: usize,
    lon_len: usize,
) -> NetCdfResult<()> {
    let squeezed: Vec<usize> = dims.iter().map(|(_, len)| *len).filter(|&len| len != 1).collect();
    let describe = || {
        dims.iter()
            .map(|(name, len)| format!("{}={}", name, len))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let ok = match squeezed.as_slice() {
        [rows, cols] => (*rows, *cols) == (lat_len, lon_len),
        [n] => *n == lat_len * lon_len,
        [] => lat_len * lon_len == 1,
        _ => false,
    };
    if !ok {
        return Err(NetCdfError::InvalidFormat(format!(
            "variable '{}' ({}) does not squeeze to (lat={}, lon={})",
            variable,
            describe(),
            lat_len,
            lon_len
        )));
    }
    Ok(())
}

/// Render `^`-prefixed exponents as Unicode superscripts (`m^-3` -> `m⁻³`).
pub fn superscript_exponents(units: &str) -> String {
    let mut out = String::with_capacity(units.len());
    let mut chars = units.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        let mut exponent = String::new();
        if let Some(&sign) = chars.peek() {
            if sign == '-' || sign == '+' {
                exponent.push(sign);
                chars.next();
            }
        }
        while let Some(&d) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            exponent.push(d);
            chars.next();
        }
        if exponent.chars().any(|ch| ch.is_ascii_digit()) {
            out.extend(exponent.chars().map(superscript_char));
        } else {
            out.push('^');
            out.push_str(&exponent);
        }
    }
    out
}

fn superscript_char(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '-' => '⁻',
        '+' => '⁺',
        other => other,
    }
}
