//! Geographic cropping of lat/lon rasters.

use chla_common::{BoundingBox, GridError, MaskedGrid};

/// Indices `i` where `min <= coords[i] <= max`, in ascending order.
///
/// NaN coordinates never match.
pub fn crop_indices(coords: &[f64], min: f64, max: f64) -> Vec<usize> {
    coords
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c >= min && c <= max)
        .map(|(i, _)| i)
        .collect()
}

/// A raster cut down to a crop window.
#[derive(Debug, Clone)]
pub struct CroppedRaster {
    pub grid: MaskedGrid,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl CroppedRaster {
    /// Extent as `[lon_min, lon_max, lat_min, lat_max]`.
    pub fn extent(&self) -> [f64; 4] {
        let (lon_min, lon_max) = min_max(&self.lon);
        let (lat_min, lat_max) = min_max(&self.lat);
        [lon_min, lon_max, lat_min, lat_max]
    }

    /// Whether the first row is the northernmost.
    pub fn is_north_up(&self) -> bool {
        match (self.lat.first(), self.lat.last()) {
            (Some(first), Some(last)) => first >= last,
            _ => true,
        }
    }

    /// Reorder rows so row 0 is the northernmost.
    pub fn north_up(self) -> Self {
        if self.is_north_up() {
            return self;
        }
        let mut lat = self.lat;
        lat.reverse();
        Self {
            grid: self.grid.flip_rows(),
            lat,
            lon: self.lon,
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Crop `grid` (rows = `lat`, columns = `lon`) to `window`.
///
/// Returns `Ok(None)` when no latitude or no longitude falls inside the window.
pub fn crop_raster(
    grid: &MaskedGrid,
    lat: &[f64],
    lon: &[f64],
    window: &BoundingBox,
) -> Result<Option<CroppedRaster>, GridError> {
    let rows = crop_indices(lat, window.min_y, window.max_y);
    let cols = crop_indices(lon, window.min_x, window.max_x);
    if rows.is_empty() || cols.is_empty() {
        return Ok(None);
    }

    let sub = grid.select(&rows, &cols)?;
    Ok(Some(CroppedRaster {
        grid: sub,
        lat: rows.iter().map(|&i| lat[i]).collect(),
        lon: cols.iter().map(|&i| lon[i]).collect(),
    }))
}
