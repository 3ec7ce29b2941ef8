//! Common test fixtures for chlorophyll viewer tests.
//!
//! Besides constant crop windows this module can write a small, valid
//! NetCDF-4 file laid out like a level-3 mapped ocean-colour product.

use std::path::Path;

use crate::generators::{create_chlorophyll_grid, regular_axis};

/// Crop windows as (lat_min, lat_max, lon_min, lon_max).
pub mod window {
    /// Small Sagami Bay, the default crop window
    pub const SAGAMI_BAY: (f64, f64, f64, f64) = (34.5, 35.4, 138.8, 139.9);

    /// Wider Sagami Bay / Izu region
    pub const IZU: (f64, f64, f64, f64) = (34.3, 35.7, 138.3, 140.23);

    /// Entirely south of the fixture grid
    pub const OUTSIDE: (f64, f64, f64, f64) = (-10.0, -5.0, 0.0, 5.0);
}

/// Description of a NetCDF fixture.
#[derive(Debug, Clone)]
pub struct NcFixture {
    pub var_name: String,
    pub units: String,
    pub long_name: String,
    /// Latitude axis, north first like most mapped products
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Row-major (lat, lon) values
    pub values: Vec<f32>,
    pub fill_value: Option<f32>,
    /// Write the variable as (time, lat, lon) with a singleton time dimension
    pub with_time_dim: bool,
    pub time_values: Vec<f64>,
    pub time_units: String,
    /// `None` leaves the calendar attribute off
    pub calendar: Option<String>,
    pub scale_factor: Option<f32>,
    pub add_offset: Option<f32>,
}

impl Default for NcFixture {
    fn default() -> Self {
        let lat = regular_axis(36.0, -0.1, 21);
        let lon = regular_axis(138.0, 0.1, 31);
        let values = create_chlorophyll_grid(lon.len(), lat.len());
        Self {
            var_name: "chlor_a".to_string(),
            units: "mg m^-3".to_string(),
            long_name: "Chlorophyll Concentration, OCI Algorithm".to_string(),
            lat,
            lon,
            values,
            fill_value: Some(-32767.0),
            with_time_dim: true,
            time_values: vec![0.0],
            time_units: "days since 2020-08-12 00:00:00".to_string(),
            calendar: Some("standard".to_string()),
            scale_factor: None,
            add_offset: None,
        }
    }
}

impl NcFixture {
    /// Write this fixture as a NetCDF file at `path`.
    pub fn write(&self, path: &Path) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_attribute("title", "chla-maps test fixture")?;

        file.add_dimension("time", self.time_values.len())?;
        file.add_dimension("lat", self.lat.len())?;
        file.add_dimension("lon", self.lon.len())?;

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("units", self.time_units.as_str())?;
            if let Some(calendar) = &self.calendar {
                time_var.put_attribute("calendar", calendar.as_str())?;
            }
            time_var.put_values(&self.time_values, ..)?;
        }

        {
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_values(&self.lat, ..)?;
        }

        {
            let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_values(&self.lon, ..)?;
        }

        {
            let dims: &[&str] = if self.with_time_dim {
                &["time", "lat", "lon"]
            } else {
                &["lat", "lon"]
            };
            let mut var = file.add_variable::<f32>(&self.var_name, dims)?;
            if let Some(fill) = self.fill_value {
                var.put_attribute("_FillValue", fill)?;
            }
            var.put_attribute("units", self.units.as_str())?;
            var.put_attribute("long_name", self.long_name.as_str())?;
            if let Some(scale) = self.scale_factor {
                var.put_attribute("scale_factor", scale)?;
            }
            if let Some(offset) = self.add_offset {
                var.put_attribute("add_offset", offset)?;
            }
            var.put_values(&self.values, ..)?;
        }

        Ok(())
    }
}

/// Write the default fixture to `dir/name` and return its path.
pub fn write_chlorophyll_fixture(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    NcFixture::default()
        .write(&path)
        .expect("Failed to write NetCDF fixture");
    path
}
