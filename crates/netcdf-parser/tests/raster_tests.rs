//! Tests for reading raster files written with the netcdf crate.

use chrono::{Datelike, TimeZone, Utc};
use netcdf_parser::{NetCdfError, RasterDataset, VariableNames};
use tempfile::TempDir;
use test_utils::{assert_approx_eq, create_test_grid, regular_axis, require_test_file, NcFixture};

fn write(fixture: &NcFixture) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.nc");
    fixture.write(&path).unwrap();
    (dir, path)
}

fn open(path: &std::path::Path) -> Result<RasterDataset, NetCdfError> {
    RasterDataset::open(path, &VariableNames::default())
}

// ============================================================================
// Shape and coordinates
// ============================================================================

#[test]
fn test_default_fixture_loads() {
    let fixture = NcFixture::default();
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    assert_eq!(raster.variable, "chlor_a");
    assert_eq!(raster.grid.shape(), (fixture.lat.len(), fixture.lon.len()));
    assert_eq!(raster.lat, fixture.lat);
    assert_eq!(raster.lon, fixture.lon);
    assert_eq!(raster.units, "mg m^-3");
    assert_eq!(raster.source, path);
}

#[test]
fn test_time_dimension_is_squeezed() {
    let with_time = NcFixture::default();
    let without_time = NcFixture {
        with_time_dim: false,
        ..NcFixture::default()
    };
    let (_a, path_a) = write(&with_time);
    let (_b, path_b) = write(&without_time);

    let a = open(&path_a).unwrap();
    let b = open(&path_b).unwrap();
    assert_eq!(a.grid.shape(), b.grid.shape());
    assert_eq!(a.grid.values().len(), b.grid.values().len());
}

#[test]
fn test_values_are_row_major_lat_lon() {
    let lat = regular_axis(35.0, -1.0, 3);
    let lon = regular_axis(139.0, 1.0, 4);
    let fixture = NcFixture {
        values: create_test_grid(lon.len(), lat.len()),
        lat,
        lon,
        fill_value: None,
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    // value = col * 1000 + row
    assert_eq!(raster.grid.get(0, 3), Some(3000.0));
    assert_eq!(raster.grid.get(2, 1), Some(1002.0));
}

// ============================================================================
// Masking and packing
// ============================================================================

#[test]
fn test_fill_values_are_masked() {
    let mut fixture = NcFixture::default();
    fixture.values[0] = -32767.0;
    fixture.values[5] = -32767.0;
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    assert!(raster.grid.is_masked(0, 0));
    assert!(raster.grid.is_masked(0, 5));
    assert!(!raster.grid.is_masked(0, 6));
}

#[test]
fn test_nan_values_are_masked() {
    let mut fixture = NcFixture {
        fill_value: None,
        ..NcFixture::default()
    };
    fixture.values[3] = f32::NAN;
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    assert!(raster.grid.is_masked(0, 3));
    assert_eq!(raster.grid.valid_count(), fixture.values.len() - 1);
}

#[test]
fn test_default_fill_masked_without_attribute() {
    // No _FillValue attribute: cells holding NC_FILL_FLOAT are still missing
    let mut fixture = NcFixture {
        fill_value: None,
        ..NcFixture::default()
    };
    fixture.values[7] = 9.969_209_968_386_869e36_f32;
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    assert!(raster.grid.is_masked(0, 7));
    assert!(!raster.grid.is_masked(0, 8));
    assert_eq!(raster.grid.valid_count(), fixture.values.len() - 1);
}

#[test]
fn test_zero_concentration_is_not_masked_by_loader() {
    let fixture = NcFixture::default();
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    assert_eq!(raster.grid.get(0, 0), Some(0.0));
}

#[test]
fn test_scale_and_offset_applied() {
    let fixture = NcFixture {
        values: vec![10.0; 21 * 31],
        scale_factor: Some(0.5),
        add_offset: Some(1.0),
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    let v = raster.grid.get(4, 4).unwrap();
    assert_approx_eq!(v, 6.0, 1e-6);
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_time_decoded() {
    let fixture = NcFixture {
        time_values: vec![1.5],
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    let t = raster.first_time().unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2020, 8, 13, 12, 0, 0).unwrap());
    assert_eq!(t.month(), 8);
}

#[test]
fn test_quantity_label() {
    let (_dir, path) = write(&NcFixture::default());
    let raster = open(&path).unwrap();
    assert_eq!(raster.quantity_label(), "Chlorophyll Concentration [mg m⁻³]");
}

#[test]
fn test_bbox_matches_coordinates() {
    let (_dir, path) = write(&NcFixture::default());
    let raster = open(&path).unwrap();
    let bbox = raster.bbox().unwrap();
    assert_approx_eq!(bbox.min_x, 138.0, 1e-9);
    assert_approx_eq!(bbox.max_x, 141.0, 1e-9);
    assert_approx_eq!(bbox.min_y, 34.0, 1e-9);
    assert_approx_eq!(bbox.max_y, 36.0, 1e-9);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_variable() {
    let fixture = NcFixture {
        var_name: "sst".to_string(),
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let err = open(&path).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(ref m) if m.contains("chlor_a")));
}

#[test]
fn test_custom_variable_name() {
    let fixture = NcFixture {
        var_name: "chl_ocx".to_string(),
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let names = VariableNames {
        data: "chl_ocx".to_string(),
        ..VariableNames::default()
    };
    let raster = RasterDataset::open(&path, &names).unwrap();
    assert_eq!(raster.variable, "chl_ocx");
}

#[test]
fn test_missing_calendar() {
    let fixture = NcFixture {
        calendar: None,
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let err = open(&path).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(ref m) if m.contains("calendar")));
}

#[test]
fn test_noleap_calendar_decoded() {
    let fixture = NcFixture {
        time_values: vec![59.0],
        time_units: "days since 2020-01-01".to_string(),
        calendar: Some("noleap".to_string()),
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let raster = open(&path).unwrap();
    let t = raster.first_time().unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_unsupported_calendar() {
    let fixture = NcFixture {
        calendar: Some("lunar".to_string()),
        ..NcFixture::default()
    };
    let (_dir, path) = write(&fixture);

    let err = open(&path).unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidTime(_)));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = open(&dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, NetCdfError::IoError(_)));
}

#[test]
fn test_not_netcdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.nc");
    std::fs::write(&path, b"this is not a netcdf file").unwrap();

    let err = open(&path).unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
}

#[test]
fn test_shape_mismatch_rejected() {
    // Coordinates say 21 x 31 but the variable is written transposed
    let fixture = NcFixture::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transposed.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("time", 1).unwrap();
        file.add_dimension("lat", fixture.lat.len()).unwrap();
        file.add_dimension("lon", fixture.lon.len()).unwrap();
        let mut t = file.add_variable::<f64>("time", &["time"]).unwrap();
        t.put_attribute("units", "days since 2020-01-01").unwrap();
        t.put_attribute("calendar", "standard").unwrap();
        t.put_values(&[0.0f64], ..).unwrap();
        let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat.put_values(&fixture.lat, ..).unwrap();
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon.put_values(&fixture.lon, ..).unwrap();
        let mut var = file.add_variable::<f32>("chlor_a", &["lon", "lat"]).unwrap();
        var.put_attribute("units", "mg m^-3").unwrap();
        var.put_values(&fixture.values, ..).unwrap();
    }

    let err = open(&path).unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
}

// ============================================================================
// Real granule (skipped when absent)
// ============================================================================

#[test]
fn test_modis_l3_granule() {
    let path = require_test_file!("chla_20200812.nc");
    let raster = open(&path).unwrap();

    let (rows, cols) = raster.grid.shape();
    assert_eq!((rows, cols), (raster.lat.len(), raster.lon.len()));
    assert!(raster.grid.valid_count() > 0);
    assert!(raster.quantity_label().ends_with(']'));
}
