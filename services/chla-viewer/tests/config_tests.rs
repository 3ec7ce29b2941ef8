//! Tests for viewer configuration loading.

use std::path::PathBuf;

use chla_common::BoundingBox;
use chla_viewer::config::{OutputKind, Overrides, ViewerConfig};
use renderer::Colormap;
use test_utils::window;

#[test]
fn test_defaults_match_sagami_bay_batch() {
    let config = ViewerConfig::default();
    assert_eq!(config.input.dir, PathBuf::from("./results/daily/Modis/chla"));
    assert_eq!(config.input.max_files, 5);
    assert_eq!(config.variables.data, "chlor_a");

    let (lat_min, lat_max, lon_min, lon_max) = window::SAGAMI_BAY;
    assert_eq!(config.crop.lat_min, lat_min);
    assert_eq!(config.crop.lat_max, lat_max);
    assert_eq!(config.crop.lon_min, lon_min);
    assert_eq!(config.crop.lon_max, lon_max);

    assert_eq!((config.colormap.vmin, config.colormap.vmax), (-2.0, 2.0));
    assert_eq!(config.colormap.colors[0], "#3500a8");
    assert_eq!(config.colormap.colors.len(), 9);
    assert_eq!(config.colormap().unwrap(), Colormap::chlorophyll());
    assert_eq!(config.output.mode, OutputKind::Display);
    assert_eq!(config.render_dpi(), 100.0);
}

#[test]
fn test_empty_document_gives_defaults() {
    let config = ViewerConfig::from_yaml("").unwrap();
    assert_eq!(config, ViewerConfig::default());
}

#[test]
fn test_partial_document_keeps_other_defaults() {
    let yaml = r#"
crop:
  lat_min: 34.3
  lat_max: 35.7
output:
  mode: save
  save_dir: ./out
"#;
    let config = ViewerConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.crop.lat_min, 34.3);
    assert_eq!(config.crop.lon_min, 138.8);
    assert_eq!(config.output.mode, OutputKind::Save);
    assert_eq!(config.output.save_dir, PathBuf::from("./out"));
    assert_eq!(config.render_dpi(), 300.0);
    assert_eq!(config.input.max_files, 5);
}

#[test]
fn test_env_substitution() {
    std::env::set_var("CHLA_CONFIG_TEST_INPUT_DIR", "/data/modis");
    let yaml = r#"
input:
  dir: ${CHLA_CONFIG_TEST_INPUT_DIR}
  max_files: ${CHLA_CONFIG_TEST_UNSET_MAX:-3}
"#;
    let config = ViewerConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.input.dir, PathBuf::from("/data/modis"));
    assert_eq!(config.input.max_files, 3);
}

#[test]
fn test_missing_env_var_is_an_error() {
    let yaml = "input:\n  dir: ${CHLA_CONFIG_TEST_NEVER_SET}\n";
    assert!(ViewerConfig::from_yaml(yaml).is_err());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewer.yaml");
    std::fs::write(&path, "colormap:\n  land_color: \"#c8b478\"\n").unwrap();

    let config = ViewerConfig::load(&path).unwrap();
    assert_eq!(config.colormap.land_color, "#c8b478");
    assert!(ViewerConfig::load(dir.path().join("missing.yaml")).is_err());
}

// ============================================================================
// Validation
// ============================================================================

fn validated(yaml: &str) -> anyhow::Result<ViewerConfig> {
    let config = ViewerConfig::from_yaml(yaml)?;
    config.validate()?;
    Ok(config)
}

#[test]
fn test_rejects_inverted_limits() {
    assert!(validated("colormap:\n  vmin: 2.0\n  vmax: -2.0\n").is_err());
}

#[test]
fn test_rejects_inverted_crop() {
    assert!(validated("crop:\n  lon_min: 140.0\n  lon_max: 139.0\n").is_err());
}

#[test]
fn test_rejects_bad_colours() {
    assert!(validated("colormap:\n  colors: [\"#000000\"]\n").is_err());
    assert!(validated("colormap:\n  land_color: grey\n").is_err());
}

#[test]
fn test_rejects_zero_files_and_bad_logging() {
    assert!(validated("input:\n  max_files: 0\n").is_err());
    assert!(validated("logging:\n  level: loud\n").is_err());
    assert!(validated("logging:\n  format: xml\n").is_err());
}

#[test]
fn test_parsing_does_not_validate() {
    let config = ViewerConfig::from_yaml("input:\n  max_files: 0\n").unwrap();
    assert_eq!(config.input.max_files, 0);
    assert!(config.validate().is_err());
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_save_override_switches_mode() {
    let mut config = ViewerConfig::default();
    config.apply(&Overrides {
        input_dir: Some(PathBuf::from("/tmp/in")),
        max_files: Some(2),
        save_dir: Some(PathBuf::from("/tmp/out")),
        keep_going: true,
        log_level: Some("DEBUG".to_string()),
        ..Overrides::default()
    });

    assert_eq!(config.input.dir, PathBuf::from("/tmp/in"));
    assert_eq!(config.input.max_files, 2);
    assert_eq!(config.output.mode, OutputKind::Save);
    assert_eq!(config.output.save_dir, PathBuf::from("/tmp/out"));
    assert!(config.output.keep_going);
    assert_eq!(config.logging.level, "debug");
    config.validate().unwrap();
}

#[test]
fn test_overrides_fix_file_values_before_validation() {
    // Upper-case level in the file, corrected by the command line
    let mut config = ViewerConfig::from_yaml("logging:\n  level: INFO\ninput:\n  max_files: 0\n").unwrap();
    assert!(config.validate().is_err());

    config.apply(&Overrides {
        max_files: Some(3),
        log_level: Some("INFO".to_string()),
        ..Overrides::default()
    });
    config.validate().unwrap();
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_crop_override_from_csv() {
    let mut config = ViewerConfig::default();
    config.apply(&Overrides {
        crop: Some(BoundingBox::from_csv("138.3, 34.3, 140.23, 35.7").unwrap()),
        ..Overrides::default()
    });
    let (lat_min, lat_max, lon_min, lon_max) = window::IZU;
    assert_eq!(config.crop.lat_min, lat_min);
    assert_eq!(config.crop.lat_max, lat_max);
    assert_eq!(config.crop.lon_min, lon_min);
    assert_eq!(config.crop.lon_max, lon_max);
    config.validate().unwrap();
}

#[test]
fn test_figure_config_uses_active_dpi() {
    let mut config = ViewerConfig::default();
    config.output.mode = OutputKind::Save;
    let figure = config.figure_config(None, None).unwrap();
    assert_eq!(figure.dpi, 300.0);
    assert_eq!(figure.pixel_size().unwrap(), (2100, 1800));
    assert_eq!((figure.vmin, figure.vmax), (-2.0, 2.0));
}
