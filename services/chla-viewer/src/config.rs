//! Viewer configuration.
//!
//! Every setting has a default, so an empty YAML document (or no file at all)
//! gives the standard Sagami Bay batch. YAML files support environment
//! variable substitution using `${VAR}` and `${VAR:-default}` syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chla_common::BoundingBox;
use netcdf_parser::VariableNames;
use renderer::colormap::{Color, Colormap, CHLOROPHYLL};
use renderer::FigureConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub input: InputConfig,
    pub variables: VariablesConfig,
    pub crop: CropConfig,
    pub colormap: ColormapConfig,
    pub figure: FigureSettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for rasters (not recursive)
    pub dir: PathBuf,
    /// Number of files processed per run
    pub max_files: usize,
    /// File name suffix that selects a raster
    pub suffix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./results/daily/Modis/chla"),
            max_files: 5,
            suffix: ".nc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariablesConfig {
    pub data: String,
    pub lat: String,
    pub lon: String,
    pub time: String,
}

impl Default for VariablesConfig {
    fn default() -> Self {
        let names = VariableNames::default();
        Self {
            data: names.data,
            lat: names.lat,
            lon: names.lon,
            time: names.time,
        }
    }
}

/// Crop window in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        // Small Sagami Bay
        Self {
            lat_min: 34.5,
            lat_max: 35.4,
            lon_min: 138.8,
            lon_max: 139.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColormapConfig {
    /// Hex colours, evenly spaced from vmin to vmax
    pub colors: Vec<String>,
    /// Colour limits in log10 units
    pub vmin: f64,
    pub vmax: f64,
    pub land_color: String,
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self {
            colors: CHLOROPHYLL.iter().map(|c| c.to_hex()).collect(),
            vmin: -2.0,
            vmax: 2.0,
            land_color: "#808080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureSettings {
    pub width_in: f32,
    pub height_in: f32,
    pub display_dpi: f32,
    pub save_dpi: f32,
    pub tick_font_pt: f32,
    pub label_font_pt: f32,
    /// Title with the first time step, formatted with `title_format`
    pub show_title: bool,
    pub title_format: String,
    /// Caption the colorbar with the variable's quantity label
    pub show_colorbar_label: bool,
    /// TrueType font; system locations are searched when unset
    pub font_path: Option<PathBuf>,
}

impl Default for FigureSettings {
    fn default() -> Self {
        Self {
            width_in: 7.0,
            height_in: 6.0,
            display_dpi: 100.0,
            save_dpi: 300.0,
            tick_font_pt: 20.0,
            label_font_pt: 12.0,
            show_title: false,
            title_format: "%b %Y".to_string(),
            show_colorbar_label: false,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Display,
    Save,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputKind,
    /// Destination of saved figures
    pub save_dir: PathBuf,
    /// Where previews for `viewer` are written; `$TMPDIR/chla-viewer` when unset
    pub preview_dir: Option<PathBuf>,
    /// External image viewer for display mode, run with the preview path
    /// appended. Unset shows figures in a built-in window instead.
    pub viewer: Option<String>,
    /// Log failing files and continue with the rest of the batch
    pub keep_going: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputKind::Display,
            save_dir: PathBuf::from("./figures"),
            preview_dir: None,
            viewer: None,
            keep_going: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            variables: VariablesConfig::default(),
            crop: CropConfig::default(),
            colormap: ColormapConfig::default(),
            figure: FigureSettings::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================================================
// Command-line overrides
// ============================================================================

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub max_files: Option<usize>,
    pub variable: Option<String>,
    pub crop: Option<BoundingBox>,
    pub save_dir: Option<PathBuf>,
    pub dpi: Option<f32>,
    pub viewer: Option<String>,
    pub font: Option<PathBuf>,
    pub keep_going: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

// ============================================================================
// Loading and derived values
// ============================================================================

impl ViewerConfig {
    /// Load a YAML file with environment variable substitution.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read viewer config from {:?}", path.as_ref()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid viewer config {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Parse YAML text with environment variable substitution.
    ///
    /// Values are not checked here; call [`ViewerConfig::validate`] once the
    /// command-line overrides have been applied.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        // An empty document deserializes as unit, not as an empty mapping.
        let config: ViewerConfig = if expanded.trim().is_empty() {
            ViewerConfig::default()
        } else {
            serde_yaml::from_str(&expanded).context("Failed to parse viewer config YAML")?
        };
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(dir) = &overrides.input_dir {
            self.input.dir = dir.clone();
        }
        if let Some(n) = overrides.max_files {
            self.input.max_files = n;
        }
        if let Some(var) = &overrides.variable {
            self.variables.data = var.clone();
        }
        if let Some(bbox) = &overrides.crop {
            self.crop = CropConfig {
                lat_min: bbox.min_y,
                lat_max: bbox.max_y,
                lon_min: bbox.min_x,
                lon_max: bbox.max_x,
            };
        }
        if let Some(dir) = &overrides.save_dir {
            self.output.mode = OutputKind::Save;
            self.output.save_dir = dir.clone();
        }
        if let Some(dpi) = overrides.dpi {
            match self.output.mode {
                OutputKind::Display => self.figure.display_dpi = dpi,
                OutputKind::Save => self.figure.save_dpi = dpi,
            }
        }
        if let Some(viewer) = &overrides.viewer {
            self.output.viewer = Some(viewer.clone());
        }
        if let Some(font) = &overrides.font {
            self.figure.font_path = Some(font.clone());
        }
        if overrides.keep_going {
            self.output.keep_going = true;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = &overrides.log_format {
            self.logging.format = format.to_lowercase();
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.input.max_files > 0,
            "input.max_files must be greater than 0"
        );
        anyhow::ensure!(
            !self.input.suffix.is_empty(),
            "input.suffix cannot be empty"
        );
        anyhow::ensure!(
            !self.variables.data.is_empty(),
            "variables.data cannot be empty"
        );

        let crop = &self.crop;
        anyhow::ensure!(
            [crop.lat_min, crop.lat_max, crop.lon_min, crop.lon_max]
                .iter()
                .all(|v| v.is_finite()),
            "crop bounds must be finite"
        );
        anyhow::ensure!(
            crop.lat_min <= crop.lat_max,
            "crop.lat_min must not exceed crop.lat_max"
        );
        anyhow::ensure!(
            crop.lon_min <= crop.lon_max,
            "crop.lon_min must not exceed crop.lon_max"
        );

        anyhow::ensure!(
            self.colormap.vmin < self.colormap.vmax,
            "colormap.vmin must be less than colormap.vmax"
        );
        self.colormap()?;
        self.land_color()?;

        for (name, dpi) in [
            ("figure.display_dpi", self.figure.display_dpi),
            ("figure.save_dpi", self.figure.save_dpi),
        ] {
            anyhow::ensure!(
                dpi.is_finite() && dpi > 0.0,
                "{} must be positive, got {}",
                name,
                dpi
            );
        }
        anyhow::ensure!(
            self.figure.width_in > 0.0 && self.figure.height_in > 0.0,
            "figure size must be positive"
        );

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        anyhow::ensure!(
            valid_levels.contains(&self.logging.level.as_str()),
            "Invalid log level: {}. Must be one of: {:?}",
            self.logging.level,
            valid_levels
        );
        let valid_formats = ["json", "pretty"];
        anyhow::ensure!(
            valid_formats.contains(&self.logging.format.as_str()),
            "Invalid log format: {}. Must be one of: {:?}",
            self.logging.format,
            valid_formats
        );

        Ok(())
    }

    pub fn crop_window(&self) -> BoundingBox {
        BoundingBox::from_lat_lon(
            self.crop.lat_min,
            self.crop.lat_max,
            self.crop.lon_min,
            self.crop.lon_max,
        )
    }

    pub fn variable_names(&self) -> VariableNames {
        VariableNames {
            data: self.variables.data.clone(),
            lat: self.variables.lat.clone(),
            lon: self.variables.lon.clone(),
            time: self.variables.time.clone(),
        }
    }

    pub fn colormap(&self) -> Result<Colormap> {
        Colormap::from_hex(&self.colormap.colors).context("Invalid colormap.colors")
    }

    pub fn land_color(&self) -> Result<Color> {
        Color::from_hex(&self.colormap.land_color).context("Invalid colormap.land_color")
    }

    /// DPI for the configured output mode.
    pub fn render_dpi(&self) -> f32 {
        match self.output.mode {
            OutputKind::Display => self.figure.display_dpi,
            OutputKind::Save => self.figure.save_dpi,
        }
    }

    /// Figure settings for one frame.
    pub fn figure_config(
        &self,
        title: Option<String>,
        colorbar_label: Option<String>,
    ) -> Result<FigureConfig> {
        Ok(FigureConfig {
            width_in: self.figure.width_in,
            height_in: self.figure.height_in,
            dpi: self.render_dpi(),
            vmin: self.colormap.vmin,
            vmax: self.colormap.vmax,
            land_color: self.land_color()?,
            tick_font_pt: self.figure.tick_font_pt,
            label_font_pt: self.figure.label_font_pt,
            title,
            colorbar_label,
            ..FigureConfig::default()
        })
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
pub fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            let value = resolve_var_expr(&var_expr)?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        ViewerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_resolve_default_when_unset() {
        let value = resolve_var_expr("CHLA_TEST_SURELY_UNSET_VAR:-fallback").unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_unset_without_default_fails() {
        assert!(resolve_var_expr("CHLA_TEST_SURELY_UNSET_VAR").is_err());
    }

    #[test]
    fn test_unclosed_substitution() {
        assert!(expand_env_vars("dir: ${HOME").is_err());
    }

    #[test]
    fn test_dpi_override_targets_active_mode() {
        let mut config = ViewerConfig::default();
        config.apply(&Overrides {
            dpi: Some(150.0),
            ..Overrides::default()
        });
        assert_eq!(config.figure.display_dpi, 150.0);
        assert_eq!(config.figure.save_dpi, 300.0);

        config.apply(&Overrides {
            save_dir: Some(PathBuf::from("out")),
            dpi: Some(200.0),
            ..Overrides::default()
        });
        assert_eq!(config.output.mode, OutputKind::Save);
        assert_eq!(config.figure.save_dpi, 200.0);
        assert_eq!(config.render_dpi(), 200.0);
    }
}
