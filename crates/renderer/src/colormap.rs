//! Piecewise-linear colormaps built from hex colour lists.
//!
//! Colours are spaced evenly over `[0, 1]` and sampled into a 256-entry
//! lookup table, the same quantisation a listed colormap uses when it is
//! applied to an image.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of entries in the colormap lookup table.
pub const LUT_SIZE: usize = 256;

/// Blue-to-dark-red ramp used for log10 chlorophyll
/// (`#3500a8` ... `#880000`).
pub const CHLOROPHYLL: [Color; 9] = [
    Color::rgb(0x35, 0x00, 0xa8),
    Color::rgb(0x08, 0x00, 0xba),
    Color::rgb(0x00, 0x3f, 0xd6),
    Color::rgb(0x00, 0xac, 0xa9),
    Color::rgb(0x77, 0xf8, 0x00),
    Color::rgb(0xff, 0x88, 0x00),
    Color::rgb(0xb3, 0x00, 0x00),
    Color::rgb(0x92, 0x00, 0x00),
    Color::rgb(0x88, 0x00, 0x00),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColormapError {
    #[error("invalid hex colour '{0}'")]
    InvalidHex(String),

    #[error("a colormap needs at least 2 colours, got {0}")]
    TooFewColors(usize),

    #[error("colour limits must be finite with vmin < vmax, got [{vmin}, {vmax}]")]
    InvalidLimits { vmin: f64, vmax: f64 },
}

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColormapError> {
        hex_to_rgb(hex)
            .map(|(r, g, b)| Self::rgb(r, g, b))
            .ok_or_else(|| ColormapError::InvalidHex(hex.to_string()))
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Convert hex color string to RGB tuple
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f64 * t_inv + b as f64 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Maps data values onto `[0, 1]` between fixed colour limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Result<Self, ColormapError> {
        if !(vmin.is_finite() && vmax.is_finite() && vmin < vmax) {
            return Err(ColormapError::InvalidLimits { vmin, vmax });
        }
        Ok(Self { vmin, vmax })
    }

    /// Position of `value` between the limits. Not clamped.
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.vmin) / (self.vmax - self.vmin)
    }
}

/// Evenly spaced colours with a quantised lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    colors: Vec<Color>,
    lut: Vec<Color>,
}

impl Colormap {
    pub fn from_colors(colors: Vec<Color>) -> Result<Self, ColormapError> {
        if colors.len() < 2 {
            return Err(ColormapError::TooFewColors(colors.len()));
        }
        let lut = build_lut(&colors);
        Ok(Self { colors, lut })
    }

    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, ColormapError> {
        let colors = hex
            .iter()
            .map(|h| Color::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_colors(colors)
    }

    /// The nine-colour chlorophyll ramp.
    pub fn chlorophyll() -> Self {
        let colors = CHLOROPHYLL.to_vec();
        let lut = build_lut(&colors);
        Self { colors, lut }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn lut(&self) -> &[Color] {
        &self.lut
    }

    /// Colour for a normalised position. Values outside `[0, 1]` clamp to the
    /// end colours; NaN maps to the first colour.
    pub fn lookup(&self, t: f64) -> Color {
        let index = if t.is_nan() || t <= 0.0 {
            0
        } else {
            ((t * LUT_SIZE as f64) as usize).min(LUT_SIZE - 1)
        };
        self.lut[index]
    }

    /// Colour for a data value between `norm`'s limits.
    pub fn map_value(&self, value: f64, norm: &Normalize) -> Color {
        self.lookup(norm.apply(value))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::chlorophyll()
    }
}

fn build_lut(colors: &[Color]) -> Vec<Color> {
    let segments = (colors.len() - 1) as f64;
    (0..LUT_SIZE)
        .map(|i| {
            let x = i as f64 / (LUT_SIZE - 1) as f64 * segments;
            let lower = (x.floor() as usize).min(colors.len() - 2);
            interpolate_color(colors[lower], colors[lower + 1], x - lower as f64)
        })
        .collect()
}
