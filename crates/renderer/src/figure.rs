//! Map figure rendering: raster image, axes, ticks and colorbar.
//!
//! Layout follows the usual single-axes figure: the axes box takes the middle
//! of the canvas, the raster is fitted into it with equal degrees per pixel on
//! both axes, and a vertical colorbar sits to the right of the raster. All
//! sizes given in points are converted with `px = pt * dpi / 72`.

use chla_common::MaskedGrid;
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::colormap::{Color, Colormap, Normalize};
use crate::error::{RenderError, RenderResult};
use crate::png::encode_rgba_image;
use crate::text::{HAlign, TextPainter, VAlign};

/// Subplot margins as fractions of the canvas (left, right, bottom, top).
const SUBPLOT_LEFT: f64 = 0.125;
const SUBPLOT_RIGHT: f64 = 0.9;
const SUBPLOT_BOTTOM: f64 = 0.11;
const SUBPLOT_TOP: f64 = 0.88;

const TICK_LENGTH_PT: f32 = 3.5;
const TICK_PAD_PT: f32 = 3.5;
const LABEL_PAD_PT: f32 = 4.0;
const LINE_WIDTH_PT: f32 = 0.8;
const TITLE_PAD_PT: f32 = 6.0;
const TITLE_SCALE: f32 = 1.2;

/// Maximum number of longitude ticks.
pub const MAX_LON_TICKS: usize = 6;

/// Layout passes spent shrinking the raster to fit the colorbar labels.
const MAX_FIT_PASSES: usize = 8;

/// Stand-in span for an axis with a single coordinate.
const DEGENERATE_SPAN: f64 = 1e-3;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Colorbar geometry relative to the axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorbarGeometry {
    /// Share of the axes width given up to the colorbar
    pub fraction: f64,
    /// Gap between raster and colorbar, as a share of the axes width
    pub pad: f64,
    /// Colorbar height / width
    pub aspect: f64,
}

impl Default for ColorbarGeometry {
    fn default() -> Self {
        Self {
            fraction: 0.0324,
            pad: 0.025,
            aspect: 15.0,
        }
    }
}

/// Everything that controls how a figure looks.
#[derive(Debug, Clone)]
pub struct FigureConfig {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: f32,
    /// Colour limits applied to the log10 data
    pub vmin: f64,
    pub vmax: f64,
    /// Colour painted under masked cells
    pub land_color: Color,
    pub background: Color,
    /// Tick label size
    pub tick_font_pt: f32,
    /// Axis label and colorbar caption size
    pub label_font_pt: f32,
    pub x_label: String,
    pub y_label: String,
    pub title: Option<String>,
    pub colorbar_label: Option<String>,
    pub colorbar: ColorbarGeometry,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_in: 7.0,
            height_in: 6.0,
            dpi: 100.0,
            vmin: -2.0,
            vmax: 2.0,
            land_color: Color::rgb(0x80, 0x80, 0x80),
            background: Color::rgb(255, 255, 255),
            tick_font_pt: 20.0,
            label_font_pt: 12.0,
            x_label: "Longitude [°E]".to_string(),
            y_label: "Latitude [°N]".to_string(),
            title: None,
            colorbar_label: None,
            colorbar: ColorbarGeometry::default(),
        }
    }
}

impl FigureConfig {
    pub fn pt_to_px(&self, pt: f32) -> f32 {
        pt * self.dpi / 72.0
    }

    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> RenderResult<(u32, u32)> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !(valid(self.width_in) && valid(self.height_in) && valid(self.dpi)) {
            return Err(RenderError::InvalidConfig(format!(
                "figure size {}x{} in at {} dpi",
                self.width_in, self.height_in, self.dpi
            )));
        }
        let w = (self.width_in * self.dpi).round();
        let h = (self.height_in * self.dpi).round();
        if w < 1.0 || h < 1.0 || w > 30_000.0 || h > 30_000.0 {
            return Err(RenderError::InvalidConfig(format!(
                "canvas of {}x{} px is out of range",
                w, h
            )));
        }
        Ok((w as u32, h as u32))
    }

    pub fn normalize(&self) -> RenderResult<Normalize> {
        Ok(Normalize::new(self.vmin, self.vmax)?)
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Where the raster and the colorbar land on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureLayout {
    pub canvas: (u32, u32),
    pub image: PixelRect,
    pub colorbar: PixelRect,
    /// `[lon_min, lon_max, lat_min, lat_max]`
    pub extent: [f64; 4],
}

impl FigureLayout {
    /// Pixel column of a longitude.
    pub fn x_of(&self, lon: f64) -> f64 {
        let [lon_min, lon_max, _, _] = self.extent;
        self.image.x as f64 + (lon - lon_min) / span(lon_min, lon_max) * self.image.width as f64
    }

    /// Pixel row of a latitude (north up).
    pub fn y_of(&self, lat: f64) -> f64 {
        let [_, _, lat_min, lat_max] = self.extent;
        self.image.y as f64 + (lat_max - lat) / span(lat_min, lat_max) * self.image.height as f64
    }
}

fn span(min: f64, max: f64) -> f64 {
    let s = max - min;
    if s > 0.0 {
        s
    } else {
        DEGENERATE_SPAN
    }
}

/// Place the raster and colorbar for `extent` on the configured canvas.
///
/// `label_width` is the pixel width of the colorbar tick labels and caption.
/// When they would run past the right edge of the canvas the raster is
/// narrowed until they fit.
pub fn compute_layout(
    config: &FigureConfig,
    extent: [f64; 4],
    label_width: u32,
) -> RenderResult<FigureLayout> {
    let (w, h) = config.pixel_size()?;
    if extent.iter().any(|v| !v.is_finite()) {
        return Err(RenderError::InvalidConfig(format!(
            "extent {:?} is not finite",
            extent
        )));
    }
    let [lon_min, lon_max, lat_min, lat_max] = extent;
    let cb = config.colorbar;

    let axes_left = SUBPLOT_LEFT * w as f64;
    let axes_top = (1.0 - SUBPLOT_TOP) * h as f64;
    let axes_w = (SUBPLOT_RIGHT - SUBPLOT_LEFT) * w as f64;
    let axes_h = (SUBPLOT_TOP - SUBPLOT_BOTTOM) * h as f64;
    let (dx, dy) = (span(lon_min, lon_max), span(lat_min, lat_max));

    // Tick marks, their padding and the labels right of the colorbar.
    let px = |pt: f32| config.pt_to_px(pt).round().max(1.0) as i32;
    let decorations = px(LINE_WIDTH_PT) * 2 + px(TICK_LENGTH_PT) + px(TICK_PAD_PT) + label_width as i32;

    let mut region_w = axes_w * (1.0 - cb.fraction - cb.pad);
    let mut placed = place(axes_left, axes_top, region_w, axes_h, dx, dy, cb, axes_w);
    for _ in 0..MAX_FIT_PASSES {
        let overflow = placed.1.right() + decorations - w as i32;
        if overflow <= 0 || region_w <= 1.0 {
            break;
        }
        region_w = (region_w - overflow as f64).max(1.0);
        placed = place(axes_left, axes_top, region_w, axes_h, dx, dy, cb, axes_w);
    }
    let (image, colorbar) = placed;

    Ok(FigureLayout {
        canvas: (w, h),
        image,
        colorbar,
        extent,
    })
}

/// Fit the raster into `region_w` x `axes_h` and hang the colorbar off it.
#[allow(clippy::too_many_arguments)]
fn place(
    axes_left: f64,
    axes_top: f64,
    region_w: f64,
    axes_h: f64,
    dx: f64,
    dy: f64,
    cb: ColorbarGeometry,
    axes_w: f64,
) -> (PixelRect, PixelRect) {
    let scale = (region_w / dx).min(axes_h / dy);
    let img_w = (dx * scale).round().max(1.0);
    let img_h = (dy * scale).round().max(1.0);

    let image = PixelRect {
        x: (axes_left + (region_w - img_w) / 2.0).round() as i32,
        y: (axes_top + (axes_h - img_h) / 2.0).round() as i32,
        width: img_w as u32,
        height: img_h as u32,
    };

    let cb_h = image.height;
    let cb_w = (cb_h as f64 / cb.aspect).round().max(1.0) as u32;
    let colorbar = PixelRect {
        x: image.right() + (cb.pad * axes_w).round() as i32,
        y: image.y,
        width: cb_w,
        height: cb_h,
    };
    (image, colorbar)
}

/// Width taken by the colorbar tick labels and the rotated caption.
pub fn colorbar_label_width(config: &FigureConfig, text: &TextPainter) -> u32 {
    let tick_px = config.pt_to_px(config.tick_font_pt);
    let ticks = colorbar_ticks(config.vmin, config.vmax)
        .iter()
        .filter_map(|&t| text.measure(&format_colorbar_tick(t), tick_px))
        .map(|b| b.width())
        .max()
        .unwrap_or(0);

    let caption = config
        .colorbar_label
        .as_deref()
        .and_then(|c| text.measure(c, config.pt_to_px(config.label_font_pt)))
        .map(|b| b.height() + config.pt_to_px(LABEL_PAD_PT).round() as u32)
        .unwrap_or(0);

    ticks + caption
}

/// Integer latitude ticks `ceil(lat_min) ..= ceil(lat_max)`.
pub fn latitude_ticks(lat_min: f64, lat_max: f64) -> Vec<f64> {
    if !(lat_min.is_finite() && lat_max.is_finite()) {
        return Vec::new();
    }
    let first = lat_min.ceil() as i64;
    let last = lat_max.ceil() as i64;
    (first..=last).map(|v| v as f64).collect()
}

/// Ticks at multiples of a "nice" step (1, 2, 2.5 or 5 × 10^k) inside
/// `[min, max]`, using the smallest step that yields at most `max_ticks`.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max < min || max_ticks == 0 {
        return Vec::new();
    }
    let range = max - min;
    if range == 0.0 {
        return vec![min];
    }

    let mut exponent = (range / max_ticks as f64).log10().floor() as i32 - 1;
    loop {
        for mantissa in [1.0, 2.0, 2.5, 5.0] {
            let step = mantissa * 10f64.powi(exponent);
            let eps = step * 1e-9;
            let first = ((min - eps) / step).ceil() as i64;
            let last = ((max + eps) / step).floor() as i64;
            let count = (last - first + 1).max(0) as usize;
            if count <= max_ticks {
                return (first..=last)
                    .map(|i| clean_zero(i as f64 * step))
                    .collect();
            }
        }
        exponent += 1;
    }
}

fn clean_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Colorbar ticks: the lower limit, zero and the upper limit.
pub fn colorbar_ticks(vmin: f64, vmax: f64) -> [f64; 3] {
    [vmin, 0.0, vmax]
}

/// Colorbar tick label with two decimals.
pub fn format_colorbar_tick(value: f64) -> String {
    format!("{:.2}", clean_zero(value))
}

/// Axis tick labels sharing the fewest decimals that represent every tick.
pub fn format_axis_ticks(ticks: &[f64]) -> Vec<String> {
    let decimals = ticks
        .iter()
        .map(|&t| {
            (0..=6)
                .find(|&d| {
                    let f = 10f64.powi(d);
                    ((t * f).round() / f - t).abs() < 1e-9 * t.abs().max(1.0)
                })
                .unwrap_or(6)
        })
        .max()
        .unwrap_or(0) as usize;
    ticks
        .iter()
        .map(|&t| format!("{:.*}", decimals, clean_zero(t)))
        .collect()
}

/// Land layer: masked cells get `land`, everything else is transparent.
pub fn render_land_layer(log: &MaskedGrid, land: Color) -> RgbaImage {
    let mut img = RgbaImage::new(log.width() as u32, log.height() as u32);
    for (i, &masked) in log.mask().iter().enumerate() {
        if masked {
            let (x, y) = ((i % log.width()) as u32, (i / log.width()) as u32);
            img.put_pixel(x, y, land.to_rgba());
        }
    }
    img
}

/// Data layer: unmasked cells coloured through `cmap`, masked cells transparent.
pub fn render_data_layer(log: &MaskedGrid, cmap: &Colormap, norm: &Normalize) -> RgbaImage {
    let mut img = RgbaImage::new(log.width() as u32, log.height() as u32);
    for (i, (&value, &masked)) in log.values().iter().zip(log.mask()).enumerate() {
        if !masked {
            let (x, y) = ((i % log.width()) as u32, (i / log.width()) as u32);
            img.put_pixel(x, y, cmap.map_value(value as f64, norm).to_rgba());
        }
    }
    img
}

/// A rendered figure held in memory.
#[derive(Debug, Clone)]
pub struct Figure {
    pub image: RgbaImage,
    pub dpi: f32,
    pub layout: FigureLayout,
}

impl Figure {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode as PNG with the figure DPI recorded.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        encode_rgba_image(&self.image, Some(self.dpi))
    }
}

/// Render a north-up log10 grid covering `extent` into a figure.
pub fn render_figure(
    log: &MaskedGrid,
    extent: [f64; 4],
    cmap: &Colormap,
    config: &FigureConfig,
    text: &TextPainter,
) -> RenderResult<Figure> {
    if log.is_empty() {
        return Err(RenderError::InvalidConfig(
            "cannot render an empty grid".to_string(),
        ));
    }
    let norm = config.normalize()?;
    let layout = compute_layout(config, extent, colorbar_label_width(config, text))?;
    let (w, h) = layout.canvas;

    let mut canvas = RgbaImage::from_pixel(w, h, config.background.to_rgba());

    // Data over land, then scaled to the image box.
    let mut raster = render_land_layer(log, config.land_color);
    imageops::overlay(&mut raster, &render_data_layer(log, cmap, &norm), 0, 0);
    let raster = imageops::resize(
        &raster,
        layout.image.width,
        layout.image.height,
        imageops::FilterType::Nearest,
    );
    imageops::overlay(
        &mut canvas,
        &raster,
        layout.image.x as i64,
        layout.image.y as i64,
    );

    let mut axes = AxesPainter::new(&mut canvas, config, text, &layout);
    axes.frame(layout.image);
    axes.longitude_axis();
    axes.latitude_axis();
    axes.colorbar(cmap, &norm);
    axes.title();

    debug!(
        width = w,
        height = h,
        dpi = config.dpi,
        image = ?layout.image,
        colorbar = ?layout.colorbar,
        "Rendered figure"
    );

    Ok(Figure {
        image: canvas,
        dpi: config.dpi,
        layout,
    })
}

/// Draws the frame, ticks, labels and colorbar around the raster.
struct AxesPainter<'a> {
    canvas: &'a mut RgbaImage,
    config: &'a FigureConfig,
    text: &'a TextPainter,
    layout: &'a FigureLayout,
    line: i32,
    tick_len: i32,
    tick_pad: i32,
    label_pad: i32,
    tick_px: f32,
    label_px: f32,
}

impl<'a> AxesPainter<'a> {
    fn new(
        canvas: &'a mut RgbaImage,
        config: &'a FigureConfig,
        text: &'a TextPainter,
        layout: &'a FigureLayout,
    ) -> Self {
        let px = |pt: f32| config.pt_to_px(pt).round().max(1.0) as i32;
        Self {
            canvas,
            config,
            text,
            layout,
            line: px(LINE_WIDTH_PT),
            tick_len: px(TICK_LENGTH_PT),
            tick_pad: px(TICK_PAD_PT),
            label_pad: px(LABEL_PAD_PT),
            tick_px: config.pt_to_px(config.tick_font_pt),
            label_px: config.pt_to_px(config.label_font_pt),
        }
    }

    fn fill(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
        let rect = Rect::at(x, y).of_size(w.max(1) as u32, h.max(1) as u32);
        draw_filled_rect_mut(self.canvas, rect, color);
    }

    /// Outline drawn just outside `rect`.
    fn frame(&mut self, rect: PixelRect) {
        let lw = self.line;
        let (w, h) = (rect.width as i32, rect.height as i32);
        self.fill(rect.x - lw, rect.y - lw, w + 2 * lw, lw, BLACK);
        self.fill(rect.x - lw, rect.bottom(), w + 2 * lw, lw, BLACK);
        self.fill(rect.x - lw, rect.y, lw, h, BLACK);
        self.fill(rect.right(), rect.y, lw, h, BLACK);
    }

    fn longitude_axis(&mut self) {
        let [lon_min, lon_max, _, _] = self.layout.extent;
        let ticks = nice_ticks(lon_min, lon_max, MAX_LON_TICKS);
        let labels = format_axis_ticks(&ticks);

        let image = self.layout.image;
        let mark_top = image.bottom() + self.line;
        let label_top = mark_top + self.tick_len + self.tick_pad;
        let mut lowest = label_top;

        for (tick, label) in ticks.iter().zip(&labels) {
            let x = self.layout.x_of(*tick).round() as i32;
            self.fill(x - self.line / 2, mark_top, self.line, self.tick_len, BLACK);
            if let Some(b) = self.text.draw(
                self.canvas,
                label,
                x,
                label_top,
                self.tick_px,
                BLACK,
                HAlign::Center,
                VAlign::Top,
            ) {
                lowest = lowest.max(b.max_y);
            }
        }

        let x_label = self.config.x_label.clone();
        self.text.draw(
            self.canvas,
            &x_label,
            image.x + image.width as i32 / 2,
            lowest + self.label_pad,
            self.label_px,
            BLACK,
            HAlign::Center,
            VAlign::Top,
        );
    }

    fn latitude_axis(&mut self) {
        let [_, _, lat_min, lat_max] = self.layout.extent;
        let eps = 1e-9 * lat_min.abs().max(lat_max.abs()).max(1.0);
        let ticks: Vec<f64> = latitude_ticks(lat_min, lat_max)
            .into_iter()
            .filter(|&t| t >= lat_min - eps && t <= lat_max + eps)
            .collect();
        let labels = format_axis_ticks(&ticks);

        let image = self.layout.image;
        let mark_left = image.x - self.line - self.tick_len;
        let label_right = mark_left - self.tick_pad;
        let mut leftmost = label_right;

        for (tick, label) in ticks.iter().zip(&labels) {
            let y = self.layout.y_of(*tick).round() as i32;
            self.fill(mark_left, y - self.line / 2, self.tick_len, self.line, BLACK);
            if let Some(b) = self.text.draw(
                self.canvas,
                label,
                label_right,
                y,
                self.tick_px,
                BLACK,
                HAlign::Right,
                VAlign::Center,
            ) {
                leftmost = leftmost.min(b.min_x);
            }
        }

        let y_label = self.config.y_label.clone();
        if let Some(bounds) = self.text.measure(&y_label, self.label_px) {
            let cx = leftmost - self.label_pad - bounds.height() as i32 / 2;
            self.text.draw_vertical(
                self.canvas,
                &y_label,
                cx,
                image.y + image.height as i32 / 2,
                self.label_px,
                BLACK,
            );
        }
    }

    fn colorbar(&mut self, cmap: &Colormap, norm: &Normalize) {
        let cb = self.layout.colorbar;
        let height = cb.height as i32;

        // vmin at the bottom
        for row in 0..height {
            let t = 1.0 - (row as f64 + 0.5) / height as f64;
            let color = cmap.lookup(t).to_rgba();
            self.fill(cb.x, cb.y + row, cb.width as i32, 1, color);
        }
        self.frame(cb);

        let mark_left = cb.right() + self.line;
        let label_left = mark_left + self.tick_len + self.tick_pad;
        let mut rightmost = label_left;

        for tick in colorbar_ticks(norm.vmin, norm.vmax) {
            if tick < norm.vmin || tick > norm.vmax {
                continue;
            }
            let y = (cb.y as f64 + (1.0 - norm.apply(tick)) * height as f64).round() as i32;
            self.fill(mark_left, y - self.line / 2, self.tick_len, self.line, BLACK);
            let label = format_colorbar_tick(tick);
            // Keep the label on the canvas
            let x = match self.text.measure(&label, self.tick_px) {
                Some(b) => label_left.min(self.canvas.width() as i32 - b.width() as i32),
                None => label_left,
            };
            if let Some(b) = self.text.draw(
                self.canvas,
                &label,
                x,
                y,
                self.tick_px,
                BLACK,
                HAlign::Left,
                VAlign::Center,
            ) {
                rightmost = rightmost.max(b.max_x);
            }
        }

        if let Some(caption) = self.config.colorbar_label.clone() {
            if let Some(bounds) = self.text.measure(&caption, self.label_px) {
                let cx = rightmost + self.label_pad + bounds.height() as i32 / 2;
                self.text.draw_vertical(
                    self.canvas,
                    &caption,
                    cx,
                    cb.y + height / 2,
                    self.label_px,
                    BLACK,
                );
            }
        }
    }

    fn title(&mut self) {
        let Some(title) = self.config.title.clone() else {
            return;
        };
        let image = self.layout.image;
        let pad = self.config.pt_to_px(TITLE_PAD_PT).round() as i32;
        self.text.draw(
            self.canvas,
            &title,
            image.x + image.width as i32 / 2,
            image.y - self.line - pad,
            self.tick_px * TITLE_SCALE,
            BLACK,
            HAlign::Center,
            VAlign::Bottom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size() {
        let mut config = FigureConfig::default();
        assert_eq!(config.pixel_size().unwrap(), (700, 600));
        config.dpi = 300.0;
        assert_eq!(config.pixel_size().unwrap(), (2100, 1800));
        config.dpi = 0.0;
        assert!(config.pixel_size().is_err());
    }

    #[test]
    fn test_latitude_ticks() {
        assert_eq!(latitude_ticks(34.5, 35.4), vec![35.0, 36.0]);
        assert_eq!(latitude_ticks(34.0, 36.0), vec![34.0, 35.0, 36.0]);
        assert_eq!(latitude_ticks(-1.5, 0.5), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_nice_ticks_sagami_bay() {
        let ticks = nice_ticks(138.8, 139.9, MAX_LON_TICKS);
        let expected = [138.8, 139.0, 139.2, 139.4, 139.6, 139.8];
        assert_eq!(ticks.len(), expected.len());
        for (t, e) in ticks.iter().zip(expected) {
            assert!((t - e).abs() < 1e-9, "{t} != {e}");
        }
        assert_eq!(format_axis_ticks(&ticks)[1], "139.0");
    }

    #[test]
    fn test_nice_ticks_wide_range() {
        let ticks = nice_ticks(138.3, 140.23, MAX_LON_TICKS);
        assert_eq!(ticks, vec![138.5, 139.0, 139.5, 140.0]);
    }

    #[test]
    fn test_nice_ticks_degenerate() {
        assert_eq!(nice_ticks(139.0, 139.0, 6), vec![139.0]);
        assert!(nice_ticks(2.0, 1.0, 6).is_empty());
        assert!(nice_ticks(f64::NAN, 1.0, 6).is_empty());
    }

    #[test]
    fn test_format_axis_ticks() {
        assert_eq!(format_axis_ticks(&[139.0, 140.0]), vec!["139", "140"]);
        assert_eq!(
            format_axis_ticks(&[139.0, 139.5, 140.0]),
            vec!["139.0", "139.5", "140.0"]
        );
        assert_eq!(format_axis_ticks(&[-0.25, 0.0]), vec!["-0.25", "0.00"]);
    }

    #[test]
    fn test_colorbar_ticks_and_format() {
        let ticks = colorbar_ticks(-2.0, 2.0);
        assert_eq!(ticks, [-2.0, 0.0, 2.0]);
        let labels: Vec<String> = ticks.iter().map(|&t| format_colorbar_tick(t)).collect();
        assert_eq!(labels, vec!["-2.00", "0.00", "2.00"]);
        assert_eq!(format_colorbar_tick(-0.0), "0.00");
    }

    #[test]
    fn test_layout_equal_aspect() {
        let config = FigureConfig::default();
        let layout = compute_layout(&config, [138.8, 139.9, 34.5, 35.4], 0).unwrap();
        let px_per_deg_x = layout.image.width as f64 / 1.1;
        let px_per_deg_y = layout.image.height as f64 / 0.9;
        assert!((px_per_deg_x - px_per_deg_y).abs() / px_per_deg_x < 0.01);
        assert_eq!(layout.colorbar.height, layout.image.height);
        assert!(layout.colorbar.x > layout.image.right());
        assert!(layout.colorbar.right() <= 700);
    }

    #[test]
    fn test_layout_single_column() {
        let config = FigureConfig::default();
        let layout = compute_layout(&config, [139.0, 139.0, 34.5, 35.4], 0).unwrap();
        assert!(layout.image.width >= 1);
        assert!(layout.image.height > 100);
    }

    #[test]
    fn test_layout_reserves_colorbar_labels() {
        let config = FigureConfig::default();
        let extent = [138.8, 139.9, 34.5, 35.4];
        let bare = compute_layout(&config, extent, 0).unwrap();
        // "-2.00" at 20 pt and 100 dpi is roughly 65 px wide
        let labelled = compute_layout(&config, extent, 70).unwrap();

        assert!(labelled.image.width < bare.image.width);
        let decorations = 2 + 5 + 5 + 70;
        assert!(labelled.colorbar.right() + decorations <= 700);
        let px_per_deg_x = labelled.image.width as f64 / 1.1;
        let px_per_deg_y = labelled.image.height as f64 / 0.9;
        assert!((px_per_deg_x - px_per_deg_y).abs() / px_per_deg_x < 0.01);
    }

    #[test]
    fn test_layers_are_complementary() {
        let grid = MaskedGrid::new(2, 1, vec![0.0, 1.0], vec![true, false]).unwrap();
        let norm = Normalize::new(-2.0, 2.0).unwrap();
        let land = render_land_layer(&grid, Color::rgb(128, 128, 128));
        let data = render_data_layer(&grid, &Colormap::chlorophyll(), &norm);
        assert_eq!(land.get_pixel(0, 0)[3], 255);
        assert_eq!(land.get_pixel(1, 0)[3], 0);
        assert_eq!(data.get_pixel(0, 0)[3], 0);
        assert_eq!(data.get_pixel(1, 0)[3], 255);
    }
}
