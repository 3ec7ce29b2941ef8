//! Text drawing for figure labels.
//!
//! Fonts are read from disk at runtime: an explicitly configured TrueType
//! file first, then a handful of locations where common Linux and macOS
//! installs keep DejaVu/Liberation/Helvetica. Without a font the painter
//! becomes a no-op and figures are drawn without text.

use std::path::{Path, PathBuf};

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

/// Candidate font files, tried in order.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/local/share/fonts/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Horizontal anchor of a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Ink bounds of a string relative to the layout origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }
}

/// Draws anchored text with an optional font.
#[derive(Clone)]
pub struct TextPainter {
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for TextPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPainter")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl TextPainter {
    /// Load the configured font, falling back to [`FONT_SEARCH_PATHS`].
    pub fn load(configured: Option<&Path>) -> Self {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_SEARCH_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };
            match Font::try_from_vec(bytes) {
                Some(font) => {
                    debug!(font = %path.display(), "Loaded font");
                    return Self { font: Some(font) };
                }
                None => warn!(font = %path.display(), "Failed to parse font file"),
            }
        }

        warn!("Failed to load font; figures will be rendered without text");
        Self::without_font()
    }

    pub fn without_font() -> Self {
        Self { font: None }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Ink bounds of `text` at `size_px`, or `None` without a font.
    pub fn measure(&self, text: &str, size_px: f32) -> Option<TextBounds> {
        let font = self.font.as_ref()?;
        let scale = Scale::uniform(size_px);
        let ascent = font.v_metrics(scale).ascent;

        let mut bounds: Option<TextBounds> = None;
        for glyph in font.layout(text, scale, point(0.0, ascent)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                let b = bounds.get_or_insert(TextBounds {
                    min_x: bb.min.x,
                    min_y: bb.min.y,
                    max_x: bb.max.x,
                    max_y: bb.max.y,
                });
                b.min_x = b.min_x.min(bb.min.x);
                b.min_y = b.min_y.min(bb.min.y);
                b.max_x = b.max_x.max(bb.max.x);
                b.max_y = b.max_y.max(bb.max.y);
            }
        }
        Some(bounds.unwrap_or_default())
    }

    /// Draw `text` so its ink box is anchored at `(x, y)`.
    ///
    /// Returns the bounds of the drawn box in image coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size_px: f32,
        color: Rgba<u8>,
        h: HAlign,
        v: VAlign,
    ) -> Option<TextBounds> {
        let font = self.font.as_ref()?;
        let bounds = self.measure(text, size_px)?;
        let (w, ht) = (bounds.width() as i32, bounds.height() as i32);

        let left = match h {
            HAlign::Left => x,
            HAlign::Center => x - w / 2,
            HAlign::Right => x - w,
        };
        let top = match v {
            VAlign::Top => y,
            VAlign::Center => y - ht / 2,
            VAlign::Bottom => y - ht,
        };

        draw_text_mut(
            image,
            color,
            left - bounds.min_x,
            top - bounds.min_y,
            Scale::uniform(size_px),
            font,
            text,
        );

        Some(TextBounds {
            min_x: left,
            min_y: top,
            max_x: left + w,
            max_y: top + ht,
        })
    }

    /// Draw `text` rotated 90° counter-clockwise, centred on `(cx, cy)`.
    pub fn draw_vertical(
        &self,
        image: &mut RgbaImage,
        text: &str,
        cx: i32,
        cy: i32,
        size_px: f32,
        color: Rgba<u8>,
    ) -> Option<TextBounds> {
        let font = self.font.as_ref()?;
        let bounds = self.measure(text, size_px)?;
        if bounds.width() == 0 || bounds.height() == 0 {
            return None;
        }

        // Same colour with zero alpha, so glyph coverage becomes alpha.
        let clear = Rgba([color[0], color[1], color[2], 0]);
        let mut scratch = RgbaImage::from_pixel(bounds.width(), bounds.height(), clear);
        draw_text_mut(
            &mut scratch,
            color,
            -bounds.min_x,
            -bounds.min_y,
            Scale::uniform(size_px),
            font,
            text,
        );
        let rotated = imageops::rotate270(&scratch);

        let left = cx - rotated.width() as i32 / 2;
        let top = cy - rotated.height() as i32 / 2;
        imageops::overlay(image, &rotated, left as i64, top as i64);

        Some(TextBounds {
            min_x: left,
            min_y: top,
            max_x: left + rotated.width() as i32,
            max_y: top + rotated.height() as i32,
        })
    }
}
