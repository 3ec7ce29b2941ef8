//! Interactive figure window.
//!
//! Each figure gets its own native window; [`show_figure`] returns once the
//! window is closed from the title bar or with Escape / Q.

use anyhow::Result;
use eframe::egui;
use renderer::Figure;

/// Figure pixels as an egui image.
pub fn color_image(figure: &Figure) -> egui::ColorImage {
    let size = [figure.width() as usize, figure.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, figure.image.as_raw())
}

struct FigureWindow {
    /// Uploaded on the first frame
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
}

impl eframe::App for FigureWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(image) = self.pending.take() {
            self.texture = Some(ctx.load_texture("figure", image, egui::TextureOptions::LINEAR));
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::WHITE))
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::from_texture(texture).shrink_to_fit());
                    });
                }
            });
    }
}

/// Open a window showing `figure` and block until it is closed.
pub fn show_figure(title: &str, figure: &Figure) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([figure.width() as f32, figure.height() as f32]),
        ..Default::default()
    };
    let app = FigureWindow {
        pending: Some(color_image(figure)),
        texture: None,
    };

    eframe::run_native(title, options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Figure window failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chla_common::MaskedGrid;
    use renderer::{render_figure, Colormap, FigureConfig, TextPainter};

    #[test]
    fn test_color_image_matches_figure_pixels() {
        let log = MaskedGrid::from_values(3, 2, vec![-1.0, 0.0, 1.0, f32::NAN, 0.5, -0.5]).unwrap();
        let config = FigureConfig {
            width_in: 2.0,
            height_in: 1.5,
            dpi: 50.0,
            ..FigureConfig::default()
        };
        let figure = render_figure(
            &log,
            [139.0, 140.0, 35.0, 35.5],
            &Colormap::chlorophyll(),
            &config,
            &TextPainter::without_font(),
        )
        .unwrap();

        let image = color_image(&figure);
        assert_eq!(image.size, [100, 75]);
        assert_eq!(image.pixels.len(), 100 * 75);

        let px = figure.image.get_pixel(50, 40);
        let color = image.pixels[40 * 100 + 50];
        assert_eq!(color.to_array(), [px[0], px[1], px[2], px[3]]);
    }
}
