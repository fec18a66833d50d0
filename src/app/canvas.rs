//! The drawing surface: the displayed image, the annotation overlay and
//! point picking.

use eframe::egui;
use egui::{Color32, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use crate::data::export::OverlayStyle;
use crate::data::geometry::{Point, SurfaceTransform};
use crate::session::Status;

use super::{sync_texture, PixelRulerApp};

const FULL_UV: Rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

impl PixelRulerApp {
    pub(super) fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let Some(image) = self.session.image().cloned() else {
            ui.centered_and_justified(|ui| {
                ui.heading(Status::WaitingForImage.to_string());
            });
            return;
        };
        let tex = sync_texture(
            ui.ctx(),
            &mut self.image_texture,
            "pixelruler-image",
            image.pixels(),
            image.revision(),
        );

        // Natural size: one image pixel per physical screen pixel.
        let [w, h] = image.size();
        let natural = Vec2::new(w as f32, h as f32) / ui.ctx().pixels_per_point();
        let display = if self.config.fit_to_window {
            fit_within(natural, ui.available_size())
        } else {
            natural
        };

        egui::ScrollArea::both().show(ui, |ui| {
            let (rect, response) = ui.allocate_exact_size(display, Sense::click());
            let surface = SurfaceTransform::new(rect, [w, h]);
            ui.painter().image(tex, rect, FULL_UV, Color32::WHITE);

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    // Failures are already reflected in the status line.
                    let _ = self.session.click_at(pos, &surface);
                }
            }
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
            }

            draw_overlay(
                &ui.painter_at(rect),
                &surface,
                self.session.points(),
                &self.config.overlay,
            );
        });
    }
}

/// Largest size with the aspect ratio of `natural` that fits in `avail`,
/// never scaled up.
pub(super) fn fit_within(natural: Vec2, avail: Vec2) -> Vec2 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return natural;
    }
    let scale = (avail.x / natural.x).min(avail.y / natural.y).min(1.0);
    if scale <= 0.0 {
        natural
    } else {
        natural * scale
    }
}

fn color(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Markers for every point, plus the connecting line once there are two.
fn draw_overlay(painter: &Painter, surface: &SurfaceTransform, points: &[Point], style: &OverlayStyle) {
    let zoom = surface.zoom();
    if let [p1, p2] = points {
        painter.line_segment(
            [surface.to_screen(*p1), surface.to_screen(*p2)],
            Stroke::new((style.line_width * zoom).max(1.0), color(style.line_rgba)),
        );
    }
    let radius = (style.marker_radius * zoom).max(2.0);
    for p in points {
        painter.circle_filled(surface.to_screen(*p), radius, color(style.marker_rgba));
    }
}
