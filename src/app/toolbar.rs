//! Toolbar, side panel and status line.

use eframe::egui;
use egui::{Color32, RichText};
use egui_phosphor::regular::{
    APERTURE, CAMERA, CROSSHAIR, ERASER, FLOPPY_DISK, RULER, UPLOAD_SIMPLE,
};

use crate::data::hotkeys::{format_button_tooltip, HotkeyAction};
use crate::session::AcquisitionMode;

use super::{sync_texture, Action, PixelRulerApp};

impl PixelRulerApp {
    /// A toolbar button whose tooltip shows the bound hotkey.
    fn action_button(
        &mut self,
        ui: &mut egui::Ui,
        icon: &str,
        label: &str,
        hotkey: HotkeyAction,
        action: Action,
        enabled: bool,
    ) {
        let tooltip = format_button_tooltip(label, self.config.hotkeys.get(hotkey));
        let resp = ui
            .add_enabled(enabled, egui::Button::new(format!("{icon} {label}")))
            .on_hover_text(tooltip);
        if resp.clicked() {
            self.request(action);
        }
    }

    pub(super) fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                let has_image = self.session.image().is_some();
                let camera = self.session.mode() == AcquisitionMode::Camera;

                self.action_button(ui, UPLOAD_SIMPLE, "Upload image", HotkeyAction::Upload, Action::Upload, true);
                self.action_button(ui, CAMERA, "Take photo", HotkeyAction::TakePhoto, Action::TakePhoto, true);
                if camera {
                    let live = self.session.camera_name().is_some();
                    self.action_button(ui, APERTURE, "Capture", HotkeyAction::Capture, Action::Capture, live);
                }

                ui.separator();
                ui.label("Known length:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.length_input)
                        .hint_text(self.session.unit())
                        .desired_width(80.0),
                );
                self.action_button(ui, CROSSHAIR, "Calibrate", HotkeyAction::Calibrate, Action::Calibrate, has_image);
                self.action_button(ui, RULER, "Measure", HotkeyAction::Measure, Action::Measure, has_image);
                self.action_button(ui, ERASER, "Clear points", HotkeyAction::ClearPoints, Action::ClearPoints, has_image);

                ui.separator();
                self.action_button(ui, FLOPPY_DISK, "Save annotated image", HotkeyAction::SaveImage, Action::SaveImage, has_image);

                ui.separator();
                ui.label(format!(
                    "Scale: {} {}/pixel",
                    self.session.scale_factor(),
                    self.session.unit()
                ));
                if self.session.is_busy() {
                    ui.spinner();
                }
            });
        });
    }

    pub(super) fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let status = self.session.status();
            let text = RichText::new(status.to_string());
            if status.is_error() {
                ui.colored_label(Color32::from_rgb(0xeb, 0x57, 0x57), text);
            } else {
                ui.label(text);
            }
        });
    }

    /// Live camera preview (camera mode only) and the measurement history.
    pub(super) fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("side")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                if self.session.mode() == AcquisitionMode::Camera {
                    ui.heading("Camera");
                    match self.session.preview() {
                        Some((frame, revision)) => {
                            let tex = sync_texture(ctx, &mut self.preview_texture, "pixelruler-preview", frame, revision);
                            let natural = egui::vec2(frame.width() as f32, frame.height() as f32);
                            let size = super::canvas::fit_within(natural, egui::vec2(ui.available_width(), f32::INFINITY));
                            ui.image(egui::load::SizedTexture::new(tex, size));
                        }
                        None => {
                            ui.label(self.session.camera_name().map_or("Waiting for camera...", |_| "No frame yet"));
                        }
                    }
                    ui.separator();
                }

                ui.heading("Measurements");
                if self.session.history().next().is_none() {
                    ui.weak("No measurements yet.");
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (i, m) in self.session.history().enumerate().rev() {
                        ui.label(format!("#{}  {}  ({:.1} px)", i + 1, m, m.pixels));
                    }
                });
            });
    }
}
