//! Per-frame logic: drain acquisition completions, read hotkeys, draw the UI
//! and apply the actions it produced.

use std::time::Duration;

use eframe::egui;

use crate::data::export;
use crate::data::hotkeys::{detect_hotkey_actions, HotkeyAction};
use crate::session::AcquisitionMode;

use super::{Action, PixelRulerApp};

/// Repaint interval while the camera preview is live.
const PREVIEW_REPAINT: Duration = Duration::from_millis(33);

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

impl From<HotkeyAction> for Action {
    fn from(a: HotkeyAction) -> Self {
        match a {
            HotkeyAction::Upload => Action::Upload,
            HotkeyAction::TakePhoto => Action::TakePhoto,
            HotkeyAction::Capture => Action::Capture,
            HotkeyAction::Calibrate => Action::Calibrate,
            HotkeyAction::Measure => Action::Measure,
            HotkeyAction::ClearPoints => Action::ClearPoints,
            HotkeyAction::SaveImage => Action::SaveImage,
        }
    }
}

impl PixelRulerApp {
    /// Feed finished background work into the session.
    fn ingest_acquisitions(&mut self) {
        for event in self.acquirer.drain() {
            // Errors are surfaced through the session status.
            let _ = self.session.apply(event);
        }
    }

    fn apply_actions(&mut self) {
        for action in std::mem::take(&mut self.pending_actions) {
            log::debug!("action {:?}", action);
            // Every failure below already updated the status line.
            match action {
                Action::Upload => {
                    let picked = rfd::FileDialog::new()
                        .add_filter("Images", IMAGE_EXTENSIONS)
                        .pick_file();
                    match picked {
                        Some(path) => {
                            let id = self.session.begin_upload();
                            self.acquirer.load_file(id, &path);
                        }
                        None => self.session.use_upload_mode(),
                    }
                }
                Action::TakePhoto => {
                    let id = self.session.use_camera_mode();
                    self.acquirer.open_camera(id, &self.config.camera);
                }
                Action::Capture => {
                    let _ = self.session.capture();
                }
                Action::Calibrate => {
                    let _ = self.session.calibrate(&self.length_input);
                }
                Action::Measure => {
                    let _ = self.session.measure();
                }
                Action::ClearPoints => self.session.clear_points(),
                Action::SaveImage => {
                    if self.session.image().is_none() {
                        continue;
                    }
                    if let Some(path) = rfd::FileDialog::new()
                        .set_file_name(export::default_file_name())
                        .add_filter("PNG", &["png"])
                        .save_file()
                    {
                        let _ = self.session.save_annotated(&path, &self.config.overlay);
                    }
                }
            }
        }
    }
}

impl eframe::App for PixelRulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ingest_acquisitions();

        if self.session.mode() == AcquisitionMode::Camera {
            self.session.poll_camera();
            ctx.request_repaint_after(PREVIEW_REPAINT);
        }

        for action in detect_hotkey_actions(&self.config.hotkeys, ctx) {
            self.request(action.into());
        }

        self.show_toolbar(ctx);
        self.show_status_bar(ctx);
        self.show_side_panel(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_canvas(ui);
        });

        self.apply_actions();
    }
}
