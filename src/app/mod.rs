//! The PixelRuler window.
//!
//! | Sub-module  | Responsibility |
//! | ----------- | -------------- |
//! | [`update`]  | Per-frame event draining, hotkeys and action dispatch |
//! | [`toolbar`] | Top toolbar, status line and measurement history |
//! | [`canvas`]  | Drawing surface: image, overlay and point picking |
//! | [`run`]     | Top-level [`run_pixelruler()`] entry point and icon loading |

mod canvas;
mod run;
mod toolbar;
mod update;

pub use run::run_pixelruler;

use std::sync::Arc;

use eframe::egui;

use crate::acquire::{Acquirer, CameraBackend};
use crate::config::PixelRulerConfig;
use crate::session::MeasurementSession;

/// A texture together with the revision of the pixels it was built from.
struct CachedTexture {
    handle: egui::TextureHandle,
    revision: u64,
}

/// User actions triggered by buttons or hotkeys. Collected during drawing
/// and applied once the frame's UI has been laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Upload,
    TakePhoto,
    Capture,
    Calibrate,
    Measure,
    ClearPoints,
    SaveImage,
}

/// Standalone application implementing [`eframe::App`].
pub struct PixelRulerApp {
    pub session: MeasurementSession,
    config: PixelRulerConfig,
    acquirer: Acquirer,
    /// Text of the "known real-world length" field.
    length_input: String,
    image_texture: Option<CachedTexture>,
    preview_texture: Option<CachedTexture>,
    pending_actions: Vec<Action>,
}

impl PixelRulerApp {
    pub fn new(config: PixelRulerConfig, camera: Arc<dyn CameraBackend>) -> Self {
        Self {
            session: MeasurementSession::new(config.session_options()),
            acquirer: Acquirer::new(camera),
            config,
            length_input: String::new(),
            image_texture: None,
            preview_texture: None,
            pending_actions: Vec::new(),
        }
    }

    /// Wake the UI whenever a background acquisition finishes.
    pub fn with_repaint(mut self, ctx: &egui::Context) -> Self {
        self.acquirer = self.acquirer.with_repaint(ctx.clone());
        self
    }

    fn request(&mut self, action: Action) {
        if !self.pending_actions.contains(&action) {
            self.pending_actions.push(action);
        }
    }
}

/// Upload `img` as a texture unless `cache` already holds this revision.
fn sync_texture(
    ctx: &egui::Context,
    cache: &mut Option<CachedTexture>,
    name: &str,
    img: &image::RgbaImage,
    revision: u64,
) -> egui::TextureId {
    if let Some(c) = cache.as_ref().filter(|c| c.revision == revision) {
        return c.handle.id();
    }
    let size = [img.width() as usize, img.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
    match cache {
        Some(c) => {
            c.handle.set(color, egui::TextureOptions::LINEAR);
            c.revision = revision;
            c.handle.id()
        }
        None => {
            let handle = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
            let id = handle.id();
            *cache = Some(CachedTexture { handle, revision });
            id
        }
    }
}
