//! Top-level entry point for running PixelRuler as a native window.

use eframe::egui;

use crate::acquire::default_backend;
use crate::config::PixelRulerConfig;

use super::PixelRulerApp;

/// Open the PixelRuler window and block until it is closed.
pub fn run_pixelruler(mut cfg: PixelRulerConfig) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let mut opts = cfg
        .native_options
        .take()
        .unwrap_or_else(eframe::NativeOptions::default);

    if opts.viewport.icon.is_none() {
        if let Some(icon) = load_app_icon_svg() {
            opts.viewport = opts.viewport.clone().with_icon(icon);
        }
    }
    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1200.0, 800.0));
    }

    eframe::run_native(
        &title,
        opts,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            let app = PixelRulerApp::new(cfg, default_backend()).with_repaint(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}

/// Render the bundled `icon.svg` into an [`egui::IconData`].
fn load_app_icon_svg() -> Option<egui::IconData> {
    let data = include_bytes!("../../icon.svg");
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_data(data, &opt).ok()?;
    let size = tree.size().to_int_size();
    if size.width() == 0 || size.height() == 0 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    // IconData wants straight alpha.
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Some(egui::IconData {
        rgba,
        width: size.width(),
        height: size.height(),
    })
}
