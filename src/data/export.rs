//! Rendering of the annotation overlay and PNG export of an annotated image.

use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, IntSize, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::ExportError;

use super::geometry::Point;

/// Look of the point markers and the connecting line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Marker radius in image pixels.
    pub marker_radius: f32,
    /// Connecting line width in image pixels.
    pub line_width: f32,
    pub marker_rgba: [u8; 4],
    pub line_rgba: [u8; 4],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            marker_radius: 5.0,
            line_width: 1.0,
            marker_rgba: [255, 0, 0, 255],
            line_rgba: [0, 0, 255, 255],
        }
    }
}

/// Default file name offered when saving.
pub fn default_file_name() -> String {
    format!(
        "measurement_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Draw markers for `points` (and the line between them when there are two)
/// on a copy of `image`.
pub fn render_annotated(
    image: &RgbaImage,
    points: &[Point],
    style: &OverlayStyle,
) -> Result<RgbaImage, ExportError> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or(ExportError::Canvas)?;
    let premultiplied: Vec<u8> = image
        .pixels()
        .flat_map(|Rgba([r, g, b, a])| {
            let pm = |c: u8| ((c as u16 * *a as u16 + 127) / 255) as u8;
            [pm(*r), pm(*g), pm(*b), *a]
        })
        .collect();
    let mut pixmap = Pixmap::from_vec(premultiplied, size).ok_or(ExportError::Canvas)?;

    if let [p1, p2] = points {
        let mut pb = PathBuilder::new();
        pb.move_to(p1.x as f32, p1.y as f32);
        pb.line_to(p2.x as f32, p2.y as f32);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: style.line_width,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint(style.line_rgba), &stroke, Transform::identity(), None);
        }
    }
    for p in points {
        if let Some(circle) = PathBuilder::from_circle(p.x as f32, p.y as f32, style.marker_radius) {
            pixmap.fill_path(
                &circle,
                &paint(style.marker_rgba),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    let mut out = RgbaImage::new(image.width(), image.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

/// Render and write a PNG to `path`.
pub fn save_annotated(
    path: &Path,
    image: &RgbaImage,
    points: &[Point],
    style: &OverlayStyle,
) -> Result<(), ExportError> {
    let out = render_annotated(image, points, style)?;
    out.save(path).map_err(|source| ExportError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved annotated image to {:?}", path);
    Ok(())
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}
