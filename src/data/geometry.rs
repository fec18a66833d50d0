//! Points in image space and the mapping between the drawing surface and
//! image pixels.

use egui::{Pos2, Rect};

/// A 2D coordinate in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two image points, in pixels.
pub fn pixel_distance(p1: Point, p2: Point) -> f64 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Maps between screen positions on the drawing surface and image pixels.
///
/// The image is drawn into `rect` (screen points); `image_size` is its size
/// in pixels. Each axis uses its own uniform ratio, so a stretched render
/// still maps corners to corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    pub rect: Rect,
    pub image_size: [u32; 2],
}

impl SurfaceTransform {
    pub fn new(rect: Rect, image_size: [u32; 2]) -> Self {
        Self { rect, image_size }
    }

    /// Pixels per screen point along x and y.
    pub fn ratio(&self) -> [f64; 2] {
        let w = self.rect.width() as f64;
        let h = self.rect.height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return [1.0, 1.0];
        }
        [self.image_size[0] as f64 / w, self.image_size[1] as f64 / h]
    }

    /// Screen position to image pixel. `None` when the position lies outside
    /// the rendered image.
    pub fn to_image(&self, pos: Pos2) -> Option<Point> {
        if !self.rect.contains(pos) || self.rect.width() <= 0.0 || self.rect.height() <= 0.0 {
            return None;
        }
        let [rx, ry] = self.ratio();
        let x = (pos.x - self.rect.left()) as f64 * rx;
        let y = (pos.y - self.rect.top()) as f64 * ry;
        Some(Point::new(
            x.clamp(0.0, self.image_size[0] as f64),
            y.clamp(0.0, self.image_size[1] as f64),
        ))
    }

    /// Image pixel to screen position (used to draw the overlay).
    pub fn to_screen(&self, p: Point) -> Pos2 {
        let [rx, ry] = self.ratio();
        Pos2::new(
            self.rect.left() + (p.x / rx) as f32,
            self.rect.top() + (p.y / ry) as f32,
        )
    }

    /// Screen points per image pixel along x, used to scale marker sizes.
    pub fn zoom(&self) -> f32 {
        let [rx, _] = self.ratio();
        (1.0 / rx) as f32
    }
}
