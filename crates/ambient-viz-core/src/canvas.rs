//! Drawing surface used by the renderer.
//!
//! Coordinates follow the 2D canvas convention: origin at the top-left
//! corner, y growing downward, units in logical pixels. Hosts translate to
//! their own coordinate system inside the implementation.

use crate::color::Color;

/// Pixel dimensions of the drawing surface, re-read every frame
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True while the surface cannot be drawn on (zero, negative or NaN)
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

/// Immediate-mode drawing operations the renderer needs
pub trait Canvas {
    /// Fill an axis-aligned rectangle (x, y is the top-left corner)
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    /// Fill a disc
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);

    /// Stroke a circle outline
    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, weight: f32, color: Color);

    /// Stroke connected line segments
    fn stroke_polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Color);

    /// Disc filled with a radial gradient from `inner` at the center to fully
    /// transparent at `radius`
    fn radial_glow(&mut self, cx: f32, cy: f32, radius: f32, inner: Color);
}
