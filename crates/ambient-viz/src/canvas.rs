//! nannou implementation of the visualizer's drawing surface.

use ambient_viz_core::{Canvas, CanvasSize, Color};
use nannou::prelude::*;

/// Concentric discs used to approximate a radial gradient
const GLOW_STEPS: usize = 10;

/// Adapts a nannou [`Draw`] to the top-left-origin [`Canvas`] coordinates
pub struct NannouCanvas<'a> {
    draw: &'a Draw,
    bounds: Rect,
}

impl<'a> NannouCanvas<'a> {
    pub fn new(draw: &'a Draw, bounds: Rect) -> Self {
        Self { draw, bounds }
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.bounds.w(), self.bounds.h())
    }

    fn point(&self, x: f32, y: f32) -> Point2 {
        pt2(self.bounds.left() + x, self.bounds.top() - y)
    }
}

fn rgba_of(color: Color) -> Rgba {
    rgba(color.r, color.g, color.b, color.a)
}

impl Canvas for NannouCanvas<'_> {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let center = self.point(x + w * 0.5, y + h * 0.5);
        self.draw
            .rect()
            .xy(center)
            .w_h(w, h)
            .color(rgba_of(color));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.draw
            .ellipse()
            .xy(self.point(cx, cy))
            .radius(radius)
            .color(rgba_of(color));
    }

    fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, weight: f32, color: Color) {
        self.draw
            .ellipse()
            .xy(self.point(cx, cy))
            .radius(radius)
            .no_fill()
            .stroke(rgba_of(color))
            .stroke_weight(weight);
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        let points: Vec<Point2> = points.iter().map(|&(x, y)| self.point(x, y)).collect();
        self.draw
            .polyline()
            .weight(weight)
            .points(points)
            .color(rgba_of(color));
    }

    fn radial_glow(&mut self, cx: f32, cy: f32, radius: f32, inner: Color) {
        if radius <= 0.0 || inner.a <= 0.0 {
            return;
        }
        let center = self.point(cx, cy);
        // Outer discs first; overlapping layers build up toward the center
        let layer_alpha = inner.a / GLOW_STEPS as f32;
        for i in 0..GLOW_STEPS {
            let t = i as f32 / GLOW_STEPS as f32;
            self.draw
                .ellipse()
                .xy(center)
                .radius(radius * (1.0 - t))
                .color(rgba_of(inner.with_alpha(layer_alpha)));
        }
    }
}
