//! Track overlay drawn directly on the frame, outside the visualizer canvas.

use ambient_viz_core::IDLE_TRAIL_ALPHA;
use nannou::prelude::*;

use crate::tracks::Track;

/// Frames the overlay stays fully visible after a change (~3s at 60fps)
const HOLD_FRAMES: u32 = 180;
/// Frames spent fading out afterwards
const FADE_FRAMES: u32 = 60;

pub struct TrackHud {
    pub visible: bool,
    frames_left: u32,
}

impl TrackHud {
    pub fn new() -> Self {
        Self {
            visible: true,
            frames_left: HOLD_FRAMES + FADE_FRAMES,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.show();
        }
    }

    /// Restart the hold-and-fade cycle (track switched or play state changed)
    pub fn show(&mut self) {
        self.frames_left = HOLD_FRAMES + FADE_FRAMES;
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        self.frames_left = self.frames_left.saturating_sub(1);
    }

    pub fn alpha(&self) -> f32 {
        if !self.visible {
            return 0.0;
        }
        (self.frames_left as f32 / FADE_FRAMES as f32).min(1.0)
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect, track: &Track, playing: bool) {
        let alpha = self.alpha();
        if alpha <= 0.0 {
            return;
        }

        let state = if playing { "playing" } else { "stopped" };
        let title = format!("{} - {} BPM", track.key, track.bpm);
        let subtitle = format!("{} / {}", track.category, state);

        // The frame is never cleared, so each draw only tops up what the trail faded
        draw.text(&title)
            .x_y(0.0, bounds.bottom() + 60.0)
            .w(bounds.w())
            .color(rgba(1.0, 1.0, 1.0, deposit_alpha(alpha * 0.8, IDLE_TRAIL_ALPHA)))
            .font_size(24);
        draw.text(&subtitle)
            .x_y(0.0, bounds.bottom() + 32.0)
            .w(bounds.w())
            .color(rgba(1.0, 1.0, 1.0, deposit_alpha(alpha * 0.5, IDLE_TRAIL_ALPHA)))
            .font_size(14);
    }
}

/// Per-frame alpha that settles at `target` coverage on a frame whose
/// background fill fades by `trail` every frame
fn deposit_alpha(target: f32, trail: f32) -> f32 {
    if target <= 0.0 {
        return 0.0;
    }
    let target = target.min(1.0);
    target * trail / (1.0 - target + target * trail)
}
