//! Frame compositing.
//!
//! Every frame is painted in a fixed layer order: a translucent background
//! fill (older frames show through as motion trails), expanding rings, burst
//! particles, flowing waves, floating particles, the central glow and, for
//! bright highs, sparkles. The idle mode draws the same scene without any
//! audio input so the canvas keeps breathing while playback is stopped.

use rand::Rng;

use crate::audio::FrequencySample;
use crate::canvas::{Canvas, CanvasSize};
use crate::color::Color;
use crate::effects::EffectPools;
use crate::theme::ThemeParameters;

/// Per-frame time step at `animation_speed` 1.0
const TIME_STEP: f32 = 0.008;

const ACTIVE_TRAIL_ALPHA: f32 = 0.08;
/// Idle background fill, the faintest trail the renderer paints
pub const IDLE_TRAIL_ALPHA: f32 = 0.06;

const WAVE_X_STEP: f32 = 3.0;
const WAVE_LINE_WIDTH: f32 = 1.5;

const SPARKLE_THRESHOLD: f32 = 50.0;
const SPARKLE_MAX: usize = 40;

/// What the renderer draws from this frame
#[derive(Clone, Copy, Debug)]
pub enum RenderMode<'a> {
    Active {
        sample: &'a FrequencySample,
        beat_energy: f32,
    },
    Idle,
}

/// Band levels for one active frame
#[derive(Clone, Copy, Debug, Default)]
struct Levels {
    bass: f32,
    high: f32,
    beat: f32,
}

/// Stateful compositor; owns only the animation clock
#[derive(Debug, Default)]
pub struct Renderer {
    time: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation time, advanced once per rendered frame
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Draw one frame. An empty surface draws nothing and leaves the clock alone.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        canvas: &mut dyn Canvas,
        size: CanvasSize,
        theme: &ThemeParameters,
        mode: RenderMode<'_>,
        pools: &EffectPools,
        rng: &mut R,
    ) {
        if size.is_empty() {
            return;
        }

        self.time += TIME_STEP * theme.animation_speed;

        match mode {
            RenderMode::Active {
                sample,
                beat_energy,
            } => {
                let levels = Levels {
                    bass: sample.bass_energy(),
                    high: sample.high_energy(),
                    beat: beat_energy,
                };

                let trail = (ACTIVE_TRAIL_ALPHA + levels.beat * 0.04).min(0.2);
                self.draw_background(canvas, size, theme, trail);
                Self::draw_rings(canvas, theme, pools);
                Self::draw_burst_particles(canvas, theme, pools);
                self.draw_waves(canvas, size, theme, Some(levels));
                self.draw_spectrum_particles(canvas, size, theme, sample, levels.beat);
                Self::draw_active_glow(canvas, size, theme, levels);
                if levels.high > SPARKLE_THRESHOLD {
                    Self::draw_sparkles(canvas, size, theme, levels.high, rng);
                }
            }
            RenderMode::Idle => {
                self.draw_background(canvas, size, theme, IDLE_TRAIL_ALPHA);
                self.draw_waves(canvas, size, theme, None);
                self.draw_idle_particles(canvas, size, theme);
                self.draw_idle_glow(canvas, size, theme);
            }
        }
    }

    fn draw_background(
        &self,
        canvas: &mut dyn Canvas,
        size: CanvasSize,
        theme: &ThemeParameters,
        alpha: f32,
    ) {
        canvas.fill_rect(
            0.0,
            0.0,
            size.width,
            size.height,
            Color::from_rgb255(theme.background, alpha),
        );
    }

    fn draw_rings(canvas: &mut dyn Canvas, theme: &ThemeParameters, pools: &EffectPools) {
        for ring in pools.rings() {
            let progress = ring.progress();
            let alpha = (ring.alpha * (1.0 - progress * 0.5)).min(0.6);
            let weight = 1.0 + 3.0 * (1.0 - progress);
            canvas.stroke_circle(
                ring.center_x,
                ring.center_y,
                ring.radius,
                weight,
                Color::hsla(ring.hue, theme.saturation + 20.0, 65.0, alpha),
            );
        }
    }

    fn draw_burst_particles(canvas: &mut dyn Canvas, theme: &ThemeParameters, pools: &EffectPools) {
        for p in pools.particles() {
            canvas.fill_circle(
                p.x,
                p.y,
                p.size,
                Color::hsla(p.hue, theme.saturation + 30.0, 70.0, p.alpha.min(0.6)),
            );
        }
    }

    /// Layered sine waves; `levels` is `None` in idle mode
    fn draw_waves(
        &self,
        canvas: &mut dyn Canvas,
        size: CanvasSize,
        theme: &ThemeParameters,
        levels: Option<Levels>,
    ) {
        let count = theme.wave_count();
        let (bass, beat) = levels.map_or((0.0, 0.0), |l| (l.bass, l.beat));
        let steps = (size.width / WAVE_X_STEP).floor() as usize;
        let mut points = Vec::with_capacity(steps + 2);

        for w in 0..count {
            let wf = w as f32;
            let base_y = size.height * (wf + 1.0) / (count as f32 + 1.0);
            let mut amplitude = 15.0 + wf * 5.0;
            if levels.is_some() {
                amplitude += bass / 20.0 + beat * 25.0;
            }
            let frequency = 0.008 + wf * 0.002;
            let speed = self.time * (0.5 + wf * 0.2);

            points.clear();
            for step in 0..=steps {
                let x = step as f32 * WAVE_X_STEP;
                let y = base_y
                    + (x * frequency + speed + wf).sin() * amplitude
                    + (x * frequency * 2.0 + speed * 1.5).sin() * amplitude * 0.3;
                points.push((x, y));
            }

            let alpha = ((0.15 - wf * 0.02).max(0.04) + beat * 0.15).min(0.4);
            let hue = theme.base_hue + wf * 20.0 + beat * 15.0;
            canvas.stroke_polyline(
                &points,
                WAVE_LINE_WIDTH,
                Color::hsla(hue, theme.saturation, 60.0, alpha),
            );
        }
    }

    /// Position of floating particle `i` on its Lissajous-like orbit
    fn orbit(&self, size: CanvasSize, i: usize) -> (f32, f32) {
        let i = i as f32;
        let x = ((self.time * 0.3 + i * 0.8).sin() * 0.4 + 0.5) * size.width;
        let y = ((self.time * 0.2 + i * 0.6).cos() * 0.3 + 0.5) * size.height;
        (x, y)
    }

    fn draw_spectrum_particles(
        &self,
        canvas: &mut dyn Canvas,
        size: CanvasSize,
        theme: &ThemeParameters,
        sample: &FrequencySample,
        beat: f32,
    ) {
        let count = theme.particle_count();
        for i in 0..count {
            let bin = (i as f32 / count as f32 * sample.len() as f32).floor() as usize;
            let value = f32::from(sample.get(bin));
            // Quiet bins stay invisible
            if value <= 30.0 {
                continue;
            }

            let (x, y) = self.orbit(size, i);
            let radius = 2.0 + value / 100.0 + beat * 2.0;
            let alpha = (0.2 + value / 500.0 + beat * 0.2).min(0.6);
            let hue = theme.base_hue + 10.0 + i as f32 * 10.0;
            canvas.fill_circle(x, y, radius, Color::hsla(hue, theme.saturation + 10.0, 70.0, alpha));
        }
    }

    fn draw_idle_particles(&self, canvas: &mut dyn Canvas, size: CanvasSize, theme: &ThemeParameters) {
        for i in 0..theme.particle_count() {
            let (x, y) = self.orbit(size, i);
            let pulse = (self.time * 2.0 + i as f32).sin() * 0.5 + 0.5;
            let hue = theme.base_hue + 10.0 + i as f32 * 10.0;
            canvas.fill_circle(
                x,
                y,
                2.0 + pulse * 1.5,
                Color::hsla(hue, theme.saturation + 10.0, 70.0, 0.15 + pulse * 0.15),
            );
        }
    }

    fn draw_active_glow(canvas: &mut dyn Canvas, size: CanvasSize, theme: &ThemeParameters, levels: Levels) {
        let (cx, cy) = size.center();
        let radius = (40.0 + levels.bass / 4.0 + levels.beat * 30.0) * theme.glow_intensity;
        let alpha = ((0.1 + levels.bass / 1000.0 + levels.beat * 0.15) * theme.glow_intensity).min(0.5);
        canvas.radial_glow(
            cx,
            cy,
            radius,
            Color::hsla(theme.base_hue, theme.saturation + 10.0, 60.0, alpha),
        );
    }

    fn draw_idle_glow(&self, canvas: &mut dyn Canvas, size: CanvasSize, theme: &ThemeParameters) {
        let (cx, cy) = size.center();
        let pulse = (self.time * 0.5).sin();
        let radius = (40.0 + pulse * 15.0) * theme.glow_intensity;
        let alpha = (0.05 + pulse * 0.03) * theme.glow_intensity;
        canvas.radial_glow(
            cx,
            cy,
            radius,
            Color::hsla(theme.base_hue, theme.saturation + 10.0, 60.0, alpha),
        );
    }

    fn draw_sparkles<R: Rng + ?Sized>(
        canvas: &mut dyn Canvas,
        size: CanvasSize,
        theme: &ThemeParameters,
        high: f32,
        rng: &mut R,
    ) {
        let count = (((high - SPARKLE_THRESHOLD) / 5.0).ceil() as usize).min(SPARKLE_MAX);
        let alpha = (0.3 + high / 500.0).min(0.6);
        for _ in 0..count {
            let x = rng.random_range(0.0..size.width);
            let y = rng.random_range(0.0..size.height);
            let radius = rng.random_range(0.5..1.5);
            let hue = theme.base_hue + rng.random_range(-40.0..40.0);
            canvas.fill_circle(x, y, radius, Color::hsla(hue, theme.saturation, 85.0, alpha));
        }
    }
}
