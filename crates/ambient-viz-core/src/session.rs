//! The visualizer session: owns every component and runs one frame at a time.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::beat::{BeatDetector, BeatState};
use crate::canvas::{Canvas, CanvasSize};
use crate::config::TuningConfig;
use crate::effects::EffectPools;
use crate::render::{RenderMode, Renderer};
use crate::scheduler::{FrameClock, FrameScheduler, LoopMode, RequestId};
use crate::tap::{AnalyzerTap, OutputRouter};
use crate::theme::{ThemeEngine, ThemeParameters, ThemePreset};

/// All visual state for one canvas.
///
/// Every mutation happens on the thread driving [`Visualizer::frame`]; the
/// only state shared with the audio thread lives inside the analyzer tap.
pub struct Visualizer<C: FrameClock> {
    tap: AnalyzerTap,
    beat: BeatDetector,
    theme: ThemeEngine,
    effects: EffectPools,
    renderer: Renderer,
    scheduler: FrameScheduler<C>,
    rng: StdRng,
}

impl<C: FrameClock> Visualizer<C> {
    /// Install the analyzer on `router` and start the idle loop.
    ///
    /// A router that cannot provide audio leaves the visualizer idle-only.
    pub fn init(router: &mut dyn OutputRouter, clock: C, config: &TuningConfig) -> Self {
        Self::init_with_rng(router, clock, config, StdRng::from_os_rng())
    }

    /// As [`Visualizer::init`], with a caller-supplied RNG for reproducible effects
    pub fn init_with_rng(
        router: &mut dyn OutputRouter,
        clock: C,
        config: &TuningConfig,
        rng: StdRng,
    ) -> Self {
        let mut tap = AnalyzerTap::new(config);
        let audio_ready = tap.init(router);
        if !audio_ready {
            info!("No audio analyzer, running idle animation only");
        }

        Self {
            tap,
            beat: BeatDetector::new(config),
            theme: ThemeEngine::new(ThemePreset::Focus, config),
            effects: EffectPools::new(config),
            renderer: Renderer::new(),
            scheduler: FrameScheduler::new(clock, audio_ready),
            rng,
        }
    }

    /// Switch to audio-reactive rendering. Ignored without an analyzer.
    pub fn play(&mut self) {
        if self.scheduler.play() {
            info!("Visualizer playing");
        }
    }

    /// Back to idle; beat history and all effects are dropped
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.beat.reset();
        self.effects.clear();
        info!("Visualizer stopped");
    }

    pub fn set_visible(&mut self, visible: bool) {
        debug!("Canvas visible: {}", visible);
        self.scheduler.set_visible(visible);
    }

    /// Retarget the theme from a track category key
    pub fn set_category(&mut self, category: &str) -> ThemePreset {
        self.theme.set_target(category)
    }

    /// Frame callback for request `id`.
    ///
    /// Returns the loop that was rendered, or `None` for a superseded request.
    pub fn frame(
        &mut self,
        id: RequestId,
        canvas: &mut dyn Canvas,
        size: CanvasSize,
    ) -> Option<LoopMode> {
        let mode = self.scheduler.on_frame(id)?;
        self.theme.tick();
        let theme = *self.theme.current();

        match mode {
            LoopMode::Active => self.active_frame(canvas, size, &theme),
            LoopMode::Idle => self.renderer.render(
                canvas,
                size,
                &theme,
                RenderMode::Idle,
                &self.effects,
                &mut self.rng,
            ),
        }
        Some(mode)
    }

    fn active_frame(&mut self, canvas: &mut dyn Canvas, size: CanvasSize, theme: &ThemeParameters) {
        let Some(sample) = self.tap.sample() else {
            self.renderer
                .render(canvas, size, theme, RenderMode::Idle, &self.effects, &mut self.rng);
            return;
        };

        let bass = sample.bass_energy();
        if self.beat.process(bass) {
            let (cx, cy) = size.center();
            self.effects
                .spawn_on_beat(&mut self.rng, cx, cy, bass, theme.base_hue);
            trace!("Beat at bass {:.1}", bass);
        }
        let beat_energy = self.beat.energy();
        self.effects.advance_and_prune(beat_energy);

        self.renderer.render(
            canvas,
            size,
            theme,
            RenderMode::Active {
                sample,
                beat_energy,
            },
            &self.effects,
            &mut self.rng,
        );
    }

    /// Cancel scheduling and drop effect state. The analyzer observer stays
    /// registered with the router until the router itself is dropped.
    pub fn dispose(&mut self) {
        self.scheduler.shutdown();
        self.beat.reset();
        self.effects.clear();
        info!("Visualizer disposed");
    }

    pub fn is_audio_ready(&self) -> bool {
        self.tap.is_ready()
    }

    pub fn beat_state(&self) -> &BeatState {
        self.beat.state()
    }

    pub fn effects(&self) -> &EffectPools {
        &self.effects
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.theme
    }

    pub fn scheduler(&self) -> &FrameScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler<C> {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{DrawCommand, RecordingCanvas};
    use crate::error::TapError;
    use crate::scheduler::testing::FakeClock;
    use crate::scheduler::SchedulerState;
    use crate::tap::{MixObserver, FFT_SIZE};

    #[derive(Default)]
    struct FakeRouter {
        observer: Option<Box<dyn MixObserver>>,
        unavailable: bool,
    }

    impl FakeRouter {
        fn push(&mut self, mono: &[f32]) {
            if let Some(observer) = self.observer.as_mut() {
                observer.observe(mono);
            }
        }
    }

    impl OutputRouter for FakeRouter {
        fn tap_output(&mut self, observer: Box<dyn MixObserver>) -> Result<(), TapError> {
            if self.unavailable {
                return Err(TapError::AudioUnavailable("headless".to_string()));
            }
            self.observer = Some(observer);
            Ok(())
        }
    }

    const SIZE: CanvasSize = CanvasSize {
        width: 800.0,
        height: 600.0,
    };

    fn visualizer(router: &mut FakeRouter) -> Visualizer<FakeClock> {
        Visualizer::init_with_rng(
            router,
            FakeClock::default(),
            &TuningConfig::default(),
            StdRng::seed_from_u64(17),
        )
    }

    fn step(viz: &mut Visualizer<FakeClock>, canvas: &mut RecordingCanvas) -> Option<LoopMode> {
        let id = viz.scheduler_mut().clock_mut().fire()?;
        viz.frame(id, canvas, SIZE)
    }

    fn bass_tone() -> Vec<f32> {
        (0..FFT_SIZE)
            .map(|n| (std::f32::consts::TAU * 2.0 * n as f32 / FFT_SIZE as f32).sin())
            .collect()
    }

    #[test]
    fn test_starts_in_idle_loop() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();

        assert!(viz.is_audio_ready());
        assert_eq!(step(&mut viz, &mut canvas), Some(LoopMode::Idle));
        assert!(!canvas.commands.is_empty());
    }

    #[test]
    fn test_loud_bass_after_silence_spawns_effects() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();
        viz.play();

        for _ in 0..30 {
            assert_eq!(step(&mut viz, &mut canvas), Some(LoopMode::Active));
        }
        assert!(viz.effects().is_empty());

        router.push(&bass_tone());
        let mut fired = false;
        for _ in 0..5 {
            step(&mut viz, &mut canvas);
            fired |= viz.beat_state().energy > 0.0;
        }
        assert!(fired);
        assert!(!viz.effects().rings().is_empty());
        assert!(canvas.count(|c| matches!(c, DrawCommand::Ring { .. })) > 0);
    }

    #[test]
    fn test_stop_resets_beat_state_and_pools() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();
        viz.play();
        for _ in 0..30 {
            step(&mut viz, &mut canvas);
        }
        router.push(&bass_tone());
        for _ in 0..3 {
            step(&mut viz, &mut canvas);
        }
        assert!(!viz.effects().is_empty());

        viz.stop();
        assert!(viz.effects().is_empty());
        assert_eq!(viz.beat_state().energy, 0.0);
        assert!(viz.beat_state().history.iter().all(|&v| v == 0.0));
        assert_eq!(step(&mut viz, &mut canvas), Some(LoopMode::Idle));
    }

    #[test]
    fn test_without_audio_play_stays_idle() {
        let mut router = FakeRouter {
            unavailable: true,
            ..Default::default()
        };
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();

        viz.play();
        assert!(!viz.is_audio_ready());
        assert_eq!(viz.scheduler().state(), SchedulerState::Idle);
        assert_eq!(step(&mut viz, &mut canvas), Some(LoopMode::Idle));
    }

    #[test]
    fn test_category_change_eases_theme() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();

        assert_eq!(viz.set_category("nature"), ThemePreset::Nature);
        step(&mut viz, &mut canvas);
        let hue = viz.theme().current().base_hue;
        assert!(hue < 210.0 && hue > 140.0);
    }

    #[test]
    fn test_zero_size_canvas_keeps_scheduling() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();

        let id = viz.scheduler_mut().clock_mut().fire().expect("pending frame");
        assert_eq!(
            viz.frame(id, &mut canvas, CanvasSize::new(0.0, 0.0)),
            Some(LoopMode::Idle)
        );
        assert!(canvas.commands.is_empty());
        assert_eq!(viz.scheduler().clock().outstanding.len(), 1);
    }

    #[test]
    fn test_hidden_canvas_renders_nothing() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        let mut canvas = RecordingCanvas::default();
        viz.play();
        viz.set_visible(false);
        assert_eq!(step(&mut viz, &mut canvas), None);
        assert!(canvas.commands.is_empty());

        viz.set_visible(true);
        assert_eq!(step(&mut viz, &mut canvas), Some(LoopMode::Active));
    }

    #[test]
    fn test_dispose_stops_the_loop() {
        let mut router = FakeRouter::default();
        let mut viz = visualizer(&mut router);
        viz.dispose();
        assert!(viz.scheduler().clock().outstanding.is_empty());
        assert_eq!(viz.scheduler().state(), SchedulerState::Shutdown);
    }
}
