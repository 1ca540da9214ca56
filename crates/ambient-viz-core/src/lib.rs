//! Audio-reactive visual synthesis for the ambient player.
//!
//! The pipeline runs once per frame: the analyzer tap produces a byte
//! spectrum, the beat detector turns its bass band into beat events, the
//! effect pools spawn rings and bursts on those beats, the theme engine eases
//! toward the selected mood, and the renderer composites everything onto a
//! [`Canvas`]. [`Visualizer`] owns all of it and the [`FrameScheduler`] decides
//! which of the active or idle loops runs.

pub mod audio;
pub mod beat;
pub mod canvas;
pub mod color;
pub mod config;
pub mod effects;
pub mod error;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod tap;
pub mod theme;

pub use audio::{FrequencySample, BASS_BINS};
pub use beat::{BeatDetector, BeatState};
pub use canvas::{Canvas, CanvasSize};
pub use color::Color;
pub use config::TuningConfig;
pub use effects::{BurstParticle, EffectPools, RingEffect};
pub use error::{ConfigError, TapError};
pub use render::{RenderMode, Renderer, IDLE_TRAIL_ALPHA};
pub use scheduler::{FrameClock, FrameScheduler, LoopMode, RequestId, SchedulerState};
pub use session::Visualizer;
pub use tap::{AnalyzerTap, MixObserver, OutputRouter, FFT_SIZE};
pub use theme::{ThemeEngine, ThemeParameters, ThemePreset};
