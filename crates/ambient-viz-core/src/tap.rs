//! Frequency analyzer tap on the audio output.
//!
//! The tap never touches the audible signal. It hands a [`MixObserver`] to an
//! [`OutputRouter`], which feeds it every block of the mixed output on its own
//! thread. The observer only appends to a shared ring buffer; the FFT runs when
//! the frame loop pulls a [`FrequencySample`].
//!
//! Magnitudes follow the usual byte-analyser convention: Blackman window,
//! exponential smoothing between frames, then decibels mapped linearly from
//! `MIN_DECIBELS..MAX_DECIBELS` onto 0-255.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::audio::FrequencySample;
use crate::config::TuningConfig;
use crate::error::TapError;

/// FFT size; yields `FFT_SIZE / 2` frequency bins
pub const FFT_SIZE: usize = 256;

pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

/// Receives mono blocks of the mixed output. Runs on the audio thread, so
/// implementations must not block for long.
pub trait MixObserver: Send {
    fn observe(&mut self, mono: &[f32]);
}

/// Capability to observe everything bound for the output device, including
/// producers that start after the tap was installed
pub trait OutputRouter {
    fn tap_output(&mut self, observer: Box<dyn MixObserver>) -> Result<(), TapError>;
}

type PcmBuffer = Arc<Mutex<VecDeque<f32>>>;

/// Observer half of the tap: keeps the most recent `FFT_SIZE` samples
struct PcmCollector {
    buffer: PcmBuffer,
}

impl MixObserver for PcmCollector {
    fn observe(&mut self, mono: &[f32]) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        for &sample in mono {
            if buffer.len() == FFT_SIZE {
                buffer.pop_front();
            }
            buffer.push_back(sample);
        }
    }
}

pub struct AnalyzerTap {
    pcm: PcmBuffer,
    installed: bool,

    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,

    smoothing: f32,
    smoothed: Vec<f32>,
    sample: FrequencySample,
}

impl AnalyzerTap {
    pub fn new(config: &TuningConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Blackman window (alpha = 0.16)
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let phase = std::f32::consts::TAU * i as f32 / FFT_SIZE as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();

        Self {
            pcm: Arc::new(Mutex::new(VecDeque::with_capacity(FFT_SIZE))),
            installed: false,
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            window,
            smoothing: config.analyzer_smoothing(),
            smoothed: vec![0.0; FFT_SIZE / 2],
            sample: FrequencySample::silent(FFT_SIZE / 2),
        }
    }

    /// Install the tap on `router`. Safe to call repeatedly: once installed,
    /// later calls return `true` without touching the router.
    ///
    /// # Returns
    /// `false` when the audio subsystem is unavailable; the tap then stays
    /// dormant and [`AnalyzerTap::sample`] keeps returning `None`.
    pub fn init(&mut self, router: &mut dyn OutputRouter) -> bool {
        if self.installed {
            debug!("Analyzer tap already installed");
            return true;
        }

        let observer = PcmCollector {
            buffer: Arc::clone(&self.pcm),
        };
        match router.tap_output(Box::new(observer)) {
            Ok(()) => {
                info!("Analyzer tap installed ({} bins)", FFT_SIZE / 2);
                self.installed = true;
            }
            Err(e) => {
                warn!("Analyzer tap not installed: {}", e);
            }
        }
        self.installed
    }

    pub fn is_ready(&self) -> bool {
        self.installed
    }

    /// Analyze the latest captured audio. Call once per active frame.
    pub fn sample(&mut self) -> Option<&FrequencySample> {
        if !self.installed {
            return None;
        }

        let mut block = [0.0f32; FFT_SIZE];
        {
            let pcm = self.pcm.lock().unwrap_or_else(PoisonError::into_inner);
            // Right-align so a partially filled buffer reads as leading silence
            let offset = FFT_SIZE - pcm.len();
            for (slot, &s) in block[offset..].iter_mut().zip(pcm.iter()) {
                *slot = s;
            }
        }

        Some(self.analyze_block(&block))
    }

    /// Run one analysis step on a block of mono samples (zero-padded or
    /// truncated to `FFT_SIZE`)
    pub fn analyze_block(&mut self, samples: &[f32]) -> &FrequencySample {
        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let s = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let range = MAX_DECIBELS - MIN_DECIBELS;
        let bins = self.sample.bins_mut();
        for (k, byte) in bins.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() / FFT_SIZE as f32;
            let smoothed = self.smoothing * self.smoothed[k] + (1.0 - self.smoothing) * magnitude;
            self.smoothed[k] = smoothed;

            let db = 20.0 * smoothed.max(1e-12).log10();
            *byte = (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8;
        }

        &self.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Router that keeps the observer so tests can push audio into it
    #[derive(Default)]
    struct FakeRouter {
        observer: Option<Box<dyn MixObserver>>,
        calls: usize,
        unavailable: bool,
    }

    impl OutputRouter for FakeRouter {
        fn tap_output(&mut self, observer: Box<dyn MixObserver>) -> Result<(), TapError> {
            self.calls += 1;
            if self.unavailable {
                return Err(TapError::AudioUnavailable("no device".to_string()));
            }
            self.observer = Some(observer);
            Ok(())
        }
    }

    fn tone(bin: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (std::f32::consts::TAU * bin as f32 * n as f32 / FFT_SIZE as f32).sin())
            .collect()
    }

    #[test]
    fn test_sample_is_none_until_installed() {
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        assert!(!tap.is_ready());
        assert!(tap.sample().is_none());
    }

    #[test]
    fn test_unavailable_audio_leaves_tap_dormant() {
        let mut router = FakeRouter {
            unavailable: true,
            ..Default::default()
        };
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        assert!(!tap.init(&mut router));
        assert!(!tap.is_ready());
        assert!(tap.sample().is_none());
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut router = FakeRouter::default();
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        assert!(tap.init(&mut router));
        assert!(tap.init(&mut router));
        assert_eq!(router.calls, 1);
    }

    #[test]
    fn test_silence_reads_as_zero() {
        let mut router = FakeRouter::default();
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        tap.init(&mut router);

        let sample = tap.sample().expect("tap installed");
        assert_eq!(sample.len(), FFT_SIZE / 2);
        assert!(sample.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_lights_up_its_bin() {
        let mut router = FakeRouter::default();
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        tap.init(&mut router);

        router
            .observer
            .as_mut()
            .expect("observer registered")
            .observe(&tone(4, FFT_SIZE * 2));

        let mut last = FrequencySample::default();
        for _ in 0..20 {
            last = tap.sample().expect("tap installed").clone();
        }
        assert_eq!(last.get(4), 255);
        assert!(last.bass_energy() > 60.0);
        assert_eq!(last.get(60), 0);
    }

    #[test]
    fn test_smoothing_ramps_up() {
        let mut tap = AnalyzerTap::new(&TuningConfig::default());
        let block = tone(20, FFT_SIZE);

        let first = tap.analyze_block(&block).get(21);
        let mut later = first;
        for _ in 0..30 {
            later = tap.analyze_block(&block).get(21);
        }
        assert!(later > first);
    }
}
