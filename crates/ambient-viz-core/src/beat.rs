//! Beat detection on the bass band.
//!
//! One bass scalar arrives per frame. A beat is declared when it clears an
//! adaptive threshold derived from a rolling average, rises sharply against
//! the previous frame, and no cooldown is running. Alongside the discrete
//! event the detector keeps a beat energy that jumps to 1.0 on a beat and
//! decays exponentially, which the renderer uses for modulation.
//!
//! The history starts zero-filled, so the first second or so is lenient.

use crate::config::TuningConfig;

/// Mutable detector state, reset whenever playback stops
#[derive(Clone, Debug, PartialEq)]
pub struct BeatState {
    /// Circular buffer of recent bass values
    pub history: Vec<f32>,
    /// Next slot to write in `history`
    pub write_index: usize,
    /// Bass value of the previous frame
    pub previous_bass: f32,
    /// Decaying beat intensity (0-1)
    pub energy: f32,
    /// Frames left before another beat may fire
    pub cooldown: u32,
}

impl BeatState {
    fn new(history_len: usize) -> Self {
        Self {
            history: vec![0.0; history_len.max(1)],
            write_index: 0,
            previous_bass: 0.0,
            energy: 0.0,
            cooldown: 0,
        }
    }

    fn average(&self) -> f32 {
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }
}

pub struct BeatDetector {
    state: BeatState,
    threshold_multiplier: f32,
    threshold_floor: f32,
    rise_ratio: f32,
    cooldown_frames: u32,
    energy_decay: f32,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(&TuningConfig::default())
    }
}

impl BeatDetector {
    pub fn new(config: &TuningConfig) -> Self {
        Self {
            state: BeatState::new(config.beat_history_len()),
            threshold_multiplier: config.beat_threshold_multiplier(),
            threshold_floor: config.beat_threshold_floor(),
            rise_ratio: config.beat_rise_ratio(),
            cooldown_frames: config.beat_cooldown_frames(),
            energy_decay: config.beat_energy_decay(),
        }
    }

    /// Feed one frame of bass energy
    ///
    /// # Arguments
    /// * `bass` - Mean magnitude of the lowest spectrum bins (0-255 scale)
    ///
    /// # Returns
    /// `true` if a beat was declared this frame
    pub fn process(&mut self, bass: f32) -> bool {
        let state = &mut self.state;

        state.history[state.write_index] = bass;
        state.write_index = (state.write_index + 1) % state.history.len();

        let threshold = (state.average() * self.threshold_multiplier).max(self.threshold_floor);

        let is_beat = bass > threshold
            && bass > state.previous_bass * self.rise_ratio
            && state.cooldown == 0;

        if is_beat {
            state.cooldown = self.cooldown_frames;
            state.energy = 1.0;
        } else {
            state.cooldown = state.cooldown.saturating_sub(1);
            state.energy *= self.energy_decay;
        }

        state.previous_bass = bass;
        is_beat
    }

    /// Current beat energy (0-1)
    pub fn energy(&self) -> f32 {
        self.state.energy
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    /// Back to the zero-filled initial state
    pub fn reset(&mut self) {
        self.state = BeatState::new(self.state.history.len());
    }
}
