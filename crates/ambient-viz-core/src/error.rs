//! Error types

use thiserror::Error;

/// Errors raised while wiring the analyzer into the audio output
#[derive(Error, Debug)]
pub enum TapError {
    #[error("Audio subsystem unavailable: {0}")]
    AudioUnavailable(String),
}

/// Errors raised when validating tuning values
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be in (0, 1], got {value}")]
    DecayOutOfRange { field: &'static str, value: f32 },

    #[error("analyzer_smoothing must be in [0, 1), got {0}")]
    SmoothingOutOfRange(f32),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("beat_history_len must be at least 1")]
    EmptyHistory,
}
