//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.ambient-viz.toml`.

use ambient_viz_core::{ConfigError, TuningConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r#"# ambient-viz configuration file

# Timeout in seconds when opening an audio device (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = false

# Last selected track (auto-saved)
# last_track = "deepfocus"

# =============================================================================
# Beat Detection
# =============================================================================

# beat_history_len = 30             # Frames of bass history (~0.5s at 60fps)
# beat_threshold_multiplier = 1.4   # Threshold = average * multiplier
# beat_threshold_floor = 60         # Threshold never drops below this (0-255)
# beat_rise_ratio = 1.2             # Bass must exceed previous frame by this ratio
# beat_cooldown_frames = 8          # Frames between beats
# beat_energy_decay = 0.92          # Per-frame beat energy decay

# =============================================================================
# Theme & Effects
# =============================================================================

# theme_easing = 0.03               # Fraction of the theme gap closed per frame
# ring_alpha_decay = 0.96
# particle_alpha_decay = 0.94
# particle_size_decay = 0.97
# particle_damping = 0.98

# =============================================================================
# Analyzer
# =============================================================================

# analyzer_smoothing = 0.85         # Spectrum smoothing between frames [0, 1)
"#;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,
    pub last_track: Option<String>,

    // Tuning (flattened for simpler TOML)
    pub beat_history_len: Option<usize>,
    pub beat_threshold_multiplier: Option<f32>,
    pub beat_threshold_floor: Option<f32>,
    pub beat_rise_ratio: Option<f32>,
    pub beat_cooldown_frames: Option<u32>,
    pub beat_energy_decay: Option<f32>,
    pub theme_easing: Option<f32>,
    pub ring_alpha_decay: Option<f32>,
    pub particle_alpha_decay: Option<f32>,
    pub particle_size_decay: Option<f32>,
    pub particle_damping: Option<f32>,
    pub analyzer_smoothing: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ambient-viz.toml"))
    }

    /// Load the config, writing a template on first run. Any error falls back
    /// to defaults with a warning.
    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => info!("Created config template at {:?}", path),
                Err(e) => warn!("Could not write config template to {:?}: {}", path, e),
            }
        }

        match Self::read(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    fn read(path: &PathBuf) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config text
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(content)?;
        config.tuning().validate()?;
        Ok(config)
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs
            .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        match toml::to_string(self) {
            Ok(content) => match fs::write(&path, content) {
                Ok(()) => info!("Config saved to {:?}", path),
                Err(e) => warn!("Could not save config to {:?}: {}", path, e),
            },
            Err(e) => warn!("Could not serialize config: {}", e),
        }
    }

    /// Persist the capture device; the file is only rewritten on a change
    pub fn set_device(&mut self, name: &str, is_input: bool) {
        if self.remember_device(name, is_input) {
            self.save();
        }
    }

    /// Record the capture device. Returns false if it was already saved.
    pub fn remember_device(&mut self, name: &str, is_input: bool) -> bool {
        if self.last_device.as_deref() == Some(name) && self.last_device_is_input == Some(is_input)
        {
            return false;
        }
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
        true
    }

    pub fn set_track(&mut self, key: &str) {
        self.last_track = Some(key.to_string());
        self.save();
    }

    /// Get tuning configuration with defaults
    pub fn tuning(&self) -> TuningConfig {
        TuningConfig {
            beat_history_len: self.beat_history_len,
            beat_threshold_multiplier: self.beat_threshold_multiplier,
            beat_threshold_floor: self.beat_threshold_floor,
            beat_rise_ratio: self.beat_rise_ratio,
            beat_cooldown_frames: self.beat_cooldown_frames,
            beat_energy_decay: self.beat_energy_decay,
            theme_easing: self.theme_easing,
            ring_alpha_decay: self.ring_alpha_decay,
            particle_alpha_decay: self.particle_alpha_decay,
            particle_size_decay: self.particle_size_decay,
            particle_damping: self.particle_damping,
            analyzer_smoothing: self.analyzer_smoothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(CONFIG_TEMPLATE).expect("template is valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.device_timeout_secs(), 3);
        assert_eq!(config.tuning(), TuningConfig::default());
    }

    #[test]
    fn test_overrides_reach_tuning() {
        let config = Config::parse(
            "last_track = \"rain\"\nbeat_cooldown_frames = 12\ntheme_easing = 0.1\n",
        )
        .expect("valid config");
        assert_eq!(config.last_track.as_deref(), Some("rain"));
        let tuning = config.tuning();
        assert_eq!(tuning.beat_cooldown_frames(), 12);
        assert_eq!(tuning.theme_easing(), 0.1);
        assert_eq!(tuning.beat_energy_decay(), 0.92);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::parse("ring_alpha_decay = 1.5"),
            Err(LoadError::Invalid(ConfigError::DecayOutOfRange { .. }))
        ));
        assert!(matches!(
            Config::parse("beat_history_len = 0"),
            Err(LoadError::Invalid(ConfigError::EmptyHistory))
        ));
        assert!(matches!(
            Config::parse("analyzer_smoothing = 1.0"),
            Err(LoadError::Invalid(ConfigError::SmoothingOutOfRange(_)))
        ));
        assert!(matches!(
            Config::parse("beat_cooldown_frames = \"soon\""),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_round_trip_keeps_saved_fields() {
        let mut config = Config::default();
        config.last_device = Some("pipewire".to_string());
        config.last_device_is_input = Some(true);
        config.last_track = Some("noir".to_string());

        let text = toml::to_string(&config).expect("serializes");
        assert_eq!(Config::parse(&text).expect("parses"), config);
    }
}
