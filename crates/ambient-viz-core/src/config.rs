//! Tuning constants for the visual pipeline.
//!
//! Every value is optional so a config file only needs to name what it
//! overrides; the accessors supply the reference behavior otherwise.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Decay and threshold values shared by the beat detector, theme engine,
/// effect pools and analyzer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TuningConfig {
    // Beat detection
    pub beat_history_len: Option<usize>,
    pub beat_threshold_multiplier: Option<f32>,
    pub beat_threshold_floor: Option<f32>,
    pub beat_rise_ratio: Option<f32>,
    pub beat_cooldown_frames: Option<u32>,
    pub beat_energy_decay: Option<f32>,

    // Theme easing
    pub theme_easing: Option<f32>,

    // Effect pools
    pub ring_alpha_decay: Option<f32>,
    pub particle_alpha_decay: Option<f32>,
    pub particle_size_decay: Option<f32>,
    pub particle_damping: Option<f32>,

    // Analyzer
    pub analyzer_smoothing: Option<f32>,
}

impl TuningConfig {
    pub fn beat_history_len(&self) -> usize {
        self.beat_history_len.unwrap_or(30) // ~0.5s at 60fps
    }
    pub fn beat_threshold_multiplier(&self) -> f32 {
        self.beat_threshold_multiplier.unwrap_or(1.4)
    }
    pub fn beat_threshold_floor(&self) -> f32 {
        self.beat_threshold_floor.unwrap_or(60.0)
    }
    pub fn beat_rise_ratio(&self) -> f32 {
        self.beat_rise_ratio.unwrap_or(1.2)
    }
    pub fn beat_cooldown_frames(&self) -> u32 {
        self.beat_cooldown_frames.unwrap_or(8)
    }
    pub fn beat_energy_decay(&self) -> f32 {
        self.beat_energy_decay.unwrap_or(0.92)
    }

    pub fn theme_easing(&self) -> f32 {
        self.theme_easing.unwrap_or(0.03)
    }

    pub fn ring_alpha_decay(&self) -> f32 {
        self.ring_alpha_decay.unwrap_or(0.96)
    }
    pub fn particle_alpha_decay(&self) -> f32 {
        self.particle_alpha_decay.unwrap_or(0.94)
    }
    pub fn particle_size_decay(&self) -> f32 {
        self.particle_size_decay.unwrap_or(0.97)
    }
    pub fn particle_damping(&self) -> f32 {
        self.particle_damping.unwrap_or(0.98)
    }

    pub fn analyzer_smoothing(&self) -> f32 {
        self.analyzer_smoothing.unwrap_or(0.85)
    }

    /// Rejects values that would stall or blow up the per-frame math
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beat_history_len() == 0 {
            return Err(ConfigError::EmptyHistory);
        }

        let positive = [
            ("beat_threshold_multiplier", self.beat_threshold_multiplier()),
            ("beat_rise_ratio", self.beat_rise_ratio()),
        ];
        for (field, value) in positive {
            check_finite(field, value)?;
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let floor = self.beat_threshold_floor();
        check_finite("beat_threshold_floor", floor)?;
        if floor < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "beat_threshold_floor",
                value: floor,
            });
        }

        let decays = [
            ("beat_energy_decay", self.beat_energy_decay()),
            ("theme_easing", self.theme_easing()),
            ("ring_alpha_decay", self.ring_alpha_decay()),
            ("particle_alpha_decay", self.particle_alpha_decay()),
            ("particle_size_decay", self.particle_size_decay()),
            ("particle_damping", self.particle_damping()),
        ];
        for (field, value) in decays {
            check_finite(field, value)?;
            if value <= 0.0 || value > 1.0 {
                return Err(ConfigError::DecayOutOfRange { field, value });
            }
        }

        // Zero smoothing is valid: every frame stands alone
        let smoothing = self.analyzer_smoothing();
        check_finite("analyzer_smoothing", smoothing)?;
        if !(0.0..1.0).contains(&smoothing) {
            return Err(ConfigError::SmoothingOutOfRange(smoothing));
        }

        Ok(())
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = TuningConfig::default();
        assert_eq!(config.beat_history_len(), 30);
        assert_eq!(config.beat_cooldown_frames(), 8);
        assert_eq!(config.beat_energy_decay(), 0.92);
        assert_eq!(config.theme_easing(), 0.03);
        assert_eq!(config.ring_alpha_decay(), 0.96);
        assert_eq!(config.particle_alpha_decay(), 0.94);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = TuningConfig {
            beat_history_len: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyHistory));

        let config = TuningConfig {
            ring_alpha_decay: Some(1.2),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DecayOutOfRange { field: "ring_alpha_decay", .. })
        ));

        let config = TuningConfig {
            beat_threshold_multiplier: Some(f32::NAN),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite { .. })));

        let config = TuningConfig {
            analyzer_smoothing: Some(1.0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SmoothingOutOfRange(1.0)));
    }

    #[test]
    fn test_zero_smoothing_is_accepted() {
        let config = TuningConfig {
            analyzer_smoothing: Some(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = TuningConfig {
            analyzer_smoothing: Some(-0.1),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SmoothingOutOfRange(-0.1)));
    }
}
