//! Visual moods and the easing between them.
//!
//! Each track category maps to a [`ThemePreset`]. The engine keeps the
//! rendered `current` parameters and a `target`; every frame closes a fixed
//! fraction of the remaining gap so mood changes blend over several seconds.

use tracing::{debug, warn};

use crate::config::TuningConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    Focus,
    Chill,
    Nature,
    Ambient,
    Wellness,
    Moody,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 6] = [
        ThemePreset::Focus,
        ThemePreset::Chill,
        ThemePreset::Nature,
        ThemePreset::Ambient,
        ThemePreset::Wellness,
        ThemePreset::Moody,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ThemePreset::Focus => "focus",
            ThemePreset::Chill => "chill",
            ThemePreset::Nature => "nature",
            ThemePreset::Ambient => "ambient",
            ThemePreset::Wellness => "wellness",
            ThemePreset::Moody => "moody",
        }
    }

    /// Case-insensitive lookup by category key
    pub fn from_category(category: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(category.trim()))
    }

    pub fn parameters(&self) -> ThemeParameters {
        match self {
            // Blue
            ThemePreset::Focus => ThemeParameters {
                base_hue: 210.0,
                saturation: 30.0,
                wave_count: 3.0,
                particle_count: 8.0,
                glow_intensity: 0.8,
                animation_speed: 1.0,
                background: [26.0, 28.0, 46.0],
            },
            // Warm amber
            ThemePreset::Chill => ThemeParameters {
                base_hue: 30.0,
                saturation: 40.0,
                wave_count: 5.0,
                particle_count: 16.0,
                glow_intensity: 1.2,
                animation_speed: 0.8,
                background: [35.0, 28.0, 30.0],
            },
            // Green
            ThemePreset::Nature => ThemeParameters {
                base_hue: 140.0,
                saturation: 35.0,
                wave_count: 6.0,
                particle_count: 20.0,
                glow_intensity: 0.9,
                animation_speed: 0.6,
                background: [24.0, 32.0, 30.0],
            },
            // Purple
            ThemePreset::Ambient => ThemeParameters {
                base_hue: 260.0,
                saturation: 25.0,
                wave_count: 4.0,
                particle_count: 10.0,
                glow_intensity: 1.5,
                animation_speed: 0.4,
                background: [30.0, 26.0, 40.0],
            },
            // Pink/magenta
            ThemePreset::Wellness => ThemeParameters {
                base_hue: 300.0,
                saturation: 20.0,
                wave_count: 3.0,
                particle_count: 6.0,
                glow_intensity: 1.0,
                animation_speed: 0.5,
                background: [32.0, 26.0, 35.0],
            },
            // Indigo
            ThemePreset::Moody => ThemeParameters {
                base_hue: 240.0,
                saturation: 35.0,
                wave_count: 4.0,
                particle_count: 8.0,
                glow_intensity: 0.7,
                animation_speed: 0.7,
                background: [20.0, 22.0, 35.0],
            },
        }
    }
}

/// Parameters consumed by the renderer.
///
/// Counts are stored as floats so they can ease smoothly; read them through
/// [`ThemeParameters::wave_count`] and [`ThemeParameters::particle_count`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThemeParameters {
    /// Degrees
    pub base_hue: f32,
    /// Percent
    pub saturation: f32,
    pub wave_count: f32,
    pub particle_count: f32,
    pub glow_intensity: f32,
    pub animation_speed: f32,
    /// RGB, 0-255 per channel
    pub background: [f32; 3],
}

impl ThemeParameters {
    pub fn wave_count(&self) -> usize {
        self.wave_count.round().max(0.0) as usize
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count.round().max(0.0) as usize
    }

    /// Move every field `factor` of the way toward `target`
    pub fn ease_toward(&mut self, target: &ThemeParameters, factor: f32) {
        fn ease(value: &mut f32, target: f32, factor: f32) {
            *value += (target - *value) * factor;
        }

        ease(&mut self.base_hue, target.base_hue, factor);
        ease(&mut self.saturation, target.saturation, factor);
        ease(&mut self.wave_count, target.wave_count, factor);
        ease(&mut self.particle_count, target.particle_count, factor);
        ease(&mut self.glow_intensity, target.glow_intensity, factor);
        ease(&mut self.animation_speed, target.animation_speed, factor);
        for (value, &goal) in self.background.iter_mut().zip(target.background.iter()) {
            ease(value, goal, factor);
        }
    }
}

impl Default for ThemeParameters {
    fn default() -> Self {
        ThemePreset::Focus.parameters()
    }
}

pub struct ThemeEngine {
    current: ThemeParameters,
    target: ThemeParameters,
    target_preset: ThemePreset,
    easing: f32,
}

impl ThemeEngine {
    /// Starts settled on `preset`: the only time `current` is assigned directly
    pub fn new(preset: ThemePreset, config: &TuningConfig) -> Self {
        let params = preset.parameters();
        Self {
            current: params,
            target: params,
            target_preset: preset,
            easing: config.theme_easing(),
        }
    }

    /// Retarget by category key. Unknown keys fall back to [`ThemePreset::Focus`].
    pub fn set_target(&mut self, category: &str) -> ThemePreset {
        let preset = ThemePreset::from_category(category).unwrap_or_else(|| {
            warn!("Unknown theme category '{}', using focus", category);
            ThemePreset::Focus
        });
        self.set_target_preset(preset);
        preset
    }

    pub fn set_target_preset(&mut self, preset: ThemePreset) {
        if preset != self.target_preset {
            debug!("Theme target: {} -> {}", self.target_preset.name(), preset.name());
        }
        self.target_preset = preset;
        self.target = preset.parameters();
    }

    /// Advance one frame of easing. Call exactly once per rendered frame.
    pub fn tick(&mut self) {
        self.current.ease_toward(&self.target, self.easing);
    }

    pub fn current(&self) -> &ThemeParameters {
        &self.current
    }

    pub fn target(&self) -> &ThemeParameters {
        &self.target
    }
}
