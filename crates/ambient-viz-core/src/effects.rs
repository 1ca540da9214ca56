//! Beat-spawned rings and particle bursts.
//!
//! Both pools share one lifecycle: spawned on a beat, aged every active
//! frame, pruned as soon as they become invisible. Pruning keeps the pools
//! bounded without a hard cap.

use rand::Rng;
use std::f32::consts::TAU;

use crate::config::TuningConfig;

/// Radius a ring starts at
const RING_START_RADIUS: f32 = 20.0;
/// Base maximum radius, extended by the bass energy at spawn time
const RING_BASE_MAX_RADIUS: f32 = 120.0;
const RING_START_ALPHA: f32 = 0.6;
/// Per-frame growth, plus `RING_ENERGY_GROWTH * beat_energy`
const RING_BASE_GROWTH: f32 = 4.0;
const RING_ENERGY_GROWTH: f32 = 2.0;
const RING_HUE_JITTER: f32 = 20.0;

const BURST_BASE_COUNT: usize = 6;
/// One extra particle per this much bass energy
const BURST_BASS_STEP: f32 = 30.0;
/// Random angular offset (radians) on top of the even spread
const BURST_ANGLE_JITTER: f32 = 0.3;
const BURST_SPEED_MIN: f32 = 2.0;
const BURST_SPEED_MAX: f32 = 5.0;
const BURST_SIZE_MIN: f32 = 3.0;
const BURST_SIZE_MAX: f32 = 7.0;
const BURST_START_ALPHA: f32 = 0.7;
const BURST_HUE_JITTER: f32 = 30.0;

/// Below this alpha an effect is invisible and gets pruned
const MIN_ALPHA: f32 = 0.01;
/// Below this size a particle gets pruned
const MIN_SIZE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct RingEffect {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Fixed at spawn
    pub max_radius: f32,
    pub alpha: f32,
    /// Degrees
    pub hue: f32,
}

impl RingEffect {
    /// 0.0 at spawn, 1.0 at `max_radius`
    pub fn progress(&self) -> f32 {
        ((self.radius - RING_START_RADIUS) / (self.max_radius - RING_START_RADIUS)).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BurstParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub alpha: f32,
    /// Degrees
    pub hue: f32,
}

pub struct EffectPools {
    rings: Vec<RingEffect>,
    particles: Vec<BurstParticle>,
    ring_alpha_decay: f32,
    particle_alpha_decay: f32,
    particle_size_decay: f32,
    particle_damping: f32,
}

impl Default for EffectPools {
    fn default() -> Self {
        Self::new(&TuningConfig::default())
    }
}

impl EffectPools {
    pub fn new(config: &TuningConfig) -> Self {
        Self {
            rings: Vec::new(),
            particles: Vec::new(),
            ring_alpha_decay: config.ring_alpha_decay(),
            particle_alpha_decay: config.particle_alpha_decay(),
            particle_size_decay: config.particle_size_decay(),
            particle_damping: config.particle_damping(),
        }
    }

    /// Number of burst particles a beat of this bass energy produces
    pub fn burst_count(bass_energy: f32) -> usize {
        BURST_BASE_COUNT + (bass_energy.max(0.0) / BURST_BASS_STEP).floor() as usize
    }

    /// Spawn one ring and a burst of particles at (center_x, center_y)
    ///
    /// # Arguments
    /// * `bass_energy` - Bass level of the beat frame (0-255 scale)
    /// * `hue` - Theme base hue in degrees; each effect gets its own jitter
    pub fn spawn_on_beat<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        center_x: f32,
        center_y: f32,
        bass_energy: f32,
        hue: f32,
    ) {
        self.rings.push(RingEffect {
            center_x,
            center_y,
            radius: RING_START_RADIUS,
            max_radius: RING_BASE_MAX_RADIUS + bass_energy,
            alpha: RING_START_ALPHA,
            hue: hue + rng.random_range(-RING_HUE_JITTER..RING_HUE_JITTER),
        });

        let count = Self::burst_count(bass_energy);
        self.particles.reserve(count);
        for i in 0..count {
            let angle = (i as f32 / count as f32) * TAU
                + rng.random_range(-BURST_ANGLE_JITTER..BURST_ANGLE_JITTER);
            let speed = rng.random_range(BURST_SPEED_MIN..BURST_SPEED_MAX);

            self.particles.push(BurstParticle {
                x: center_x,
                y: center_y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                size: rng.random_range(BURST_SIZE_MIN..BURST_SIZE_MAX),
                alpha: BURST_START_ALPHA,
                hue: hue + rng.random_range(-BURST_HUE_JITTER..BURST_HUE_JITTER),
            });
        }
    }

    /// Age every effect by one frame and drop the ones that faded out.
    /// Called once per active frame, before drawing.
    pub fn advance_and_prune(&mut self, beat_energy: f32) {
        let growth = RING_BASE_GROWTH + RING_ENERGY_GROWTH * beat_energy;
        for ring in &mut self.rings {
            ring.radius += growth;
            ring.alpha *= self.ring_alpha_decay;
        }
        self.rings
            .retain(|r| r.radius <= r.max_radius && r.alpha >= MIN_ALPHA);

        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;
            particle.vx *= self.particle_damping;
            particle.vy *= self.particle_damping;
            particle.alpha *= self.particle_alpha_decay;
            particle.size *= self.particle_size_decay;
        }
        self.particles
            .retain(|p| p.alpha >= MIN_ALPHA && p.size >= MIN_SIZE);
    }

    /// Drop everything immediately (playback stopped)
    pub fn clear(&mut self) {
        self.rings.clear();
        self.particles.clear();
    }

    pub fn rings(&self) -> &[RingEffect] {
        &self.rings
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() && self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_at_bass_60() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pools = EffectPools::default();
        pools.spawn_on_beat(&mut rng, 400.0, 300.0, 60.0, 210.0);

        assert_eq!(pools.rings().len(), 1);
        let ring = &pools.rings()[0];
        assert_eq!(ring.max_radius, 180.0);
        assert_eq!(ring.radius, 20.0);
        assert_eq!(ring.alpha, 0.6);
        assert!((190.0..230.0).contains(&ring.hue));

        assert_eq!(pools.particles().len(), 8);
        for p in pools.particles() {
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((1.999..5.001).contains(&speed));
            assert!((3.0..7.0).contains(&p.size));
            assert!((180.0..240.0).contains(&p.hue));
            assert_eq!(p.alpha, 0.7);
            assert_eq!((p.x, p.y), (400.0, 300.0));
        }
    }

    #[test]
    fn test_burst_count_scales_with_bass() {
        assert_eq!(EffectPools::burst_count(0.0), 6);
        assert_eq!(EffectPools::burst_count(29.9), 6);
        assert_eq!(EffectPools::burst_count(60.0), 8);
        assert_eq!(EffectPools::burst_count(255.0), 14);
    }

    #[test]
    fn test_ring_grows_and_fades() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pools = EffectPools::default();
        pools.spawn_on_beat(&mut rng, 0.0, 0.0, 100.0, 0.0);

        pools.advance_and_prune(1.0);
        let ring = &pools.rings()[0];
        assert_eq!(ring.radius, 26.0);
        approx::assert_relative_eq!(ring.alpha, 0.6 * 0.96);

        pools.advance_and_prune(0.0);
        assert_eq!(pools.rings()[0].radius, 30.0);
    }

    #[test]
    fn test_particles_move_and_damp() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pools = EffectPools::default();
        pools.spawn_on_beat(&mut rng, 50.0, 50.0, 0.0, 90.0);
        let before = pools.particles()[0].clone();

        pools.advance_and_prune(0.0);
        let after = &pools.particles()[0];
        approx::assert_relative_eq!(after.x, before.x + before.vx);
        approx::assert_relative_eq!(after.vy, before.vy * 0.98);
        approx::assert_relative_eq!(after.alpha, before.alpha * 0.94);
        approx::assert_relative_eq!(after.size, before.size * 0.97);
    }

    #[test]
    fn test_pools_drain_without_beats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pools = EffectPools::default();
        for _ in 0..20 {
            pools.spawn_on_beat(&mut rng, 0.0, 0.0, 255.0, 300.0);
            pools.advance_and_prune(1.0);
        }
        assert!(!pools.is_empty());

        // Slowest ring: 20 -> 375 at 4px/frame is under 90 frames,
        // slowest particle: 0.7 * 0.94^n < 0.01 within 70 frames
        for _ in 0..100 {
            pools.advance_and_prune(0.0);
        }
        assert!(pools.is_empty());
    }

    #[test]
    fn test_pool_size_stays_bounded_under_constant_beats() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut pools = EffectPools::default();
        let mut peak = 0;
        for _ in 0..1000 {
            pools.spawn_on_beat(&mut rng, 0.0, 0.0, 255.0, 0.0);
            pools.advance_and_prune(1.0);
            peak = peak.max(pools.rings().len() + pools.particles().len());
        }
        // One ring plus 14 particles per frame, each living under 100 frames
        assert!(peak < 100 * 15);
    }

    #[test]
    fn test_clear_empties_both_pools() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pools = EffectPools::default();
        pools.spawn_on_beat(&mut rng, 0.0, 0.0, 120.0, 0.0);
        pools.clear();
        assert!(pools.rings().is_empty());
        assert!(pools.particles().is_empty());
    }
}
