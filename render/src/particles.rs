//! Particle System
//!
//! Bounded 2D physics simulation for the short-lived visual effects:
//! sparks on equipment failure, smoke, energy flow, falling debris. One
//! global physics profile (gravity, wind, drag) applies to every particle;
//! particles die on lifetime expiry or on leaving the simulation bounds.
//!
//! The population is hard-capped: spawning past the cap evicts the oldest
//! particles, so sustained spawning can never grow memory. `update` runs
//! in O(n) with in-place removal and no per-tick allocation.

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::palette::Rgb;

/// Kind of a spawned particle; picks glyph ramp, color, and spawn spread
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Radial burst, short-lived (equipment failure)
    Spark,
    /// Slow upward drift, long-lived
    Smoke,
    /// Directional stream
    EnergyFlow,
    /// Downward scatter
    Debris,
}

impl ParticleKind {
    /// Glyphs from freshly spawned to nearly expired
    #[must_use]
    pub fn glyph_ramp(self) -> &'static [char] {
        match self {
            Self::Spark => &['✦', '*', '+', '·'],
            Self::Smoke => &['○', '∘', '·'],
            Self::EnergyFlow => &['≈', '~', '-'],
            Self::Debris => &['▪', '∙', '.'],
        }
    }

    #[must_use]
    pub fn color(self) -> Rgb {
        match self {
            Self::Spark => Rgb::new(255, 210, 90),
            Self::Smoke => Rgb::new(150, 150, 150),
            Self::EnergyFlow => Rgb::new(90, 210, 255),
            Self::Debris => Rgb::new(200, 140, 80),
        }
    }
}

/// The single global physics profile
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsProfile {
    /// Downward acceleration in cells/s²
    pub gravity: f64,
    /// Constant acceleration (x, y) in cells/s²
    pub wind: (f64, f64),
    /// Velocity damping per second, `[0, 1]`
    pub drag: f64,
}

impl Default for PhysicsProfile {
    fn default() -> Self {
        Self {
            gravity: 1.5,
            wind: (0.0, 0.0),
            drag: 0.4,
        }
    }
}

/// One live particle
#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub kind: ParticleKind,
    /// Seconds left to live
    pub lifetime: f32,
    initial_lifetime: f32,
    pub color: Rgb,
}

impl Particle {
    /// Glyph for the current age: fades along the kind's ramp
    #[must_use]
    pub fn glyph(&self) -> char {
        let ramp = self.kind.glyph_ramp();
        let aged = (1.0 - self.lifetime / self.initial_lifetime.max(f32::EPSILON))
            .clamp(0.0, 1.0);
        let idx = ((aged * ramp.len() as f32) as usize).min(ramp.len() - 1);
        ramp[idx]
    }
}

/// Bounded particle simulation
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    /// Simulation bounds in world units; particles outside are removed
    bounds: (f64, f64),
    cap: usize,
    physics: PhysicsProfile,
    rng: StdRng,
}

impl ParticleSystem {
    #[must_use]
    pub fn new(bounds: (f64, f64), cap: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(cap.min(4096)),
            bounds,
            cap: cap.max(1),
            physics: PhysicsProfile::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests
    #[must_use]
    pub fn with_seed(bounds: (f64, f64), cap: usize, seed: u64) -> Self {
        let mut system = Self::new(bounds, cap);
        system.rng = StdRng::seed_from_u64(seed);
        system
    }

    pub fn set_physics(&mut self, physics: PhysicsProfile) {
        self.physics = physics;
    }

    #[must_use]
    pub fn physics(&self) -> PhysicsProfile {
        self.physics
    }

    /// Spawn `count` particles at a world position
    ///
    /// Velocity and lifetime are randomized per kind. At the population
    /// cap the oldest particles are evicted to make room.
    pub fn spawn(&mut self, x: f64, y: f64, kind: ParticleKind, count: usize) {
        let count = count.min(self.cap);
        let mut evicted = 0usize;
        for _ in 0..count {
            if self.particles.len() >= self.cap {
                self.particles.pop_front();
                evicted += 1;
            }
            let particle = self.spawn_one(x, y, kind);
            self.particles.push_back(particle);
        }
        if evicted > 0 {
            warn!(evicted, cap = self.cap, "particle cap reached, evicted oldest");
        }
    }

    fn spawn_one(&mut self, x: f64, y: f64, kind: ParticleKind) -> Particle {
        let rng = &mut self.rng;
        let (vx, vy, lifetime): (f64, f64, f32) = match kind {
            ParticleKind::Spark => {
                let angle = rng.gen_range(0.0..TAU);
                let speed = rng.gen_range(2.0..8.0);
                (
                    angle.cos() * speed,
                    angle.sin() * speed,
                    rng.gen_range(0.3..0.9),
                )
            }
            ParticleKind::Smoke => (
                rng.gen_range(-0.4..0.4),
                rng.gen_range(-1.6..-0.5),
                rng.gen_range(1.5..3.0),
            ),
            ParticleKind::EnergyFlow => (
                rng.gen_range(1.0..3.0),
                rng.gen_range(-0.3..0.3),
                rng.gen_range(0.8..1.6),
            ),
            ParticleKind::Debris => (
                rng.gen_range(-2.0..2.0),
                rng.gen_range(0.5..2.5),
                rng.gen_range(0.8..2.0),
            ),
        };
        Particle {
            x,
            y,
            vx,
            vy,
            kind,
            lifetime,
            initial_lifetime: lifetime,
            color: kind.color(),
        }
    }

    /// Advance the simulation by `dt`
    pub fn update(&mut self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        if dt_s <= 0.0 {
            return;
        }
        let physics = self.physics;
        let bounds = self.bounds;
        let damp = (1.0 - physics.drag * dt_s).max(0.0);

        self.particles.retain_mut(|p| {
            p.x += p.vx * dt_s;
            p.y += p.vy * dt_s;
            p.vx += physics.wind.0 * dt_s;
            p.vy += (physics.gravity + physics.wind.1) * dt_s;
            p.vx *= damp;
            p.vy *= damp;
            p.lifetime -= dt_s as f32;

            p.lifetime > 0.0
                && p.x >= 0.0
                && p.y >= 0.0
                && p.x <= bounds.0
                && p.y <= bounds.1
        });
    }

    /// Remove every particle (used on floor changes)
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Oldest-first iteration; drawing in this order makes the newest
    /// particle win overlapping cells
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
