//! Renderer Configuration
//!
//! Tunables for the update loop, particle budget, and background fill.
//! Hosts deserialize this from their own config layer; every field has a
//! sensible default so `RendererConfig::default()` is a working setup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default update cadence in Hz
const DEFAULT_UPDATE_HZ: f64 = 30.0;

/// Default grace period for stopping the update loop
const DEFAULT_STOP_GRACE_MS: u64 = 250;

/// Default particle population cap
const DEFAULT_PARTICLE_CAP: usize = 2048;

/// Renderer tunables
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Update loop cadence in Hz (fixed-interval timer)
    pub update_hz: f64,

    /// How long `stop()` waits for the loop task before aborting it
    pub stop_grace_ms: u64,

    /// Hard cap on the live particle population
    pub particle_cap: usize,

    /// Glyph used for background cells in the composited frame
    pub background_glyph: char,

    /// Particle simulation bounds in world units (width, height)
    pub sim_bounds: (f64, f64),
}

impl RendererConfig {
    /// Interval between update ticks
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_hz.max(1.0))
    }

    /// Grace period for `stop()` as a `Duration`
    #[must_use]
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            update_hz: DEFAULT_UPDATE_HZ,
            stop_grace_ms: DEFAULT_STOP_GRACE_MS,
            particle_cap: DEFAULT_PARTICLE_CAP,
            background_glyph: ' ',
            sim_bounds: (256.0, 256.0),
        }
    }
}
