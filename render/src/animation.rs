//! Animation Timing
//!
//! Frame-rate independent helpers for the animated effects: a small easing
//! set and a wrapping pulse phase used by flow gradients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Slow start
    EaseInQuad,
    /// Slow end
    EaseOutQuad,
    /// Slow start and end
    SmoothStep,
}

impl Easing {
    /// Apply to a progress value in `[0, 1]`
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A phase accumulator wrapping over a fixed period
///
/// Drives the moving-pulse illusion in flow gradients: each tick advances
/// the phase, and `offset_steps` converts it into a rotation of the
/// gradient color assignment.
#[derive(Clone, Copy, Debug)]
pub struct Pulse {
    /// Phase in `[0, 1)`
    phase: f32,
    /// Seconds for one full cycle
    period: f32,
}

impl Pulse {
    #[must_use]
    pub fn new(period_secs: f32) -> Self {
        Self {
            phase: 0.0,
            period: period_secs.max(0.05),
        }
    }

    /// Advance by elapsed time, scaled by a speed multiplier
    pub fn advance(&mut self, dt: Duration, speed: f32) {
        if speed <= 0.0 {
            return;
        }
        self.phase = (self.phase + dt.as_secs_f32() * speed / self.period).fract();
    }

    #[must_use]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Current phase as a step offset into a gradient of `steps` colors
    #[must_use]
    pub fn offset_steps(&self, steps: usize) -> usize {
        if steps == 0 {
            return 0;
        }
        ((self.phase * steps as f32) as usize).min(steps - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            Easing::Linear,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::SmoothStep,
        ] {
            assert!(easing.apply(0.0).abs() < 0.001, "{easing:?} at 0.0");
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{easing:?} at 1.0");
        }
    }

    #[test]
    fn test_easing_clamps_input() {
        assert_eq!(Easing::Linear.apply(-2.0), 0.0);
        assert_eq!(Easing::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn test_pulse_wraps() {
        let mut pulse = Pulse::new(1.0);
        pulse.advance(Duration::from_millis(1500), 1.0);
        assert!(pulse.phase() >= 0.0 && pulse.phase() < 1.0);
        assert!((pulse.phase() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_pulse_zero_speed_freezes() {
        let mut pulse = Pulse::new(1.0);
        pulse.advance(Duration::from_secs(10), 0.0);
        assert_eq!(pulse.phase(), 0.0);
    }

    #[test]
    fn test_offset_steps_in_range() {
        let mut pulse = Pulse::new(1.0);
        pulse.advance(Duration::from_millis(999), 1.0);
        assert!(pulse.offset_steps(10) < 10);
        assert_eq!(pulse.offset_steps(0), 0);
    }
}
