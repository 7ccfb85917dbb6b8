//! Reduced-Motion Support
//!
//! Users who prefer calm terminals can slow or freeze the decorative
//! animation (flow pulses, particle churn) without losing any state
//! rendering. The preference comes from the `REDUCE_MOTION` environment
//! variable:
//!
//! - `1`, `true`, `yes`, `reduced` -> `Reduced` (quarter speed)
//! - `none`, `static`, `off` -> `None` (decorative animation frozen)
//! - unset or anything else -> `Full`

use std::env;

/// User preference for motion in animated effects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionPreference {
    /// Normal animation speed
    #[default]
    Full,
    /// Quarter-speed animation
    Reduced,
    /// No decorative animation
    None,
}

impl MotionPreference {
    /// Speed multiplier applied to pulse phases and spawn cadences
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            MotionPreference::Full => 1.0,
            MotionPreference::Reduced => 0.25,
            MotionPreference::None => 0.0,
        }
    }

    /// Whether decorative animation should advance at all
    #[must_use]
    pub fn allows_animation(&self) -> bool {
        !matches!(self, MotionPreference::None)
    }
}

/// Detect the motion preference from the environment
#[must_use]
pub fn detect_motion_preference() -> MotionPreference {
    match env::var("REDUCE_MOTION") {
        Ok(value) => parse_motion_preference(&value),
        Err(_) => MotionPreference::Full,
    }
}

/// Parse a preference value; exposed for testing
#[must_use]
pub fn parse_motion_preference(value: &str) -> MotionPreference {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "reduced" => MotionPreference::Reduced,
        "none" | "static" | "off" => MotionPreference::None,
        _ => MotionPreference::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_motion_preference("1"), MotionPreference::Reduced);
        assert_eq!(parse_motion_preference("REDUCED"), MotionPreference::Reduced);
        assert_eq!(parse_motion_preference("none"), MotionPreference::None);
        assert_eq!(parse_motion_preference(" off "), MotionPreference::None);
        assert_eq!(parse_motion_preference("banana"), MotionPreference::Full);
        assert_eq!(parse_motion_preference(""), MotionPreference::Full);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(MotionPreference::Full.speed_multiplier(), 1.0);
        assert_eq!(MotionPreference::Reduced.speed_multiplier(), 0.25);
        assert_eq!(MotionPreference::None.speed_multiplier(), 0.0);
        assert!(!MotionPreference::None.allows_animation());
        assert!(MotionPreference::Reduced.allows_animation());
    }
}
