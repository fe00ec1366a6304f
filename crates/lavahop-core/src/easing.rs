//! Easing curves used by scene animations.

use serde::{Deserialize, Serialize};

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    OutBounce,
}

impl EasingType {
    /// Applies the easing function to a normalized time value (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::OutBounce => ease_out_bounce(t),
        }
    }
}

/// Four-segment decaying bounce.
fn ease_out_bounce(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_functions() {
        assert!((EasingType::Linear.apply(0.5) - 0.5).abs() < 0.001);
        assert!((EasingType::EaseIn.apply(0.5) - 0.25).abs() < 0.001);
        assert!((EasingType::EaseOut.apply(0.5) - 0.75).abs() < 0.001);
        assert!((EasingType::EaseInOut.apply(0.5) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_endpoints_are_exact() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseIn,
            EasingType::EaseOut,
            EasingType::EaseInOut,
            EasingType::OutBounce,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_bounce_segments() {
        // First segment is a pure parabola reaching 1.0 at t = 1/2.75.
        assert!((EasingType::OutBounce.apply(1.0 / 2.75) - 1.0).abs() < 1e-4);
        // Each later segment dips below 1.0 and recovers.
        assert!((EasingType::OutBounce.apply(1.5 / 2.75) - 0.75).abs() < 1e-4);
        assert!((EasingType::OutBounce.apply(2.25 / 2.75) - 0.9375).abs() < 1e-4);
        assert!((EasingType::OutBounce.apply(2.625 / 2.75) - 0.984_375).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert!((EasingType::EaseOut.apply(3.0) - 1.0).abs() < 1e-6);
        assert!(EasingType::EaseIn.apply(-1.0).abs() < 1e-6);
    }
}
