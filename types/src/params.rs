//! Retargeting parameters.
//!
//! Every field can be supplied from a TOML file; missing fields fall back to
//! the production profile (480 s blocks, 15/45/120 block windows).

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// All tunable inputs of the multi-window retargeting function.
///
/// Construct with [`RetargetParams::default`] or deserialize, then call
/// [`RetargetParams::validate`] before handing it to an engine. The engine
/// validates again at creation, so an invalid set can never drive a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetParams {
    // ── Timing ───────────────────────────────────────────────────────────
    /// Desired seconds between blocks.
    pub target_time: u64,

    // ── Windows (in blocks) ──────────────────────────────────────────────
    /// Short LWMA window, reacts quickly.
    pub short_window: usize,

    /// Medium LWMA window.
    pub medium_window: usize,

    /// Long LWMA window, tracks the trend.
    pub long_window: usize,

    /// Emergency window. The detector averages `emergency_window + 1` samples.
    pub emergency_window: usize,

    // ── Ratio bounds ─────────────────────────────────────────────────────
    /// Smallest ratio the normal path may apply in one block.
    pub min_adjustment: f64,

    /// Largest ratio the normal path may apply in one block.
    pub max_adjustment: f64,

    /// Emergency trigger and clamp. The path fires when the recent average is
    /// below `target * threshold` or above `target / threshold`, and its
    /// ratio is clamped to `[threshold, 1 / threshold]`.
    pub emergency_threshold: f64,

    // ── Output shaping ───────────────────────────────────────────────────
    /// Exponential smoothing weight given to the freshly computed value.
    pub smoothing_alpha: f64,

    /// Floor applied after smoothing.
    pub min_difficulty: u64,

    /// Number of leading blocks held at the initial difficulty.
    pub early_protect_count: usize,

    // ── Solve-time clamp (relative to `target_time`) ─────────────────────
    /// Lower clamp factor for LWMA samples.
    pub clamp_min_factor: f64,

    /// Upper clamp factor for LWMA samples.
    pub clamp_max_factor: f64,
}

impl RetargetParams {
    /// The production profile: 480 s target, 15/45/120 windows, 5-block
    /// emergency window, `[0.5, 4.0]` ratio bounds, 10x emergency trigger.
    pub fn production() -> Self {
        Self {
            target_time: 480,
            short_window: 15,
            medium_window: 45,
            long_window: 120,
            emergency_window: 5,
            min_adjustment: 0.5,
            max_adjustment: 4.0,
            emergency_threshold: 0.1,
            smoothing_alpha: 0.3,
            min_difficulty: 10_000,
            early_protect_count: 3,
            clamp_min_factor: 0.1,
            clamp_max_factor: 10.0,
        }
    }

    /// Check every documented range. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.target_time == 0 {
            return Err(ParamsError::ZeroTargetTime);
        }

        for (name, size) in [
            ("short", self.short_window),
            ("medium", self.medium_window),
            ("long", self.long_window),
            ("emergency", self.emergency_window),
        ] {
            if size == 0 {
                return Err(ParamsError::EmptyWindow { name });
            }
        }
        if self.short_window > self.medium_window || self.medium_window > self.long_window {
            return Err(ParamsError::UnorderedWindows {
                short: self.short_window,
                medium: self.medium_window,
                long: self.long_window,
            });
        }

        // Negated comparisons so that NaN is rejected as well.
        let bounds_ok = self.min_adjustment > 0.0
            && self.min_adjustment < 1.0
            && self.max_adjustment > 1.0
            && self.max_adjustment.is_finite();
        if !bounds_ok {
            return Err(ParamsError::AdjustmentBounds {
                min: self.min_adjustment,
                max: self.max_adjustment,
            });
        }

        if !(self.emergency_threshold > 0.0 && self.emergency_threshold < 1.0) {
            return Err(ParamsError::EmergencyThreshold(self.emergency_threshold));
        }

        if !(0.0..=1.0).contains(&self.smoothing_alpha) {
            return Err(ParamsError::SmoothingAlpha(self.smoothing_alpha));
        }

        if self.min_difficulty == 0 {
            return Err(ParamsError::ZeroMinDifficulty);
        }

        let clamp_ok = self.clamp_min_factor > 0.0
            && self.clamp_min_factor <= 1.0
            && self.clamp_max_factor >= 1.0
            && self.clamp_max_factor.is_finite();
        if !clamp_ok {
            return Err(ParamsError::ClampFactors {
                min: self.clamp_min_factor,
                max: self.clamp_max_factor,
            });
        }

        Ok(())
    }

    /// Check that a chain may start at `initial` under these parameters.
    pub fn check_initial_difficulty(&self, initial: u64) -> Result<(), ParamsError> {
        if initial < self.min_difficulty {
            return Err(ParamsError::InitialBelowFloor {
                initial,
                floor: self.min_difficulty,
            });
        }
        Ok(())
    }

    /// Target time as floating seconds.
    pub fn target_secs(&self) -> f64 {
        self.target_time as f64
    }

    /// Lowest solve time an LWMA sample is allowed to contribute.
    pub fn clamp_min(&self) -> f64 {
        self.target_secs() * self.clamp_min_factor
    }

    /// Highest solve time an LWMA sample is allowed to contribute.
    pub fn clamp_max(&self) -> f64 {
        self.target_secs() * self.clamp_max_factor
    }

    /// Largest ratio the emergency path may apply.
    pub fn emergency_ceiling(&self) -> f64 {
        1.0 / self.emergency_threshold
    }
}

impl Default for RetargetParams {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_profile_is_valid() {
        assert!(RetargetParams::production().validate().is_ok());
    }

    #[test]
    fn clamp_bounds_follow_target() {
        let params = RetargetParams::production();
        assert_eq!(params.clamp_min(), 48.0);
        assert_eq!(params.clamp_max(), 4800.0);

        let fast = RetargetParams {
            target_time: 60,
            ..RetargetParams::production()
        };
        assert_eq!(fast.clamp_min(), 6.0);
        assert_eq!(fast.clamp_max(), 600.0);
    }

    #[test]
    fn emergency_ceiling_is_inverse_threshold() {
        assert_eq!(RetargetParams::production().emergency_ceiling(), 10.0);
    }

    #[test]
    fn rejects_zero_target() {
        let params = RetargetParams {
            target_time: 0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroTargetTime));
    }

    #[test]
    fn rejects_empty_window() {
        let params = RetargetParams {
            emergency_window: 0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::EmptyWindow { name: "emergency" })
        );
    }

    #[test]
    fn rejects_unordered_windows() {
        let params = RetargetParams {
            short_window: 50,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::UnorderedWindows { short: 50, .. })
        ));
    }

    #[test]
    fn equal_windows_are_allowed() {
        let params = RetargetParams {
            short_window: 30,
            medium_window: 30,
            long_window: 30,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_adjustment_bounds_touching_one() {
        let low = RetargetParams {
            min_adjustment: 1.0,
            ..Default::default()
        };
        assert!(matches!(low.validate(), Err(ParamsError::AdjustmentBounds { .. })));

        let high = RetargetParams {
            max_adjustment: 1.0,
            ..Default::default()
        };
        assert!(matches!(high.validate(), Err(ParamsError::AdjustmentBounds { .. })));

        let zero = RetargetParams {
            min_adjustment: 0.0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(ParamsError::AdjustmentBounds { .. })));
    }

    #[test]
    fn rejects_nan_everywhere() {
        let threshold = RetargetParams {
            emergency_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(threshold.validate(), Err(ParamsError::EmergencyThreshold(_))));

        let alpha = RetargetParams {
            smoothing_alpha: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(alpha.validate(), Err(ParamsError::SmoothingAlpha(_))));

        let max = RetargetParams {
            max_adjustment: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(max.validate(), Err(ParamsError::AdjustmentBounds { .. })));
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        for threshold in [0.0, 1.0, 1.5, -0.1] {
            let params = RetargetParams {
                emergency_threshold: threshold,
                ..Default::default()
            };
            assert_eq!(
                params.validate(),
                Err(ParamsError::EmergencyThreshold(threshold))
            );
        }
    }

    #[test]
    fn alpha_bounds_are_inclusive() {
        for alpha in [0.0, 1.0] {
            let params = RetargetParams {
                smoothing_alpha: alpha,
                ..Default::default()
            };
            assert!(params.validate().is_ok(), "alpha {alpha} should be accepted");
        }
    }

    #[test]
    fn rejects_zero_min_difficulty() {
        let params = RetargetParams {
            min_difficulty: 0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroMinDifficulty));
    }

    #[test]
    fn initial_difficulty_must_clear_floor() {
        let params = RetargetParams::production();
        assert!(params.check_initial_difficulty(10_000).is_ok());
        assert_eq!(
            params.check_initial_difficulty(9_999),
            Err(ParamsError::InitialBelowFloor {
                initial: 9_999,
                floor: 10_000
            })
        );
    }

    #[test]
    fn rejects_inverted_clamp_factors() {
        let params = RetargetParams {
            clamp_min_factor: 2.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(ParamsError::ClampFactors { .. })));
    }
}
