//! Confidence score from recent solve-time variance.

use dmwda_utils::stats;

/// Index below which there is not enough history to judge variance.
pub const MIN_CONFIDENCE_INDEX: usize = 10;

/// Number of samples, ending at the current index, that feed the score.
pub const CONFIDENCE_SAMPLES: usize = 11;

/// Score returned when the variance cannot be judged.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Scores timing consistency as `clamp(1 - cv, 0.1, 1.0)` where `cv` is the
/// coefficient of variation of the recent solve times.
///
/// Low variance means high confidence. The genesis sentinel at index 0 is
/// never sampled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn confidence(&self, time_series: &[f64], index: usize) -> f64 {
        if index < MIN_CONFIDENCE_INDEX {
            return NEUTRAL_CONFIDENCE;
        }

        let end = (index + 1).min(time_series.len());
        let start = end.saturating_sub(CONFIDENCE_SAMPLES).max(1);
        if end <= start + 1 {
            return NEUTRAL_CONFIDENCE;
        }

        match stats::coefficient_of_variation(&time_series[start..end]) {
            Some(cv) if cv.is_finite() => (1.0 - cv).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
            _ => NEUTRAL_CONFIDENCE,
        }
    }
}
