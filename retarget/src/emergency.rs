//! Emergency detection for extreme short-term deviations.
//!
//! One symmetric test covers both directions: a hash-rate surge (or a burst of
//! rapid-fire blocks) pulls the recent average below `target * threshold`, a
//! hash-rate collapse pushes it above `target / threshold`. There is no
//! separate rule for consecutive fast blocks. A fast run only counts once it
//! drags the recent average past the threshold.

use dmwda_types::RetargetParams;
use dmwda_utils::stats;
use serde::{Deserialize, Serialize};

/// A fired emergency: the unclamped recent average and the bounded ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergencyTrigger {
    pub recent_avg: f64,
    pub ratio: f64,
}

#[derive(Clone, Debug)]
pub struct EmergencyDetector {
    target: f64,
    window: usize,
    threshold: f64,
    ceiling: f64,
}

impl EmergencyDetector {
    pub fn new(params: &RetargetParams) -> Self {
        Self {
            target: params.target_secs(),
            window: params.emergency_window,
            threshold: params.emergency_threshold,
            ceiling: params.emergency_ceiling(),
        }
    }

    /// Check the `emergency_window + 1` samples ending at `index`.
    ///
    /// Samples are averaged as-is, without the LWMA clamp. Returns `None`
    /// when the average stays inside `[target * threshold, target / threshold]`.
    pub fn check(&self, time_series: &[f64], index: usize) -> Option<EmergencyTrigger> {
        let end = (index + 1).min(time_series.len());
        let start = end.saturating_sub(self.window + 1).max(1);
        if start >= end {
            return None;
        }

        let recent_avg = stats::mean(&time_series[start..end])?;
        let too_fast = recent_avg < self.target * self.threshold;
        let too_slow = recent_avg > self.target / self.threshold;
        if !(too_fast || too_slow) {
            return None;
        }

        let ratio = (self.target / recent_avg).clamp(self.threshold, self.ceiling);
        Some(EmergencyTrigger { recent_avg, ratio })
    }
}
