//! Per-block retargeting decision tree.

use crate::confidence::ConfidenceEstimator;
use crate::emergency::{EmergencyDetector, EmergencyTrigger};
use crate::error::RetargetError;
use crate::lwma::WindowAverager;
use crate::math;
use crate::state::EngineState;
use dmwda_types::{Difficulty, RetargetParams, SolveTime};
use serde::{Deserialize, Serialize};

/// Base blend weights for the (short, medium, long) averages. Each is
/// multiplied by the confidence score before normalisation.
pub const BASE_WEIGHTS: [f64; 3] = [0.4, 0.4, 0.2];

/// Which branch of the decision tree produced a difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum AdjustmentPath {
    /// Held at the initial difficulty; no smoothing or floor applied.
    EarlyProtection,
    /// Recent average crossed the emergency threshold.
    Emergency { recent_avg: f64, ratio: f64 },
    /// Confidence-weighted blend of the three window averages.
    Normal {
        blended_solve_time: f64,
        confidence: f64,
        ratio: f64,
    },
}

impl AdjustmentPath {
    /// The ratio applied to the previous difficulty, if any.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Self::EarlyProtection => None,
            Self::Emergency { ratio, .. } | Self::Normal { ratio, .. } => Some(*ratio),
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Self::Emergency { .. })
    }
}

/// Everything one step decided, for the caller and for analytics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Slot filled by this step.
    pub index: usize,
    pub solve_time: SolveTime,
    /// Difficulty at `index - 1`.
    pub previous: Difficulty,
    /// `floor(previous * ratio)`, before smoothing and the floor.
    pub unsmoothed: Difficulty,
    /// Committed difficulty at `index`.
    pub difficulty: Difficulty,
    pub path: AdjustmentPath,
}

/// The retargeting function.
///
/// Holds the validated parameters and the three sub-components built from
/// them. It is immutable and keeps no history of its own; all history lives in
/// [`EngineState`].
#[derive(Clone, Debug)]
pub struct DifficultyEngine {
    params: RetargetParams,
    averager: WindowAverager,
    confidence: ConfidenceEstimator,
    emergency: EmergencyDetector,
}

impl DifficultyEngine {
    pub fn new(params: RetargetParams) -> Result<Self, RetargetError> {
        params.validate()?;
        Ok(Self {
            averager: WindowAverager::new(&params),
            confidence: ConfidenceEstimator::new(),
            emergency: EmergencyDetector::new(&params),
            params,
        })
    }

    pub fn params(&self) -> &RetargetParams {
        &self.params
    }

    /// Build a fresh state and feed it every solve time in order.
    ///
    /// `solve_times` are the observed times for blocks 1, 2, ..; the genesis
    /// sentinel is supplied by [`EngineState::create`].
    pub fn replay(
        params: RetargetParams,
        initial_difficulty: Difficulty,
        solve_times: &[SolveTime],
    ) -> Result<(EngineState, Vec<StepOutcome>), RetargetError> {
        let mut state = EngineState::create(params, initial_difficulty)?;
        let outcomes = solve_times
            .iter()
            .map(|&t| state.step(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((state, outcomes))
    }

    /// Decide the difficulty for the newest slot of `time_series`.
    ///
    /// `time_series` already contains the new solve time at index `i`, and
    /// `difficulties` holds the committed values for `0..i`.
    pub(crate) fn next_difficulty(
        &self,
        time_series: &[f64],
        difficulties: &[u64],
        initial_difficulty: u64,
    ) -> Result<StepOutcome, RetargetError> {
        let index = difficulties.len();
        let solve_time = time_series.get(index).copied().unwrap_or(self.params.target_secs());
        let previous = difficulties.last().copied().unwrap_or(initial_difficulty);

        if index < self.params.early_protect_count {
            return Ok(StepOutcome {
                index,
                solve_time,
                previous,
                unsmoothed: initial_difficulty,
                difficulty: initial_difficulty,
                path: AdjustmentPath::EarlyProtection,
            });
        }

        let path = match self.emergency.check(time_series, index) {
            Some(EmergencyTrigger { recent_avg, ratio }) => {
                tracing::warn!(index, recent_avg, ratio, "emergency retarget");
                AdjustmentPath::Emergency { recent_avg, ratio }
            }
            None => self.blend(time_series, index),
        };

        let ratio = path.ratio().unwrap_or(1.0);
        let unsmoothed = math::scale(previous, ratio)?;
        let smoothed = math::smooth(unsmoothed, previous, self.params.smoothing_alpha)?;
        let difficulty = smoothed.max(self.params.min_difficulty);

        tracing::debug!(index, solve_time, previous, unsmoothed, difficulty, ?path, "retarget");

        Ok(StepOutcome {
            index,
            solve_time,
            previous,
            unsmoothed,
            difficulty,
            path,
        })
    }

    /// The multi-window path: three LWMAs blended by confidence-scaled weights.
    fn blend(&self, time_series: &[f64], index: usize) -> AdjustmentPath {
        let windows = [
            self.params.short_window,
            self.params.medium_window,
            self.params.long_window,
        ];
        let averages = windows.map(|w| self.averager.average(time_series, w.min(index)));

        let confidence = self.confidence.confidence(time_series, index);
        let weights = BASE_WEIGHTS.map(|w| w * confidence);

        let weight_sum: f64 = weights.iter().sum();
        let blended_solve_time = averages
            .iter()
            .zip(&weights)
            .map(|(avg, w)| avg * w)
            .sum::<f64>()
            / weight_sum;

        let ratio = (self.params.target_secs() / blended_solve_time)
            .clamp(self.params.min_adjustment, self.params.max_adjustment);

        AdjustmentPath::Normal {
            blended_solve_time,
            confidence,
            ratio,
        }
    }
}
