//! Post-hoc metrics over simulation traces. Read-only: nothing here feeds
//! back into the engine.

use serde::{Deserialize, Serialize};

use dmwda_utils::stats;

use crate::runner::SimulationTrace;
use crate::scenario::Scenario;

/// Thresholds used by [`analyze`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Consecutive solve times differing by more than this mark a change point.
    pub change_threshold_secs: f64,
    /// Blocks after a change point searched for a difficulty response.
    pub response_window: usize,
    /// Relative difficulty move that counts as a response.
    pub response_deviation: f64,
    /// A solve time at or below `target * stealing_fraction` is suspiciously fast.
    pub stealing_fraction: f64,
    /// Trailing blocks inspected for fast solves.
    pub stealing_lookback: usize,
    /// Fast solves within the lookback that flag a block.
    pub stealing_min_fast: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            change_threshold_secs: 100.0,
            response_window: 20,
            response_deviation: 0.1,
            stealing_fraction: 0.05,
            stealing_lookback: 5,
            stealing_min_fast: 2,
        }
    }
}

/// Summary of one trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub scenario: Scenario,
    pub description: String,
    pub expected_behavior: String,
    pub blocks: usize,
    pub avg_block_time: f64,
    pub avg_difficulty: f64,
    pub difficulty_range: (u64, u64),
    pub emergency_activations: usize,
    pub stealing_suspicions: usize,
    /// 0 (erratic) to 10 (flat).
    pub stability_score: f64,
    /// Mean blocks from a change point to a visible difficulty response.
    pub response_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_at: Option<usize>,
}

/// Aggregate over every analysed scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallMetrics {
    pub scenarios: usize,
    pub average_stability_score: f64,
    pub average_response_time: f64,
    pub total_emergency_activations: usize,
    pub total_stealing_suspicions: usize,
    pub halted_scenarios: usize,
}

pub fn analyze(trace: &SimulationTrace, target_time: f64, settings: &AnalysisSettings) -> ScenarioAnalysis {
    let difficulties: Vec<f64> = trace.difficulties.iter().map(|&d| d as f64).collect();
    let min = trace.difficulties.iter().copied().min().unwrap_or(0);
    let max = trace.difficulties.iter().copied().max().unwrap_or(0);

    ScenarioAnalysis {
        scenario: trace.scenario,
        description: trace.scenario.description().to_string(),
        expected_behavior: trace.scenario.expected_behavior().to_string(),
        blocks: trace.solve_times.len(),
        avg_block_time: stats::mean(&trace.solve_times).unwrap_or(0.0),
        avg_difficulty: stats::mean(&difficulties).unwrap_or(0.0),
        difficulty_range: (min, max),
        emergency_activations: trace
            .outcomes
            .iter()
            .filter(|o| o.path.is_emergency())
            .count(),
        stealing_suspicions: stealing_suspicions(&trace.solve_times, target_time, settings),
        stability_score: stability_score(&trace.solve_times, &difficulties),
        response_time: response_time(&trace.solve_times, &trace.difficulties, settings),
        overflow_at: trace.overflow_at,
    }
}

pub fn summarize(analyses: &[ScenarioAnalysis]) -> OverallMetrics {
    let stability: Vec<f64> = analyses.iter().map(|a| a.stability_score).collect();
    let response: Vec<f64> = analyses.iter().map(|a| a.response_time).collect();
    OverallMetrics {
        scenarios: analyses.len(),
        average_stability_score: stats::mean(&stability).unwrap_or(0.0),
        average_response_time: stats::mean(&response).unwrap_or(0.0),
        total_emergency_activations: analyses.iter().map(|a| a.emergency_activations).sum(),
        total_stealing_suspicions: analyses.iter().map(|a| a.stealing_suspicions).sum(),
        halted_scenarios: analyses.iter().filter(|a| a.overflow_at.is_some()).count(),
    }
}

/// `clamp(10 - 5 * (cv(block times) + cv(difficulties)), 0, 10)`.
fn stability_score(solve_times: &[f64], difficulties: &[f64]) -> f64 {
    let cv_blocks = stats::coefficient_of_variation(solve_times).unwrap_or(0.0);
    let cv_difficulty = stats::coefficient_of_variation(difficulties).unwrap_or(0.0);
    (10.0 - 5.0 * (cv_blocks + cv_difficulty)).clamp(0.0, 10.0)
}

/// Blocks whose trailing lookback holds at least `stealing_min_fast` fast solves.
fn stealing_suspicions(solve_times: &[f64], target_time: f64, settings: &AnalysisSettings) -> usize {
    let limit = target_time * settings.stealing_fraction;
    let lookback = settings.stealing_lookback.max(1);
    (0..solve_times.len())
        .filter(|&k| {
            let start = (k + 1).saturating_sub(lookback);
            let fast = solve_times[start..=k].iter().filter(|&&t| t <= limit).count();
            fast >= settings.stealing_min_fast
        })
        .count()
}

/// Mean offset from each change point to the first difficulty that moved more
/// than `response_deviation` away from the difficulty at the change point.
///
/// Block `i` has solve time `solve_times[i - 1]` and difficulty
/// `difficulties[i]`. Change points without a response inside the window are
/// skipped; no responses at all gives 0.
fn response_time(solve_times: &[f64], difficulties: &[u64], settings: &AnalysisSettings) -> f64 {
    let mut offsets = Vec::new();
    for block in 2..=solve_times.len() {
        let jump = (solve_times[block - 1] - solve_times[block - 2]).abs();
        if jump <= settings.change_threshold_secs {
            continue;
        }
        let Some(&base) = difficulties.get(block) else {
            continue;
        };
        let end = (block + settings.response_window).min(difficulties.len());
        let threshold = base as f64 * settings.response_deviation;
        let responded = (block..end).find(|&j| difficulties[j].abs_diff(base) as f64 > threshold);
        if let Some(j) = responded {
            offsets.push((j - block) as f64);
        }
    }
    stats::mean(&offsets).unwrap_or(0.0)
}
