//! Drives the engine over generated scenarios.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use dmwda_retarget::{EngineState, RetargetError, RetargetParams, StepOutcome};

use crate::scenario::Scenario;
use crate::SimError;

/// Inputs and outputs of one simulated chain.
///
/// `solve_times[i]` is the solve time of block `i + 1`; `difficulties` is the
/// full difficulty history including genesis, so it is one entry longer.
///
/// Generated solve times do not react to difficulty, so a long run of fast
/// blocks compounds until the next value no longer fits in `u64`. The run
/// stops there: `overflow_at` holds the slot that could not be filled and
/// the trace keeps only the blocks before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub scenario: Scenario,
    pub solve_times: Vec<f64>,
    pub difficulties: Vec<u64>,
    pub outcomes: Vec<StepOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_at: Option<usize>,
}

/// Per-scenario seed for position `index` in a batch.
pub fn derive_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

pub fn run_scenario(
    params: &RetargetParams,
    initial_difficulty: u64,
    scenario: Scenario,
    seed: u64,
) -> Result<SimulationTrace, SimError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut solve_times = scenario.generate(params.target_secs(), &mut rng);

    let mut state = EngineState::create(params.clone(), initial_difficulty)?;
    let mut outcomes = Vec::with_capacity(solve_times.len());
    let mut overflow_at = None;
    for &solve_time in &solve_times {
        match state.step(solve_time) {
            Ok(outcome) => outcomes.push(outcome),
            Err(RetargetError::ArithmeticOverflow { difficulty, ratio }) => {
                let index = state.len();
                tracing::warn!(
                    scenario = scenario.name(),
                    index,
                    difficulty,
                    ratio,
                    "difficulty overflowed, halting scenario"
                );
                overflow_at = Some(index);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    solve_times.truncate(outcomes.len());
    let difficulties = state.history().difficulty_history.to_vec();

    let emergencies = outcomes.iter().filter(|o| o.path.is_emergency()).count();
    tracing::info!(
        scenario = scenario.name(),
        seed,
        blocks = solve_times.len(),
        emergencies,
        final_difficulty = state.current_difficulty(),
        "scenario simulated"
    );

    Ok(SimulationTrace {
        scenario,
        solve_times,
        difficulties,
        outcomes,
        overflow_at,
    })
}

/// Run every scenario in parallel. Traces come back in input order, and each
/// scenario's seed depends only on its position, so results do not depend on
/// thread scheduling.
pub fn run_all(
    params: &RetargetParams,
    initial_difficulty: u64,
    scenarios: &[Scenario],
    seed: u64,
) -> Result<Vec<SimulationTrace>, SimError> {
    params.validate().map_err(RetargetError::from)?;
    scenarios
        .par_iter()
        .enumerate()
        .map(|(i, &scenario)| run_scenario(params, initial_difficulty, scenario, derive_seed(seed, i)))
        .collect()
}
