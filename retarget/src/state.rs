//! Owned, append-only retargeting state.

use crate::engine::{DifficultyEngine, StepOutcome};
use crate::error::RetargetError;
use dmwda_types::{Difficulty, RetargetParams, SolveTime};
use serde::{Deserialize, Serialize};

/// Solve times and difficulties of one chain, index-aligned.
///
/// Index 0 is genesis: its solve time is a sentinel (the target time) that no
/// window ever reads, and its difficulty is the initial difficulty. Every
/// successful [`step`](Self::step) appends exactly one entry to each
/// sequence; a failed step leaves both untouched.
///
/// Calls for one chain must be serialized. `step` takes `&mut self`, so
/// sharing a state across threads requires the caller's own lock.
#[derive(Clone, Debug)]
pub struct EngineState {
    engine: DifficultyEngine,
    initial_difficulty: u64,
    time_series: Vec<f64>,
    difficulty_history: Vec<u64>,
}

/// Borrowed read-only view of both sequences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct History<'a> {
    pub time_series: &'a [f64],
    pub difficulty_history: &'a [u64],
}

/// Owned copy of both sequences, suitable for serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub time_series: Vec<f64>,
    pub difficulty_history: Vec<u64>,
}

impl EngineState {
    /// Start a chain at `initial_difficulty`.
    ///
    /// Fails with [`RetargetError::InvalidConfiguration`] if the parameters
    /// are out of range or the initial difficulty is below the floor.
    pub fn create(params: RetargetParams, initial_difficulty: Difficulty) -> Result<Self, RetargetError> {
        params.check_initial_difficulty(initial_difficulty)?;
        let engine = DifficultyEngine::new(params)?;
        let genesis = engine.params().target_secs();
        Ok(Self {
            engine,
            initial_difficulty,
            time_series: vec![genesis],
            difficulty_history: vec![initial_difficulty],
        })
    }

    /// Record the solve time of a newly accepted block and return the
    /// difficulty for the next one.
    pub fn step(&mut self, solve_time: SolveTime) -> Result<StepOutcome, RetargetError> {
        if !(solve_time.is_finite() && solve_time > 0.0) {
            return Err(RetargetError::InvalidInput { solve_time });
        }

        self.time_series.push(solve_time);
        let decided = self.engine.next_difficulty(
            &self.time_series,
            &self.difficulty_history,
            self.initial_difficulty,
        );
        match decided {
            Ok(outcome) => {
                self.difficulty_history.push(outcome.difficulty);
                Ok(outcome)
            }
            Err(e) => {
                self.time_series.pop();
                Err(e)
            }
        }
    }

    pub fn history(&self) -> History<'_> {
        History {
            time_series: &self.time_series,
            difficulty_history: &self.difficulty_history,
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            time_series: self.time_series.clone(),
            difficulty_history: self.difficulty_history.clone(),
        }
    }

    pub fn params(&self) -> &RetargetParams {
        self.engine.params()
    }

    pub fn initial_difficulty(&self) -> u64 {
        self.initial_difficulty
    }

    /// Difficulty the next block must meet.
    pub fn current_difficulty(&self) -> Difficulty {
        self.difficulty_history
            .last()
            .copied()
            .unwrap_or(self.initial_difficulty)
    }

    /// Number of entries, genesis included.
    pub fn len(&self) -> usize {
        self.difficulty_history.len()
    }

    /// Always false: genesis is present from creation.
    pub fn is_empty(&self) -> bool {
        self.difficulty_history.is_empty()
    }
}
