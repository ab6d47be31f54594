//! Per-block difficulty retargeting.
//!
//! After each accepted block the chain appends the block's solve time and
//! receives the difficulty for the next block. The computation is a fixed
//! decision tree evaluated once per block:
//!
//! 1. Early-chain protection holds the initial difficulty for the first blocks.
//! 2. The emergency detector reacts to extreme short-term deviations with a
//!    bounded ratio, bypassing the multi-window path.
//! 3. Otherwise three linearly weighted moving averages (short, medium, long)
//!    are blended with confidence-scaled weights and turned into a bounded
//!    ratio.
//! 4. The result is exponentially smoothed against the previous difficulty
//!    and floored at the minimum difficulty.
//!
//! The engine performs no I/O and keeps no hidden state: everything lives in
//! the owned [`EngineState`], which grows by one entry per [`EngineState::step`].

pub mod confidence;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod lwma;
mod math;
pub mod state;

pub use confidence::ConfidenceEstimator;
pub use emergency::{EmergencyDetector, EmergencyTrigger};
pub use engine::{AdjustmentPath, DifficultyEngine, StepOutcome};
pub use error::RetargetError;
pub use lwma::WindowAverager;
pub use state::{EngineState, History, HistorySnapshot};

pub use dmwda_types::{Difficulty, RetargetParams, SolveTime};
