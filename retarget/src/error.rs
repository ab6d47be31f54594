use dmwda_types::ParamsError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetargetError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ParamsError),

    #[error("solve time must be a positive, finite number of seconds, got {solve_time}")]
    InvalidInput { solve_time: f64 },

    #[error("difficulty {difficulty} scaled by {ratio} does not fit in 64 bits")]
    ArithmeticOverflow { difficulty: u64, ratio: f64 },
}
