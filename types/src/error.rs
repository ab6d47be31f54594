//! Parameter validation errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("target time must be greater than zero")]
    ZeroTargetTime,

    #[error("{name} window must be at least one block")]
    EmptyWindow { name: &'static str },

    #[error("windows must be ordered short <= medium <= long, got {short}/{medium}/{long}")]
    UnorderedWindows {
        short: usize,
        medium: usize,
        long: usize,
    },

    #[error("adjustment bounds must satisfy 0 < min < 1 < max, got [{min}, {max}]")]
    AdjustmentBounds { min: f64, max: f64 },

    #[error("emergency threshold must lie strictly between 0 and 1, got {0}")]
    EmergencyThreshold(f64),

    #[error("smoothing alpha must lie in [0, 1], got {0}")]
    SmoothingAlpha(f64),

    #[error("minimum difficulty must be greater than zero")]
    ZeroMinDifficulty,

    #[error("initial difficulty {initial} is below the minimum difficulty {floor}")]
    InitialBelowFloor { initial: u64, floor: u64 },

    #[error("solve-time clamp factors must satisfy 0 < min <= 1 <= max, got [{min}, {max}]")]
    ClampFactors { min: f64, max: f64 },
}
