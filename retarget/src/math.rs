//! Integer-producing arithmetic with a fixed rounding rule.
//!
//! Every conversion back to a difficulty truncates toward zero (floor, since
//! all values are non-negative). Results that do not fit in `u64` are errors,
//! never saturated or wrapped.

use crate::error::RetargetError;

/// 2^64. `u64::MAX as f64` rounds to this value, so anything at or above it
/// cannot be represented.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// `floor(difficulty * ratio)`.
pub(crate) fn scale(difficulty: u64, ratio: f64) -> Result<u64, RetargetError> {
    let product = difficulty as f64 * ratio;
    if !product.is_finite() || product < 0.0 || product >= U64_LIMIT {
        return Err(RetargetError::ArithmeticOverflow { difficulty, ratio });
    }
    Ok(product as u64)
}

/// `floor(alpha * fresh + (1 - alpha) * previous)`.
///
/// Evaluated as `previous + floor(alpha * (fresh - previous))` so that only
/// the fractional blend goes through floating point. The result equals
/// `previous` whenever `fresh == previous`; otherwise it is the floor of the
/// `f64` blend, which rounds both operands once they exceed 2^53.
pub(crate) fn smooth(fresh: u64, previous: u64, alpha: f64) -> Result<u64, RetargetError> {
    let delta = (alpha * (fresh as f64 - previous as f64)).floor();
    let overflow = RetargetError::ArithmeticOverflow {
        difficulty: previous,
        ratio: alpha,
    };
    if !delta.is_finite() || delta.abs() >= U64_LIMIT {
        return Err(overflow);
    }
    let smoothed = if delta >= 0.0 {
        previous.checked_add(delta as u64)
    } else {
        previous.checked_sub((-delta) as u64)
    };
    smoothed.ok_or(overflow)
}
