//! Fundamental types for the DMWDA difficulty engine.
//!
//! This crate defines the parameter set shared by every other crate in the
//! workspace, together with its validation errors.

pub mod error;
pub mod params;

pub use error::ParamsError;
pub use params::RetargetParams;

/// A block difficulty value. Always a whole number after truncation.
pub type Difficulty = u64;

/// Observed seconds between two consecutive blocks.
pub type SolveTime = f64;
