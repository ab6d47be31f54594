//! Shared utilities for the DMWDA workspace.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
