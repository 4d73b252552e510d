//! Foundation layer shared by every other module
//!
//! - `math`: nalgebra aliases, Euler/axis rotation helpers, normal matrices
//! - `time`: frame clock driven by window deltas, stopwatch for CPU timing
//! - `logging`: `log` macro re-exports and `env_logger` setup

pub mod math;
pub mod time;
pub mod logging;
