//! Shared utilities for quadratic reward tooling.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
