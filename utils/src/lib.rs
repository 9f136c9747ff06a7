//! Shared utilities for the ClipClash client.

pub mod logging;
pub mod stats;

pub use logging::{init_tracing, LogFormat};
pub use stats::StatsCounter;
