//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, chain) are abstracted behind traits or plain
//! values. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap [`NullChain`] in wherever a `ChainClient` is expected.

pub mod chain;
pub mod clock;

pub use chain::{ChainCall, NullChain, NullOp, DEFAULT_ACCOUNT};
pub use clock::NullClock;
