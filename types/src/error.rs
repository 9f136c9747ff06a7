//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for parsing and validating ClipClash primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipClashError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("invalid content hash: {0}")]
    InvalidContentHash(String),

    #[error("{0}")]
    Other(String),
}
