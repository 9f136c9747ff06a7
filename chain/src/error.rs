use clipclash_types::TxHash;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("No wallet connected")]
    NoAccount,

    #[error("chain client not available: {0}")]
    Unavailable(String),

    /// An error reported by the wallet or node; the message is kept verbatim
    /// because failure classification inspects it.
    #[error("{0}")]
    Rpc(String),

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("invalid response from gateway: {0}")]
    InvalidResponse(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },
}
