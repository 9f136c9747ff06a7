use clipclash_chain::ChainError;
use thiserror::Error;

use crate::classify::TxFailure;
use crate::step::WorkflowStep;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("No wallet connected")]
    NoWallet,

    #[error("chain client not available: {0}")]
    ClientUnavailable(String),

    #[error("another transaction is already in progress")]
    Busy,

    #[error("{0}")]
    Validation(String),

    #[error("transaction workflow cancelled")]
    Cancelled,

    #[error("{0}")]
    Transaction(TxFailure),

    #[error("illegal workflow transition {from} -> {to}")]
    IllegalTransition { from: WorkflowStep, to: WorkflowStep },
}

impl WorkflowError {
    /// The classified failure, for transaction errors.
    pub fn failure(&self) -> Option<&TxFailure> {
        match self {
            Self::Transaction(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<ChainError> for WorkflowError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::NoAccount => Self::NoWallet,
            ChainError::Unavailable(reason) => Self::ClientUnavailable(reason),
            reverted @ ChainError::Reverted { .. } => {
                Self::Transaction(TxFailure::reverted(reverted.to_string()))
            }
            other => Self::Transaction(TxFailure::from_message(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TxErrorKind;
    use clipclash_types::TxHash;

    #[test]
    fn chain_errors_are_classified() {
        let e = WorkflowError::from(ChainError::Rpc("User rejected the request.".into()));
        assert_eq!(e.failure().map(|f| f.kind), Some(TxErrorKind::UserRejected));

        let e = WorkflowError::from(ChainError::Reverted { tx_hash: TxHash::ZERO });
        assert_eq!(e.failure().map(|f| f.kind), Some(TxErrorKind::Reverted));

        let e = WorkflowError::from(ChainError::Rpc("execution reverted: Voting has ended".into()));
        assert_eq!(e.failure().map(|f| f.kind), Some(TxErrorKind::Unclassified));
        assert_eq!(e.to_string(), "execution reverted: Voting has ended");

        assert_eq!(WorkflowError::from(ChainError::NoAccount), WorkflowError::NoWallet);
    }
}
