//! Best-effort classification of transaction failures.
//!
//! Wallets, nodes and the contract report failures as free text. The
//! classifier maps known fragments to a small set of user-facing categories
//! and keeps the original message for everything else, including contract
//! revert reasons it has no category for.

use serde::Serialize;
use std::fmt;

/// User-facing failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxErrorKind {
    UserRejected,
    InsufficientFunds,
    EntryFeeTooLow,
    NotRegistered,
    AllowanceExceeded,
    Reverted,
    Unclassified,
}

// Checked in order; the first match wins. Allowance is checked before balance
// because ERC-20 revert strings share the "transfer amount exceeds" prefix.
const PATTERNS: &[(&str, TxErrorKind)] = &[
    ("user rejected", TxErrorKind::UserRejected),
    ("user denied", TxErrorKind::UserRejected),
    ("entry fee too low", TxErrorKind::EntryFeeTooLow),
    ("user not registered", TxErrorKind::NotRegistered),
    ("exceeds allowance", TxErrorKind::AllowanceExceeded),
    ("insufficient allowance", TxErrorKind::AllowanceExceeded),
    ("insufficient funds", TxErrorKind::InsufficientFunds),
    ("exceeds balance", TxErrorKind::InsufficientFunds),
];

/// Classify a raw failure message, case-insensitively.
pub fn classify(message: &str) -> TxErrorKind {
    let lower = message.to_lowercase();
    PATTERNS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|&(_, kind)| kind)
        .unwrap_or(TxErrorKind::Unclassified)
}

/// A classified transaction failure. The raw message is always kept.
///
/// `Reverted` is only produced by [`TxFailure::reverted`], for a mined
/// transaction whose receipt failed without a reason string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxFailure {
    pub kind: TxErrorKind,
    pub message: String,
}

impl TxFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(&message),
            message,
        }
    }

    /// A receipt reporting failure, with no revert reason attached.
    pub fn reverted(message: impl Into<String>) -> Self {
        Self {
            kind: TxErrorKind::Reverted,
            message: message.into(),
        }
    }

    /// Short text for a status notice.
    pub fn user_message(&self) -> String {
        let text = match self.kind {
            TxErrorKind::UserRejected => "Transaction was rejected in your wallet",
            TxErrorKind::InsufficientFunds => "Insufficient CLASH balance",
            TxErrorKind::EntryFeeTooLow => "Entry fee is below the contract minimum",
            TxErrorKind::NotRegistered => "Register a username before battling",
            TxErrorKind::AllowanceExceeded => "Token approval is too low for this transaction",
            TxErrorKind::Reverted => "Transaction reverted",
            TxErrorKind::Unclassified => return self.message.clone(),
        };
        text.to_string()
    }
}

impl fmt::Display for TxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}
