//! Mined transaction receipts.

use clipclash_types::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// A log emitted during transaction execution.
///
/// Topics and data stay hex-encoded as delivered; decoding is best-effort and
/// happens only when a caller looks for a specific event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// The result of a transaction once included in a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` when execution reverted.
    pub success: bool,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl TxReceipt {
    /// Logs emitted by `contract`, in order.
    pub fn logs_from<'a>(&'a self, contract: &'a Address) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.logs.iter().filter(move |log| log.address == *contract)
    }
}
