//! Addresses of the deployed ClipClash contracts.

use clipclash_types::Address;
use serde::{Deserialize, Serialize};

/// Where the battle contract and its payment token live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub chain_id: u64,
    /// The ClipClash battle contract (spender for token approvals).
    pub battle_contract: Address,
    /// The CLASH ERC-20 token.
    pub token: Address,
}
