//! ERC-20 token metadata, balances and contract constants.

use serde::{Deserialize, Serialize};

use crate::amount::{TokenAmount, CLASH_DECIMALS};

/// `name()`, `symbol()` and `decimals()` of the payment token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            name: "ClipClash".into(),
            symbol: "CLASH".into(),
            decimals: CLASH_DECIMALS,
        }
    }
}

/// A holder's balance together with the token it is denominated in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub raw: TokenAmount,
    pub info: TokenInfo,
}

impl TokenBalance {
    /// Balance rounded to at most two fractional digits, e.g. `"1,234.5"`.
    pub fn display(&self) -> String {
        self.raw.format_display(self.info.decimals, 2)
    }
}

/// Public constants of the ClipClash contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConstants {
    pub creator_reward_percent: u64,
    pub min_entry_fee: TokenAmount,
    pub points_per_battle: u64,
    pub points_per_vote: u64,
    pub points_per_win: u64,
    pub protocol_fee_percent: u64,
    pub voter_reward_percent: u64,
    /// Voting window in seconds.
    pub voting_duration: u64,
}
