//! The battle record as stored by the ClipClash contract.
//!
//! The contract is the single source of truth; this is a read-only projection
//! of `battles(uint256)`. Derived display state lives in `clipclash-battle`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::hash::ContentHash;
use crate::time::Timestamp;

/// Contract-assigned battle identifier. Ids start at 1; `0` means "does not exist".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(u64);

impl BattleId {
    pub const NONE: Self = Self(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn exists(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BattleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One head-to-head battle between two creators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub battle_id: BattleId,
    pub creator1: Address,
    /// `Address::ZERO` until a challenger joins.
    pub creator2: Address,
    pub media_ref1: Option<ContentHash>,
    pub media_ref2: Option<ContentHash>,
    pub category: String,
    /// Stake each side pays, in raw token units.
    pub entry_fee: TokenAmount,
    pub voting_end_time: Timestamp,
    /// Token-weighted vote total for `creator1`.
    pub votes1: TokenAmount,
    /// Token-weighted vote total for `creator2`.
    pub votes2: TokenAmount,
    /// `Address::ZERO` until the battle is resolved.
    pub winner: Address,
    /// False once the contract has finalized the battle.
    pub is_active: bool,
}

impl Battle {
    /// Whether the record refers to an existing battle.
    pub fn exists(&self) -> bool {
        self.battle_id.exists()
    }

    pub fn has_challenger(&self) -> bool {
        !self.creator2.is_zero()
    }

    pub fn has_winner(&self) -> bool {
        !self.winner.is_zero()
    }

    /// Prize pool by convention: both sides' entry fees.
    pub fn prize_pool(&self) -> TokenAmount {
        self.entry_fee.saturating_mul(2)
    }

    pub fn total_votes(&self) -> TokenAmount {
        self.votes1.saturating_add(self.votes2)
    }

    /// Whether `address` is one of the two creators.
    pub fn is_creator(&self, address: &Address) -> bool {
        !address.is_zero() && (self.creator1 == *address || self.creator2 == *address)
    }
}
