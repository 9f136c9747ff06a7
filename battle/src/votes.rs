//! Vote percentages for the two sides of a battle.

use clipclash_types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Percentage split of token-weighted votes. `left + right == 100` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSplit {
    pub left: u8,
    pub right: u8,
}

impl VoteSplit {
    /// Split `votes1` vs `votes2`.
    ///
    /// `left` is rounded half-up against a total floored at 1, and `right` is
    /// the complement, so an empty battle reads 0 / 100.
    pub fn from_votes(votes1: TokenAmount, votes2: TokenAmount) -> Self {
        let (mut a, mut b) = (votes1.raw(), votes2.raw());
        // Keep 200 * total within u128; the ratio survives the shift.
        while a.checked_add(b).map_or(true, |t| t > u128::MAX / 200) {
            a >>= 1;
            b >>= 1;
        }
        let total = (a + b).max(1);
        let left = ((a * 200 + total) / (2 * total)).min(100) as u8;
        Self {
            left,
            right: 100 - left,
        }
    }

    /// Which side leads, if either.
    pub fn leader(&self) -> Option<Side> {
        match self.left.cmp(&self.right) {
            std::cmp::Ordering::Greater => Some(Side::Left),
            std::cmp::Ordering::Less => Some(Side::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One side of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}
