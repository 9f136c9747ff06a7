//! Display status of a battle.

use clipclash_types::{Battle, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a battle is in its lifecycle, from the viewer's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    /// Active and still accepting votes.
    Live,
    /// Scheduled but not yet open. The contract records no start time, so
    /// [`battle_status`] never yields this; only curated listings use it.
    Upcoming,
    /// Finalized by the contract, or its voting window has closed.
    Completed,
}

impl BattleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }

    /// Whether votes can still be cast.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status of `battle` at time `now`.
pub fn battle_status(battle: &Battle, now: Timestamp) -> BattleStatus {
    if !battle.is_active {
        return BattleStatus::Completed;
    }
    if battle.voting_end_time.is_after(now) {
        BattleStatus::Live
    } else {
        BattleStatus::Completed
    }
}
