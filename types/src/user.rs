//! User profile and rank records from the ClipClash contract.

use serde::{Deserialize, Serialize};

/// A creator/voter profile as returned by `getUserProfile(address)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub reputation: u64,
    pub total_battles: u64,
    pub total_wins: u64,
    pub points: u64,
    /// Raw registration flag from the contract.
    pub is_registered: bool,
}

impl UserProfile {
    /// Registered when the contract flag is set or a username has been stored.
    ///
    /// Some contract deployments leave the flag unset after `registerUser`, so
    /// a non-empty username also counts.
    pub fn registered(&self) -> bool {
        self.is_registered || !self.username.trim().is_empty()
    }

    /// Name to display, if any.
    pub fn display_name(&self) -> Option<&str> {
        let name = self.username.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Leaderboard position of a user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRank {
    pub by_points: u64,
    pub by_reputation: u64,
}
