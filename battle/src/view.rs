//! Everything a battle card or detail page shows, computed in one pass.

use clipclash_types::{Battle, Timestamp, TokenAmount, UserProfile};
use serde::Serialize;

use crate::countdown::{format_time_remaining, time_remaining};
use crate::status::{battle_status, BattleStatus};
use crate::votes::VoteSplit;

/// Placeholder name for the first creator when no profile is known.
pub const CREATOR1_PLACEHOLDER: &str = "Creator1";
/// Placeholder name for the second creator when nobody has joined yet.
pub const AWAITING_CHALLENGER: &str = "Waiting for challenger";
/// Placeholder name for a challenger with no profile.
pub const CREATOR2_PLACEHOLDER: &str = "Creator2";

/// Derived display state of a battle at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleView {
    pub status: BattleStatus,
    pub seconds_remaining: u64,
    pub countdown: String,
    pub split: VoteSplit,
    pub prize_pool: TokenAmount,
    /// Prize pool in whole token units.
    pub prize_pool_units: u128,
    /// Prize pool rendered with the token's decimals, e.g. `"20"` or `"0.5"`.
    pub prize_pool_display: String,
    pub awaiting_challenger: bool,
}

impl BattleView {
    /// Project `battle` at `now` for a token with `decimals` decimals.
    pub fn project(battle: &Battle, now: Timestamp, decimals: u8) -> Self {
        let status = battle_status(battle, now);
        let seconds_remaining = time_remaining(battle, now);
        let countdown = match status {
            BattleStatus::Live => format_time_remaining(battle.voting_end_time.seconds_from(now)),
            _ => format_time_remaining(0),
        };
        let prize_pool = battle.prize_pool();

        Self {
            status,
            seconds_remaining,
            countdown,
            split: VoteSplit::from_votes(battle.votes1, battle.votes2),
            prize_pool,
            prize_pool_units: prize_pool.whole_units(decimals),
            prize_pool_display: prize_pool.format_units(decimals),
            awaiting_challenger: !battle.has_challenger(),
        }
    }
}

/// Display names for both sides, falling back to placeholders.
pub fn creator_names(
    battle: &Battle,
    profile1: Option<&UserProfile>,
    profile2: Option<&UserProfile>,
) -> (String, String) {
    let left = profile1
        .and_then(UserProfile::display_name)
        .unwrap_or(CREATOR1_PLACEHOLDER)
        .to_string();
    let right = if !battle.has_challenger() {
        AWAITING_CHALLENGER.to_string()
    } else {
        profile2
            .and_then(UserProfile::display_name)
            .unwrap_or(CREATOR2_PLACEHOLDER)
            .to_string()
    };
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipclash_types::{Address, BattleId};

    fn live_battle(now: u64) -> Battle {
        Battle {
            battle_id: BattleId::new(3),
            creator1: Address::new([1; 20]),
            creator2: Address::new([2; 20]),
            media_ref1: None,
            media_ref2: None,
            category: "music".into(),
            entry_fee: TokenAmount::new(10_000_000_000_000_000_000),
            voting_end_time: Timestamp::new(now + 3600),
            votes1: TokenAmount::new(30),
            votes2: TokenAmount::new(70),
            winner: Address::ZERO,
            is_active: true,
        }
    }

    #[test]
    fn projects_live_battle() {
        let now = 1_700_000_000;
        let view = BattleView::project(&live_battle(now), Timestamp::new(now), 18);
        assert_eq!(view.status, BattleStatus::Live);
        assert_eq!((view.split.left, view.split.right), (30, 70));
        assert_eq!(view.prize_pool_units, 20);
        assert_eq!(view.prize_pool_display, "20");
        assert_eq!(view.countdown, "1h 0m");
        assert_eq!(view.seconds_remaining, 3600);
        assert!(!view.awaiting_challenger);
    }

    #[test]
    fn finalized_battle_shows_ended() {
        let now = 1_700_000_000;
        let mut battle = live_battle(now);
        battle.is_active = false;
        let view = BattleView::project(&battle, Timestamp::new(now), 18);
        assert_eq!(view.status, BattleStatus::Completed);
        assert_eq!(view.countdown, "Ended");
    }

    #[test]
    fn names_fall_back_to_placeholders() {
        let mut battle = live_battle(0);
        let named = UserProfile {
            username: "zoe".into(),
            ..Default::default()
        };
        assert_eq!(
            creator_names(&battle, Some(&named), None),
            ("zoe".to_string(), CREATOR2_PLACEHOLDER.to_string())
        );
        battle.creator2 = Address::ZERO;
        assert_eq!(
            creator_names(&battle, None, Some(&named)),
            (CREATOR1_PLACEHOLDER.to_string(), AWAITING_CHALLENGER.to_string())
        );
    }
}
