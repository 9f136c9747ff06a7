//! Battle state derivation.
//!
//! Pure, side-effect-free projections from a contract [`Battle`] record to what
//! a client displays: status, time remaining, vote split and prize pool. These
//! are recomputed on every read; nothing here caches contract state.
//!
//! [`Battle`]: clipclash_types::Battle

pub mod countdown;
pub mod status;
pub mod view;
pub mod votes;

pub use countdown::{format_time_remaining, time_remaining};
pub use status::{battle_status, BattleStatus};
pub use view::{creator_names, BattleView};
pub use votes::{Side, VoteSplit};
