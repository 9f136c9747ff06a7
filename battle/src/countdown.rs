//! Voting countdowns.

use clipclash_types::{Battle, Timestamp};

/// Seconds of voting left at `now`; zero once the deadline has passed.
pub fn time_remaining(battle: &Battle, now: Timestamp) -> u64 {
    battle.voting_end_time.remaining_from(now)
}

/// Render a countdown: `"Ended"`, `"{h}h {m}m"`, `"{m}m {s}s"` or `"{s}s"`.
///
/// Non-positive input renders as `"Ended"`.
pub fn format_time_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "Ended".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
