//! Short-lived status messages derived from terminal workflow states.

use std::time::{Duration, Instant};

use crate::step::{WorkflowState, WorkflowStep};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A status message that expires on its own.
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    shown_at: Instant,
}

impl Notice {
    pub const SUCCESS_TTL: Duration = Duration::from_secs(2);
    pub const ERROR_TTL: Duration = Duration::from_secs(5);

    pub fn success(text: impl Into<String>) -> Self {
        Self::at(NoticeKind::Success, text.into(), Instant::now())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::at(NoticeKind::Error, text.into(), Instant::now())
    }

    pub fn at(kind: NoticeKind, text: String, shown_at: Instant) -> Self {
        Self { kind, text, shown_at }
    }

    /// Notice for a finished workflow; `None` while it is still running.
    pub fn from_state(state: &WorkflowState, success_text: &str) -> Option<Self> {
        match state.step {
            WorkflowStep::Success => Some(Self::success(success_text)),
            WorkflowStep::Error => {
                let text = match &state.error {
                    Some(e) => match e.failure() {
                        Some(failure) => failure.user_message(),
                        None => e.to_string(),
                    },
                    None => "Transaction failed".to_string(),
                };
                Some(Self::error(text))
            }
            _ => None,
        }
    }

    pub fn ttl(&self) -> Duration {
        match self.kind {
            NoticeKind::Success => Self::SUCCESS_TTL,
            NoticeKind::Error => Self::ERROR_TTL,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.ttl()
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
