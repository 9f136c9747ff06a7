//! Workflow steps and the legal transitions between them.

use serde::Serialize;
use std::fmt;

use crate::error::WorkflowError;

/// A step of a transaction workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    #[default]
    Idle,
    CheckingAllowance,
    ApprovingTokens,
    CreatingBattle,
    JoiningBattle,
    Voting,
    EndingBattle,
    Registering,
    UpdatingUsername,
    WaitingConfirmation,
    Success,
    Error,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingAllowance => "checking-allowance",
            Self::ApprovingTokens => "approving-tokens",
            Self::CreatingBattle => "creating-battle",
            Self::JoiningBattle => "joining-battle",
            Self::Voting => "voting",
            Self::EndingBattle => "ending-battle",
            Self::Registering => "registering",
            Self::UpdatingUsername => "updating-username",
            Self::WaitingConfirmation => "waiting-confirmation",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Steps that submit the primary transaction of a workflow.
    pub fn is_submission(&self) -> bool {
        matches!(
            self,
            Self::CreatingBattle
                | Self::JoiningBattle
                | Self::Voting
                | Self::EndingBattle
                | Self::Registering
                | Self::UpdatingUsername
        )
    }

    /// Whether the state machine has an edge from `self` to `next`.
    ///
    /// Every non-terminal step may fail into `Error`; terminal steps only
    /// return to `Idle`.
    pub fn can_advance_to(&self, next: WorkflowStep) -> bool {
        use WorkflowStep::*;
        if next == Error {
            return !self.is_terminal();
        }
        match self {
            Idle => matches!(
                next,
                CheckingAllowance | EndingBattle | Registering | UpdatingUsername
            ),
            CheckingAllowance => {
                matches!(next, ApprovingTokens | CreatingBattle | JoiningBattle | Voting)
            }
            ApprovingTokens => matches!(next, CreatingBattle | JoiningBattle | Voting),
            s if s.is_submission() => next == WaitingConfirmation,
            WaitingConfirmation => next == Success,
            Success | Error => next == Idle,
            _ => false,
        }
    }

    pub fn advance(self, next: WorkflowStep) -> Result<WorkflowStep, WorkflowError> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(WorkflowError::IllegalTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable workflow state: the current step and, in `Error`, why.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub step: WorkflowStep,
    pub error: Option<WorkflowError>,
}

impl WorkflowState {
    pub fn is_busy(&self) -> bool {
        !self.step.is_terminal() && self.step != WorkflowStep::Idle
    }
}
