//! Transaction orchestration for ClipClash.
//!
//! Sequences the multi-step contract operations (create, join, vote, end,
//! register) as an auditable state machine:
//!
//! ```text
//! Idle → CheckingAllowance → ApprovingTokens? → <submit> → WaitingConfirmation → Success
//!                                                                            └─→ Error
//! ```
//!
//! Progress is published through a `tokio::sync::watch` channel. Successful
//! runs invalidate and refetch the dependent [`ReadCache`].

pub mod cache;
pub mod classify;
pub mod error;
pub mod feed;
pub mod notice;
pub mod step;
pub mod workflow;

pub use cache::ReadCache;
pub use classify::{classify, TxErrorKind, TxFailure};
pub use error::WorkflowError;
pub use feed::BattleFeed;
pub use notice::{Notice, NoticeKind};
pub use step::{WorkflowState, WorkflowStep};
pub use workflow::{BattleCreation, CastVote, CreateBattle, JoinBattle, TxWorkflow};
