//! ClipClash contract interface.
//!
//! The battle contract and its ERC-20 payment token are external; this crate
//! describes how the client talks to them:
//! - [`ChainClient`]: the read/write seam the orchestrator drives
//! - [`TxReceipt`] / [`LogEntry`]: mined transaction results
//! - [`events`]: best-effort decoding of `BattleCreated` from receipt logs
//! - [`GatewayClient`]: HTTP client for a wallet gateway that signs and relays

pub mod client;
pub mod deployment;
pub mod error;
pub mod events;
pub mod gateway;
pub mod receipt;

pub use client::ChainClient;
pub use deployment::Deployment;
pub use error::ChainError;
pub use events::{find_battle_created, BattleCreatedEvent, BATTLE_CREATED_TOPIC};
pub use gateway::GatewayClient;
pub use receipt::{LogEntry, TxReceipt};
