//! Fundamental types for the ClipClash client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! EVM addresses, token amounts, timestamps, transaction and content hashes, and
//! the battle / user records read from the ClipClash contract.

pub mod address;
pub mod amount;
pub mod battle;
pub mod error;
pub mod hash;
pub mod time;
pub mod token;
pub mod user;

pub use address::Address;
pub use amount::{TokenAmount, CLASH_DECIMALS};
pub use battle::{Battle, BattleId};
pub use error::ClipClashError;
pub use hash::{ContentHash, TxHash};
pub use time::Timestamp;
pub use token::{ContractConstants, TokenBalance, TokenInfo};
pub use user::{UserProfile, UserRank};
