//! The chain client seam.

use async_trait::async_trait;
use clipclash_types::{
    Address, Battle, BattleId, ContentHash, ContractConstants, TokenAmount, TokenInfo, TxHash,
    UserProfile, UserRank,
};

use crate::deployment::Deployment;
use crate::error::ChainError;
use crate::receipt::TxReceipt;

/// Reads and writes against the ClipClash contract and its payment token on
/// behalf of one connected account.
///
/// Write methods return as soon as the transaction is submitted; callers
/// observe mining through [`ChainClient::wait_for_receipt`]. Implementations
/// include the HTTP [`GatewayClient`](crate::GatewayClient) and the in-memory
/// `NullChain` used in tests.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The deployment this client targets.
    fn deployment(&self) -> Deployment;

    /// The connected account, if a wallet is connected.
    fn account(&self) -> Option<Address>;

    // ── Contract reads ──────────────────────────────────────────────────

    /// `battles(id)`; a record with `battle_id == 0` means no such battle.
    async fn battle(&self, id: BattleId) -> Result<Battle, ChainError>;

    /// `battleCount()`: the highest assigned battle id.
    async fn battle_count(&self) -> Result<u64, ChainError>;

    /// `creatorBattles(address)`: how many battles `creator` has entered.
    async fn creator_battles(&self, creator: Address) -> Result<u64, ChainError>;

    async fn user_profile(&self, user: Address) -> Result<UserProfile, ChainError>;

    async fn user_points(&self, user: Address) -> Result<u64, ChainError>;

    async fn user_rank(&self, user: Address) -> Result<UserRank, ChainError>;

    async fn total_users(&self) -> Result<u64, ChainError>;

    /// `votesPerBattle(id, voter)`: tokens `voter` has put into a battle.
    async fn votes_cast(&self, id: BattleId, voter: Address) -> Result<TokenAmount, ChainError>;

    async fn contract_constants(&self) -> Result<ContractConstants, ChainError>;

    // ── Token reads ─────────────────────────────────────────────────────

    /// `allowance(owner, battle_contract)` on the payment token.
    async fn allowance(&self, owner: Address) -> Result<TokenAmount, ChainError>;

    async fn token_balance(&self, holder: Address) -> Result<TokenAmount, ChainError>;

    async fn token_info(&self) -> Result<TokenInfo, ChainError>;

    // ── Writes (signed by the connected account) ────────────────────────

    /// `approve(battle_contract, amount)` on the payment token.
    async fn approve(&self, amount: TokenAmount) -> Result<TxHash, ChainError>;

    async fn register_user(&self, username: &str) -> Result<TxHash, ChainError>;

    async fn update_username(&self, username: &str) -> Result<TxHash, ChainError>;

    async fn create_battle(
        &self,
        category: &str,
        entry_fee: TokenAmount,
        media_ref: &ContentHash,
    ) -> Result<TxHash, ChainError>;

    async fn join_battle(&self, id: BattleId, media_ref: &ContentHash) -> Result<TxHash, ChainError>;

    async fn vote(&self, id: BattleId, creator: Address, amount: TokenAmount) -> Result<TxHash, ChainError>;

    async fn end_battle(&self, id: BattleId) -> Result<TxHash, ChainError>;

    // ── Confirmation ────────────────────────────────────────────────────

    /// Block until `tx_hash` is mined and return its receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError>;
}
