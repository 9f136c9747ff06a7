//! HTTP client for a wallet gateway.
//!
//! The gateway holds the user's wallet session: it answers contract reads,
//! signs and relays writes, and reports receipts. Every call is
//! `POST {url}` with `{"action": "...", ...params}`; the gateway answers
//! `{"result": ...}` or `{"error": "..."}`. Amounts travel as decimal strings.

use std::time::Duration;

use async_trait::async_trait;
use clipclash_types::{
    Address, Battle, BattleId, ContentHash, ContractConstants, Timestamp, TokenAmount, TokenInfo,
    TxHash, UserProfile, UserRank,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::client::ChainClient;
use crate::deployment::Deployment;
use crate::error::ChainError;
use crate::receipt::TxReceipt;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default ceiling on how long to wait for a receipt.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Wallet gateway client bound to one deployment and (optionally) one account.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
    deployment: Deployment,
    account: Option<Address>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

/// Battle record as the gateway returns it (field order of `battles(uint256)`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BattleRecord {
    battle_id: u64,
    creator1: Address,
    creator2: Address,
    #[serde(default)]
    ipfs_hash1: String,
    #[serde(default)]
    ipfs_hash2: String,
    #[serde(default)]
    category: String,
    entry_fee: TokenAmount,
    voting_end_time: u64,
    votes1: TokenAmount,
    votes2: TokenAmount,
    winner: Address,
    is_active: bool,
}

impl From<BattleRecord> for Battle {
    fn from(r: BattleRecord) -> Self {
        Battle {
            battle_id: BattleId::new(r.battle_id),
            creator1: r.creator1,
            creator2: r.creator2,
            media_ref1: ContentHash::from_optional(&r.ipfs_hash1),
            media_ref2: ContentHash::from_optional(&r.ipfs_hash2),
            category: r.category,
            entry_fee: r.entry_fee,
            voting_end_time: Timestamp::new(r.voting_end_time),
            votes1: r.votes1,
            votes2: r.votes2,
            winner: r.winner,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    #[serde(default)]
    username: String,
    #[serde(default)]
    reputation: u64,
    #[serde(default)]
    total_battles: u64,
    #[serde(default)]
    total_wins: u64,
    #[serde(default)]
    points: u64,
    #[serde(default)]
    is_registered: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankRecord {
    rank_by_points: u64,
    rank_by_reputation: u64,
}

#[derive(Debug, Deserialize)]
struct TxSubmitted {
    hash: TxHash,
}

impl GatewayClient {
    /// Create a client for the gateway at `url` (e.g. `http://127.0.0.1:8545/gateway`).
    pub fn new(
        url: impl Into<String>,
        deployment: Deployment,
        account: Option<Address>,
    ) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChainError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            deployment,
            account,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    /// Override receipt polling cadence and ceiling.
    pub fn with_confirmation(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the gateway which account its wallet session is connected to.
    pub async fn connected_account(&self) -> Result<Option<Address>, ChainError> {
        self.call("account", json!({})).await
    }

    /// Bind the client to the gateway's connected account.
    pub async fn connect(mut self) -> Result<Self, ChainError> {
        self.account = self.connected_account().await?;
        Ok(self)
    }

    /// Send one action and return the raw `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| ChainError::InvalidResponse("params must be a JSON object".into()))?
            .insert("action".to_string(), json!(action));

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ChainError::Unavailable(format!("connection failed: {e}"))
                } else {
                    ChainError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(ChainError::Rpc(err.to_string()));
        }
        if !status.is_success() {
            return Err(ChainError::Transport(format!("gateway returned HTTP {status}")));
        }

        Ok(json.get("result").cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<T, ChainError> {
        let result = self.rpc_call(action, params).await?;
        serde_json::from_value(result)
            .map_err(|e| ChainError::InvalidResponse(format!("invalid {action} response: {e}")))
    }

    /// Submit a write from the connected account.
    async fn submit(&self, action: &str, params: serde_json::Value) -> Result<TxHash, ChainError> {
        let from = self.account.ok_or(ChainError::NoAccount)?;
        let mut params = params;
        if let Some(obj) = params.as_object_mut() {
            obj.insert("from".into(), json!(from));
        }
        let submitted: TxSubmitted = self.call(action, params).await?;
        tracing::info!(action, tx = %submitted.hash, "transaction submitted");
        Ok(submitted.hash)
    }
}

#[async_trait]
impl ChainClient for GatewayClient {
    fn deployment(&self) -> Deployment {
        self.deployment
    }

    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn battle(&self, id: BattleId) -> Result<Battle, ChainError> {
        let record: BattleRecord = self.call("battle", json!({ "battleId": id.get() })).await?;
        Ok(record.into())
    }

    async fn battle_count(&self) -> Result<u64, ChainError> {
        self.call("battle_count", json!({})).await
    }

    async fn creator_battles(&self, creator: Address) -> Result<u64, ChainError> {
        self.call("creator_battles", json!({ "creator": creator })).await
    }

    async fn user_profile(&self, user: Address) -> Result<UserProfile, ChainError> {
        let p: ProfileRecord = self.call("user_profile", json!({ "user": user })).await?;
        Ok(UserProfile {
            username: p.username,
            reputation: p.reputation,
            total_battles: p.total_battles,
            total_wins: p.total_wins,
            points: p.points,
            is_registered: p.is_registered,
        })
    }

    async fn user_points(&self, user: Address) -> Result<u64, ChainError> {
        self.call("user_points", json!({ "user": user })).await
    }

    async fn user_rank(&self, user: Address) -> Result<UserRank, ChainError> {
        let r: RankRecord = self.call("user_rank", json!({ "user": user })).await?;
        Ok(UserRank {
            by_points: r.rank_by_points,
            by_reputation: r.rank_by_reputation,
        })
    }

    async fn total_users(&self) -> Result<u64, ChainError> {
        self.call("total_users", json!({})).await
    }

    async fn votes_cast(&self, id: BattleId, voter: Address) -> Result<TokenAmount, ChainError> {
        self.call("votes_per_battle", json!({ "battleId": id.get(), "voter": voter }))
            .await
    }

    async fn contract_constants(&self) -> Result<ContractConstants, ChainError> {
        self.call("contract_constants", json!({})).await
    }

    async fn allowance(&self, owner: Address) -> Result<TokenAmount, ChainError> {
        self.call(
            "allowance",
            json!({
                "token": self.deployment.token,
                "owner": owner,
                "spender": self.deployment.battle_contract,
            }),
        )
        .await
    }

    async fn token_balance(&self, holder: Address) -> Result<TokenAmount, ChainError> {
        self.call(
            "balance_of",
            json!({ "token": self.deployment.token, "holder": holder }),
        )
        .await
    }

    async fn token_info(&self) -> Result<TokenInfo, ChainError> {
        self.call("token_info", json!({ "token": self.deployment.token }))
            .await
    }

    async fn approve(&self, amount: TokenAmount) -> Result<TxHash, ChainError> {
        self.submit(
            "approve",
            json!({
                "token": self.deployment.token,
                "spender": self.deployment.battle_contract,
                "amount": amount,
            }),
        )
        .await
    }

    async fn register_user(&self, username: &str) -> Result<TxHash, ChainError> {
        self.submit("register_user", json!({ "username": username }))
            .await
    }

    async fn update_username(&self, username: &str) -> Result<TxHash, ChainError> {
        self.submit("update_username", json!({ "username": username }))
            .await
    }

    async fn create_battle(
        &self,
        category: &str,
        entry_fee: TokenAmount,
        media_ref: &ContentHash,
    ) -> Result<TxHash, ChainError> {
        self.submit(
            "create_battle",
            json!({ "category": category, "entryFee": entry_fee, "ipfsHash": media_ref }),
        )
        .await
    }

    async fn join_battle(&self, id: BattleId, media_ref: &ContentHash) -> Result<TxHash, ChainError> {
        self.submit(
            "join_battle",
            json!({ "battleId": id.get(), "ipfsHash": media_ref }),
        )
        .await
    }

    async fn vote(&self, id: BattleId, creator: Address, amount: TokenAmount) -> Result<TxHash, ChainError> {
        self.submit(
            "vote",
            json!({ "battleId": id.get(), "creator": creator, "amount": amount }),
        )
        .await
    }

    async fn end_battle(&self, id: BattleId) -> Result<TxHash, ChainError> {
        self.submit("end_battle", json!({ "battleId": id.get() }))
            .await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError> {
        let started = tokio::time::Instant::now();
        loop {
            let receipt: Option<TxReceipt> =
                self.call("get_receipt", json!({ "hash": tx_hash })).await?;
            if let Some(receipt) = receipt {
                tracing::info!(tx = %tx_hash, block = receipt.block_number, "transaction mined");
                return Ok(receipt);
            }
            if started.elapsed() >= self.confirmation_timeout {
                return Err(ChainError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tracing::debug!(tx = %tx_hash, "receipt not yet available");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
