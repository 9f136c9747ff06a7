//! Nullable chain: an in-memory ClipClash contract and payment token.
//!
//! Applies the contract's observable rules (registration, minimum entry fee,
//! allowance/balance checks, voting window) so workflows can be exercised end
//! to end, and records every call for assertions. Failures can be scripted
//! per operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use clipclash_chain::{
    BattleCreatedEvent, ChainClient, ChainError, Deployment, LogEntry, TxReceipt,
};
use clipclash_types::{
    Address, Battle, BattleId, ContentHash, ContractConstants, TokenAmount, TokenInfo, TxHash,
    UserProfile, UserRank, CLASH_DECIMALS,
};

use crate::clock::NullClock;

/// An operation whose next invocation can be scripted to fail or revert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullOp {
    Allowance,
    Approve,
    RegisterUser,
    UpdateUsername,
    CreateBattle,
    JoinBattle,
    Vote,
    EndBattle,
    Receipt,
    BattleRead,
}

/// A recorded call against the nullable chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainCall {
    Allowance(Address),
    Approve(TokenAmount),
    RegisterUser(String),
    UpdateUsername(String),
    CreateBattle {
        category: String,
        entry_fee: TokenAmount,
        media_ref: ContentHash,
    },
    JoinBattle {
        battle_id: BattleId,
        media_ref: ContentHash,
    },
    Vote {
        battle_id: BattleId,
        creator: Address,
        amount: TokenAmount,
    },
    EndBattle(BattleId),
    WaitForReceipt(TxHash),
    Read(&'static str),
}

struct State {
    account: Option<Address>,
    battles: BTreeMap<u64, Battle>,
    profiles: HashMap<Address, UserProfile>,
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<Address, TokenAmount>,
    votes_cast: HashMap<(u64, Address), TokenAmount>,
    constants: ContractConstants,
    token: TokenInfo,
    receipts: HashMap<TxHash, TxReceipt>,
    tx_counter: u64,
    block_number: u64,
    failures: HashMap<NullOp, VecDeque<String>>,
    reverts: HashMap<NullOp, usize>,
    emit_events: bool,
    receipt_delay: Option<Duration>,
    calls: Vec<ChainCall>,
}

/// In-memory [`ChainClient`].
pub struct NullChain {
    state: Mutex<State>,
    clock: Arc<NullClock>,
    deployment: Deployment,
}

/// Default connected account.
pub const DEFAULT_ACCOUNT: Address = Address::new([0xa1; 20]);

fn default_constants() -> ContractConstants {
    ContractConstants {
        creator_reward_percent: 70,
        min_entry_fee: TokenAmount::new(10 * 10u128.pow(u32::from(CLASH_DECIMALS))),
        points_per_battle: 10,
        points_per_vote: 1,
        points_per_win: 50,
        protocol_fee_percent: 5,
        voter_reward_percent: 25,
        voting_duration: 86_400,
    }
}

fn revert(reason: &str) -> String {
    format!("execution reverted: {reason}")
}

impl NullChain {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::default()))
    }

    pub fn with_clock(clock: Arc<NullClock>) -> Self {
        Self {
            state: Mutex::new(State {
                account: Some(DEFAULT_ACCOUNT),
                battles: BTreeMap::new(),
                profiles: HashMap::new(),
                balances: HashMap::new(),
                allowances: HashMap::new(),
                votes_cast: HashMap::new(),
                constants: default_constants(),
                token: TokenInfo::default(),
                receipts: HashMap::new(),
                tx_counter: 0,
                block_number: 1,
                failures: HashMap::new(),
                reverts: HashMap::new(),
                emit_events: true,
                receipt_delay: None,
                calls: Vec::new(),
            }),
            clock,
            deployment: Deployment {
                chain_id: 31_337,
                battle_contract: Address::new([0xbc; 20]),
                token: Address::new([0x70; 20]),
            },
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn clock(&self) -> Arc<NullClock> {
        Arc::clone(&self.clock)
    }

    // ── Setup ───────────────────────────────────────────────────────────

    /// Connect a different account, or disconnect with `None`.
    pub fn set_account(&self, account: Option<Address>) {
        self.state().account = account;
    }

    pub fn fund(&self, holder: Address, amount: TokenAmount) {
        let mut state = self.state();
        let balance = state.balances.entry(holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn set_allowance(&self, owner: Address, amount: TokenAmount) {
        self.state().allowances.insert(owner, amount);
    }

    pub fn register(&self, user: Address, username: &str) {
        self.state().profiles.insert(
            user,
            UserProfile {
                username: username.to_string(),
                is_registered: true,
                ..Default::default()
            },
        );
    }

    pub fn insert_battle(&self, battle: Battle) {
        self.state().battles.insert(battle.battle_id.get(), battle);
    }

    pub fn set_constants(&self, constants: ContractConstants) {
        self.state().constants = constants;
    }

    /// Make the next invocation of `op` fail with `message`.
    pub fn fail_next(&self, op: NullOp, message: impl Into<String>) {
        self.state()
            .failures
            .entry(op)
            .or_default()
            .push_back(message.into());
    }

    /// Make the next transaction submitted via `op` mine with a failed status.
    pub fn revert_next(&self, op: NullOp) {
        *self.state().reverts.entry(op).or_default() += 1;
    }

    /// Hold every receipt wait for `delay` before answering.
    pub fn delay_receipts(&self, delay: Duration) {
        self.state().receipt_delay = Some(delay);
    }

    /// Whether created battles emit a `BattleCreated` log.
    pub fn emit_events(&self, emit: bool) {
        self.state().emit_events = emit;
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<ChainCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&ChainCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn battle_snapshot(&self, id: BattleId) -> Option<Battle> {
        self.state().battles.get(&id.get()).cloned()
    }

    pub fn allowance_of(&self, owner: Address) -> TokenAmount {
        self.state().allowances.get(&owner).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, holder: Address) -> TokenAmount {
        self.state().balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn profile_of(&self, user: Address) -> UserProfile {
        self.state().profiles.get(&user).cloned().unwrap_or_default()
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn scripted_failure(state: &mut State, op: NullOp) -> Result<(), ChainError> {
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(message) => Err(ChainError::Rpc(message)),
            None => Ok(()),
        }
    }

    /// Run a write: record it, honour scripted failures, apply `effect`, and
    /// store a receipt. Contract rule violations surface at submission, the
    /// way a wallet's pre-flight simulation reports them.
    fn submit(
        &self,
        op: NullOp,
        call: ChainCall,
        effect: impl FnOnce(&mut State, &Self) -> Result<Vec<LogEntry>, String>,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.account.is_none() {
            return Err(ChainError::NoAccount);
        }
        Self::scripted_failure(&mut state, op)?;

        let reverted = match state.reverts.get_mut(&op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        let logs = if reverted {
            Vec::new()
        } else {
            effect(&mut state, self).map_err(ChainError::Rpc)?
        };

        state.tx_counter += 1;
        state.block_number += 1;
        let mut bytes = [0u8; 32];
        bytes[0] = 0x7e;
        bytes[24..].copy_from_slice(&state.tx_counter.to_be_bytes());
        let tx_hash = TxHash::new(bytes);
        let receipt = TxReceipt {
            tx_hash,
            block_number: state.block_number,
            success: !reverted,
            logs,
        };
        state.receipts.insert(tx_hash, receipt);
        tracing::debug!(?op, tx = %tx_hash, reverted, "null chain transaction");
        Ok(tx_hash)
    }

    fn take_tokens(state: &mut State, owner: Address, amount: TokenAmount) -> Result<(), String> {
        let allowance = state.allowances.get(&owner).copied().unwrap_or_default();
        if allowance < amount {
            return Err(revert("ERC20: transfer amount exceeds allowance"));
        }
        let balance = state.balances.get(&owner).copied().unwrap_or_default();
        if balance < amount {
            return Err(revert("ERC20: transfer amount exceeds balance"));
        }
        state.allowances.insert(owner, allowance.saturating_sub(amount));
        state.balances.insert(owner, balance.saturating_sub(amount));
        Ok(())
    }

    fn transfer_log(&self, amount: TokenAmount) -> LogEntry {
        LogEntry {
            address: self.deployment.token,
            topics: vec![
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".into(),
            ],
            data: format!("0x{:064x}", amount.raw()),
        }
    }

    fn require_registered(state: &State, user: Address) -> Result<(), String> {
        match state.profiles.get(&user) {
            Some(p) if p.registered() => Ok(()),
            _ => Err(revert("User not registered")),
        }
    }

    fn read(&self, name: &'static str) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(ChainCall::Read(name));
        state
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainClient for NullChain {
    fn deployment(&self) -> Deployment {
        self.deployment
    }

    fn account(&self) -> Option<Address> {
        self.state().account
    }

    async fn battle(&self, id: BattleId) -> Result<Battle, ChainError> {
        let mut state = self.read("battle");
        Self::scripted_failure(&mut state, NullOp::BattleRead)?;
        Ok(state.battles.get(&id.get()).cloned().unwrap_or(Battle {
            battle_id: BattleId::NONE,
            creator1: Address::ZERO,
            creator2: Address::ZERO,
            media_ref1: None,
            media_ref2: None,
            category: String::new(),
            entry_fee: TokenAmount::ZERO,
            voting_end_time: Default::default(),
            votes1: TokenAmount::ZERO,
            votes2: TokenAmount::ZERO,
            winner: Address::ZERO,
            is_active: false,
        }))
    }

    async fn battle_count(&self) -> Result<u64, ChainError> {
        let state = self.read("battle_count");
        Ok(state.battles.keys().next_back().copied().unwrap_or(0))
    }

    async fn creator_battles(&self, creator: Address) -> Result<u64, ChainError> {
        let state = self.read("creator_battles");
        Ok(state
            .battles
            .values()
            .filter(|b| b.is_creator(&creator))
            .count() as u64)
    }

    async fn user_profile(&self, user: Address) -> Result<UserProfile, ChainError> {
        let state = self.read("user_profile");
        Ok(state.profiles.get(&user).cloned().unwrap_or_default())
    }

    async fn user_points(&self, user: Address) -> Result<u64, ChainError> {
        let state = self.read("user_points");
        Ok(state.profiles.get(&user).map(|p| p.points).unwrap_or(0))
    }

    async fn user_rank(&self, user: Address) -> Result<UserRank, ChainError> {
        let state = self.read("user_rank");
        let Some(me) = state.profiles.get(&user) else {
            return Ok(UserRank::default());
        };
        let rank_by = |key: fn(&UserProfile) -> u64| {
            1 + state
                .profiles
                .values()
                .filter(|p| key(p) > key(me))
                .count() as u64
        };
        Ok(UserRank {
            by_points: rank_by(|p| p.points),
            by_reputation: rank_by(|p| p.reputation),
        })
    }

    async fn total_users(&self) -> Result<u64, ChainError> {
        let state = self.read("total_users");
        Ok(state.profiles.values().filter(|p| p.registered()).count() as u64)
    }

    async fn votes_cast(&self, id: BattleId, voter: Address) -> Result<TokenAmount, ChainError> {
        let state = self.read("votes_per_battle");
        Ok(state
            .votes_cast
            .get(&(id.get(), voter))
            .copied()
            .unwrap_or_default())
    }

    async fn contract_constants(&self) -> Result<ContractConstants, ChainError> {
        Ok(self.read("contract_constants").constants.clone())
    }

    async fn allowance(&self, owner: Address) -> Result<TokenAmount, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::Allowance(owner));
        Self::scripted_failure(&mut state, NullOp::Allowance)?;
        Ok(state.allowances.get(&owner).copied().unwrap_or_default())
    }

    async fn token_balance(&self, holder: Address) -> Result<TokenAmount, ChainError> {
        let state = self.read("balance_of");
        Ok(state.balances.get(&holder).copied().unwrap_or_default())
    }

    async fn token_info(&self) -> Result<TokenInfo, ChainError> {
        Ok(self.read("token_info").token.clone())
    }

    async fn approve(&self, amount: TokenAmount) -> Result<TxHash, ChainError> {
        self.submit(NullOp::Approve, ChainCall::Approve(amount), |state, _| {
            let owner = state.account.ok_or_else(|| revert("no sender"))?;
            state.allowances.insert(owner, amount);
            Ok(Vec::new())
        })
    }

    async fn register_user(&self, username: &str) -> Result<TxHash, ChainError> {
        let name = username.to_string();
        self.submit(NullOp::RegisterUser, ChainCall::RegisterUser(name.clone()), |state, _| {
            let me = state.account.ok_or_else(|| revert("no sender"))?;
            if state.profiles.get(&me).is_some_and(UserProfile::registered) {
                return Err(revert("User already registered"));
            }
            if state.profiles.values().any(|p| p.username == name) {
                return Err(revert("Username taken"));
            }
            state.profiles.insert(
                me,
                UserProfile {
                    username: name,
                    is_registered: true,
                    ..Default::default()
                },
            );
            Ok(Vec::new())
        })
    }

    async fn update_username(&self, username: &str) -> Result<TxHash, ChainError> {
        let name = username.to_string();
        self.submit(NullOp::UpdateUsername, ChainCall::UpdateUsername(name.clone()), |state, _| {
            let me = state.account.ok_or_else(|| revert("no sender"))?;
            Self::require_registered(state, me)?;
            if let Some(profile) = state.profiles.get_mut(&me) {
                profile.username = name;
            }
            Ok(Vec::new())
        })
    }

    async fn create_battle(
        &self,
        category: &str,
        entry_fee: TokenAmount,
        media_ref: &ContentHash,
    ) -> Result<TxHash, ChainError> {
        let call = ChainCall::CreateBattle {
            category: category.to_string(),
            entry_fee,
            media_ref: media_ref.clone(),
        };
        let now = self.clock.now();
        self.submit(NullOp::CreateBattle, call, |state, chain| {
            let me = state.account.ok_or_else(|| revert("no sender"))?;
            Self::require_registered(state, me)?;
            if entry_fee < state.constants.min_entry_fee {
                return Err(revert("Entry fee too low"));
            }
            Self::take_tokens(state, me, entry_fee)?;

            let id = state.battles.keys().next_back().copied().unwrap_or(0) + 1;
            state.battles.insert(
                id,
                Battle {
                    battle_id: BattleId::new(id),
                    creator1: me,
                    creator2: Address::ZERO,
                    media_ref1: Some(media_ref.clone()),
                    media_ref2: None,
                    category: category.to_string(),
                    entry_fee,
                    voting_end_time: now.plus_secs(state.constants.voting_duration),
                    votes1: TokenAmount::ZERO,
                    votes2: TokenAmount::ZERO,
                    winner: Address::ZERO,
                    is_active: true,
                },
            );
            let points = state.constants.points_per_battle;
            if let Some(profile) = state.profiles.get_mut(&me) {
                profile.total_battles += 1;
                profile.points += points;
            }

            let mut logs = vec![chain.transfer_log(entry_fee)];
            if state.emit_events {
                let event = BattleCreatedEvent {
                    battle_id: BattleId::new(id),
                    creator: me,
                    category: category.to_string(),
                    entry_fee,
                };
                logs.push(event.to_log(chain.deployment.battle_contract));
            }
            Ok(logs)
        })
    }

    async fn join_battle(&self, id: BattleId, media_ref: &ContentHash) -> Result<TxHash, ChainError> {
        let call = ChainCall::JoinBattle {
            battle_id: id,
            media_ref: media_ref.clone(),
        };
        let now = self.clock.now();
        self.submit(NullOp::JoinBattle, call, |state, chain| {
            let me = state.account.ok_or_else(|| revert("no sender"))?;
            Self::require_registered(state, me)?;
            let battle = state
                .battles
                .get(&id.get())
                .cloned()
                .ok_or_else(|| revert("Battle does not exist"))?;
            if !battle.is_active {
                return Err(revert("Battle not active"));
            }
            if battle.has_challenger() {
                return Err(revert("Battle already has challenger"));
            }
            if battle.creator1 == me {
                return Err(revert("Cannot join own battle"));
            }
            Self::take_tokens(state, me, battle.entry_fee)?;

            let duration = state.constants.voting_duration;
            if let Some(b) = state.battles.get_mut(&id.get()) {
                b.creator2 = me;
                b.media_ref2 = Some(media_ref.clone());
                b.voting_end_time = now.plus_secs(duration);
            }
            let points = state.constants.points_per_battle;
            if let Some(profile) = state.profiles.get_mut(&me) {
                profile.total_battles += 1;
                profile.points += points;
            }
            Ok(vec![chain.transfer_log(battle.entry_fee)])
        })
    }

    async fn vote(&self, id: BattleId, creator: Address, amount: TokenAmount) -> Result<TxHash, ChainError> {
        let call = ChainCall::Vote {
            battle_id: id,
            creator,
            amount,
        };
        let now = self.clock.now();
        self.submit(NullOp::Vote, call, |state, chain| {
            let me = state.account.ok_or_else(|| revert("no sender"))?;
            let battle = state
                .battles
                .get(&id.get())
                .cloned()
                .ok_or_else(|| revert("Battle does not exist"))?;
            if !battle.is_active || !battle.voting_end_time.is_after(now) {
                return Err(revert("Voting has ended"));
            }
            if !battle.is_creator(&creator) {
                return Err(revert("Invalid creator"));
            }
            if amount.is_zero() {
                return Err(revert("Vote amount must be positive"));
            }
            Self::take_tokens(state, me, amount)?;

            if let Some(b) = state.battles.get_mut(&id.get()) {
                if b.creator1 == creator {
                    b.votes1 = b.votes1.saturating_add(amount);
                } else {
                    b.votes2 = b.votes2.saturating_add(amount);
                }
            }
            let cast = state.votes_cast.entry((id.get(), me)).or_default();
            *cast = cast.saturating_add(amount);
            let points = state.constants.points_per_vote;
            if let Some(profile) = state.profiles.get_mut(&me) {
                profile.points += points;
            }
            Ok(vec![chain.transfer_log(amount)])
        })
    }

    async fn end_battle(&self, id: BattleId) -> Result<TxHash, ChainError> {
        let now = self.clock.now();
        self.submit(NullOp::EndBattle, ChainCall::EndBattle(id), |state, _| {
            let battle = state
                .battles
                .get(&id.get())
                .cloned()
                .ok_or_else(|| revert("Battle does not exist"))?;
            if !battle.is_active {
                return Err(revert("Battle not active"));
            }
            if battle.voting_end_time.is_after(now) {
                return Err(revert("Voting still in progress"));
            }
            let winner = if battle.votes1 >= battle.votes2 {
                battle.creator1
            } else {
                battle.creator2
            };
            let points = state.constants.points_per_win;
            if let Some(b) = state.battles.get_mut(&id.get()) {
                b.is_active = false;
                b.winner = winner;
            }
            if let Some(profile) = state.profiles.get_mut(&winner) {
                profile.total_wins += 1;
                profile.points += points;
                profile.reputation += 1;
            }
            Ok(Vec::new())
        })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError> {
        let delay = self.state().receipt_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        state.calls.push(ChainCall::WaitForReceipt(tx_hash));
        Self::scripted_failure(&mut state, NullOp::Receipt)?;
        state
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("unknown transaction {tx_hash}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipclash_chain::find_battle_created;

    fn clash(units: u128) -> TokenAmount {
        TokenAmount::from_units(units, CLASH_DECIMALS).unwrap()
    }

    fn media() -> ContentHash {
        ContentHash::new("bafytestclip").unwrap()
    }

    #[tokio::test]
    async fn create_battle_emits_event_and_charges_fee() {
        let chain = NullChain::new();
        chain.register(DEFAULT_ACCOUNT, "alice");
        chain.fund(DEFAULT_ACCOUNT, clash(100));
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));

        let hash = chain.create_battle("dance", clash(10), &media()).await.unwrap();
        let receipt = chain.wait_for_receipt(hash).await.unwrap();
        assert!(receipt.success);
        let event = find_battle_created(&receipt, &chain.deployment().battle_contract).unwrap();
        assert_eq!(event.battle_id, BattleId::new(1));
        assert_eq!(chain.balance_of(DEFAULT_ACCOUNT), clash(90));
        assert_eq!(chain.allowance_of(DEFAULT_ACCOUNT), TokenAmount::ZERO);
        assert_eq!(chain.battle_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn contract_rules_surface_as_rpc_errors() {
        let chain = NullChain::new();
        let err = chain.create_battle("dance", clash(10), &media()).await.unwrap_err();
        assert_eq!(err, ChainError::Rpc("execution reverted: User not registered".into()));

        chain.register(DEFAULT_ACCOUNT, "alice");
        let err = chain.create_battle("dance", clash(1), &media()).await.unwrap_err();
        assert!(err.to_string().contains("Entry fee too low"));

        let err = chain.create_battle("dance", clash(10), &media()).await.unwrap_err();
        assert!(err.to_string().contains("exceeds allowance"));
    }

    #[tokio::test]
    async fn scripted_failures_and_reverts() {
        let chain = NullChain::new();
        chain.fail_next(NullOp::Approve, "User rejected the request.");
        assert!(chain.approve(clash(1)).await.is_err());

        chain.revert_next(NullOp::Approve);
        let hash = chain.approve(clash(1)).await.unwrap();
        assert!(!chain.wait_for_receipt(hash).await.unwrap().success);
        assert_eq!(chain.allowance_of(DEFAULT_ACCOUNT), TokenAmount::ZERO);

        let hash = chain.approve(clash(1)).await.unwrap();
        assert!(chain.wait_for_receipt(hash).await.unwrap().success);
        assert_eq!(chain.allowance_of(DEFAULT_ACCOUNT), clash(1));
    }

    #[tokio::test]
    async fn vote_requires_open_window() {
        let chain = NullChain::new();
        let clock = chain.clock();
        let other = Address::new([0xb2; 20]);
        chain.insert_battle(Battle {
            battle_id: BattleId::new(1),
            creator1: other,
            creator2: Address::new([0xb3; 20]),
            media_ref1: None,
            media_ref2: None,
            category: "music".into(),
            entry_fee: clash(10),
            voting_end_time: clock.now().plus_secs(60),
            votes1: TokenAmount::ZERO,
            votes2: TokenAmount::ZERO,
            winner: Address::ZERO,
            is_active: true,
        });
        chain.fund(DEFAULT_ACCOUNT, clash(5));
        chain.set_allowance(DEFAULT_ACCOUNT, clash(5));

        chain.vote(BattleId::new(1), other, clash(2)).await.unwrap();
        assert_eq!(chain.battle_snapshot(BattleId::new(1)).unwrap().votes1, clash(2));

        clock.advance(61);
        let err = chain.vote(BattleId::new(1), other, clash(1)).await.unwrap_err();
        assert!(err.to_string().contains("Voting has ended"));

        chain.end_battle(BattleId::new(1)).await.unwrap();
        let ended = chain.battle_snapshot(BattleId::new(1)).unwrap();
        assert!(!ended.is_active);
        assert_eq!(ended.winner, other);
    }

    #[tokio::test]
    async fn disconnected_account_cannot_write() {
        let chain = NullChain::new();
        chain.set_account(None);
        assert_eq!(chain.approve(clash(1)).await.unwrap_err(), ChainError::NoAccount);
    }
}
