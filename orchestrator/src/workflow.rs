//! The transaction workflow engine.
//!
//! A [`TxWorkflow`] runs one operation at a time against a [`ChainClient`]:
//! precondition checks, the allowance/approval prefix for token-spending
//! operations, submission, and confirmation. Every step is published on a
//! watch channel and recorded in the run's step trail.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use clipclash_chain::{find_battle_created, ChainClient, ChainError, TxReceipt};
use clipclash_types::{Address, BattleId, ContentHash, TokenAmount, TxHash};
use clipclash_utils::StatsCounter;
use tokio::sync::watch;

use crate::cache::ReadCache;
use crate::error::WorkflowError;
use crate::step::{WorkflowState, WorkflowStep};

/// Minimum username length, in characters, after trimming.
pub const MIN_USERNAME_CHARS: usize = 2;

const STAT_NAMES: &[&str] = &["started", "succeeded", "failed", "approvals", "busy"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateBattle {
    pub category: String,
    pub entry_fee: TokenAmount,
    pub media_ref: ContentHash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinBattle {
    pub battle_id: BattleId,
    pub media_ref: ContentHash,
    /// The battle's entry fee; joining stakes the same amount.
    pub entry_fee: TokenAmount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastVote {
    pub battle_id: BattleId,
    pub creator: Address,
    pub amount: TokenAmount,
}

/// Result of a confirmed battle creation.
///
/// The new id is recovered from the `BattleCreated` event when the receipt
/// carries one; otherwise only the transaction hash is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleCreation {
    Decoded(BattleId),
    Unconfirmed(TxHash),
}

impl BattleCreation {
    pub fn battle_id(&self) -> Option<BattleId> {
        match self {
            Self::Decoded(id) => Some(*id),
            Self::Unconfirmed(_) => None,
        }
    }
}

/// Clears the in-flight flag when a run ends. A run whose future is dropped
/// before reaching a terminal step is moved to `Error` with `Cancelled`.
struct InFlight<'a, C: ChainClient + ?Sized>(&'a TxWorkflow<C>);

impl<C: ChainClient + ?Sized> Drop for InFlight<'_, C> {
    fn drop(&mut self) {
        let workflow = self.0;
        if workflow.state.borrow().is_busy() {
            workflow.fail(WorkflowError::Cancelled);
        }
        workflow.in_flight.store(false, Ordering::Release);
    }
}

pub struct TxWorkflow<C: ?Sized> {
    client: Option<Arc<C>>,
    state: watch::Sender<WorkflowState>,
    trail: Mutex<Vec<WorkflowStep>>,
    in_flight: AtomicBool,
    cache: Arc<ReadCache>,
    stats: StatsCounter,
}

impl<C: ChainClient + ?Sized> TxWorkflow<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self::build(Some(client))
    }

    /// A workflow with no chain client; every operation fails with
    /// `ClientUnavailable`.
    pub fn without_client() -> Self {
        Self::build(None)
    }

    fn build(client: Option<Arc<C>>) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            client,
            state,
            trail: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            cache: Arc::new(ReadCache::new()),
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    /// Share a read cache with other consumers (e.g. a `BattleFeed`).
    pub fn with_cache(mut self, cache: Arc<ReadCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.borrow().step
    }

    /// Steps taken by the most recent run, starting at `Idle`.
    pub fn last_run(&self) -> Vec<WorkflowStep> {
        self.trail().clone()
    }

    pub fn cache(&self) -> &Arc<ReadCache> {
        &self.cache
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Return to `Idle` and clear the error. Ignored while a run is in
    /// flight; returns whether the reset happened.
    pub fn reset(&self) -> bool {
        if self.is_in_flight() {
            tracing::warn!(step = %self.step(), "reset ignored while a transaction is in flight");
            return false;
        }
        self.state.send_replace(WorkflowState::default());
        true
    }

    // ── Operations ──────────────────────────────────────────────────────

    pub async fn create_battle(&self, req: CreateBattle) -> Result<BattleCreation, WorkflowError> {
        self.run(|client, owner| async move {
            self.ensure_allowance(&*client, owner, req.entry_fee).await?;
            self.transition(WorkflowStep::CreatingBattle)?;
            let tx = client
                .create_battle(&req.category, req.entry_fee, &req.media_ref)
                .await?;
            tracing::info!(%tx, category = %req.category, entry_fee = %req.entry_fee, "battle creation submitted");

            let receipt = self.confirm(&*client, tx).await?;
            let contract = client.deployment().battle_contract;
            Ok(match find_battle_created(&receipt, &contract) {
                Some(event) => {
                    tracing::info!(battle_id = %event.battle_id, "battle created");
                    BattleCreation::Decoded(event.battle_id)
                }
                None => {
                    tracing::warn!(%tx, "no BattleCreated event in receipt, returning tx hash");
                    BattleCreation::Unconfirmed(tx)
                }
            })
        })
        .await
    }

    pub async fn join_battle(&self, req: JoinBattle) -> Result<TxHash, WorkflowError> {
        self.run(|client, owner| async move {
            self.ensure_allowance(&*client, owner, req.entry_fee).await?;
            self.transition(WorkflowStep::JoiningBattle)?;
            let tx = client.join_battle(req.battle_id, &req.media_ref).await?;
            tracing::info!(%tx, battle_id = %req.battle_id, "join submitted");
            self.confirm(&*client, tx).await?;
            Ok(tx)
        })
        .await
    }

    pub async fn vote(&self, req: CastVote) -> Result<TxHash, WorkflowError> {
        self.run(|client, owner| async move {
            self.ensure_allowance(&*client, owner, req.amount).await?;
            self.transition(WorkflowStep::Voting)?;
            let tx = client.vote(req.battle_id, req.creator, req.amount).await?;
            tracing::info!(%tx, battle_id = %req.battle_id, creator = %req.creator, amount = %req.amount, "vote submitted");
            self.confirm(&*client, tx).await?;
            Ok(tx)
        })
        .await
    }

    pub async fn end_battle(&self, battle_id: BattleId) -> Result<TxHash, WorkflowError> {
        self.run(|client, _| async move {
            self.transition(WorkflowStep::EndingBattle)?;
            let tx = client.end_battle(battle_id).await?;
            tracing::info!(%tx, %battle_id, "end battle submitted");
            self.confirm(&*client, tx).await?;
            Ok(tx)
        })
        .await
    }

    pub async fn register(&self, username: &str) -> Result<TxHash, WorkflowError> {
        self.run(|client, _| async move {
            let name = validate_username(username)?;
            self.transition(WorkflowStep::Registering)?;
            let tx = client.register_user(name).await?;
            tracing::info!(%tx, username = name, "registration submitted");
            self.confirm(&*client, tx).await?;
            Ok(tx)
        })
        .await
    }

    pub async fn update_username(&self, username: &str) -> Result<TxHash, WorkflowError> {
        self.run(|client, _| async move {
            let name = validate_username(username)?;
            self.transition(WorkflowStep::UpdatingUsername)?;
            let tx = client.update_username(name).await?;
            tracing::info!(%tx, username = name, "username update submitted");
            self.confirm(&*client, tx).await?;
            Ok(tx)
        })
        .await
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn trail(&self) -> MutexGuard<'_, Vec<WorkflowStep>> {
        self.trail.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run<T, F, Fut>(&self, body: F) -> Result<T, WorkflowError>
    where
        F: FnOnce(Arc<C>, Address) -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let _guard = self.begin()?;
        let (client, owner) = match self.preconditions() {
            Ok(ready) => ready,
            Err(e) => return Err(self.fail(e)),
        };
        let outcome = body(Arc::clone(&client), owner).await;
        self.finish(&*client, owner, outcome).await
    }

    fn begin(&self) -> Result<InFlight<'_, C>, WorkflowError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.stats.increment("busy");
            tracing::warn!(step = %self.step(), "rejecting workflow: another is in flight");
            return Err(WorkflowError::Busy);
        }
        self.stats.increment("started");
        self.state.send_replace(WorkflowState::default());
        *self.trail() = vec![WorkflowStep::Idle];
        Ok(InFlight(self))
    }

    fn preconditions(&self) -> Result<(Arc<C>, Address), WorkflowError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| WorkflowError::ClientUnavailable("no chain client configured".into()))?;
        let owner = client.account().ok_or(WorkflowError::NoWallet)?;
        Ok((Arc::clone(client), owner))
    }

    fn transition(&self, next: WorkflowStep) -> Result<(), WorkflowError> {
        let current = self.step();
        current.advance(next)?;
        tracing::debug!(from = %current, to = %next, "workflow step");
        self.state.send_replace(WorkflowState { step: next, error: None });
        self.trail().push(next);
        Ok(())
    }

    /// Move to `Error`, recording `error`. Returns it for propagation.
    fn fail(&self, error: WorkflowError) -> WorkflowError {
        let from = self.step();
        match error.failure() {
            Some(failure) => tracing::warn!(
                step = %from,
                kind = ?failure.kind,
                message = %failure.message,
                "transaction workflow failed"
            ),
            None => tracing::warn!(step = %from, error = %error, "transaction workflow failed"),
        }
        self.stats.increment("failed");
        self.state.send_replace(WorkflowState {
            step: WorkflowStep::Error,
            error: Some(error.clone()),
        });
        self.trail().push(WorkflowStep::Error);
        error
    }

    /// Check the allowance and approve exactly `required` if it falls short.
    /// Returns whether an approval was issued.
    async fn ensure_allowance(
        &self,
        client: &C,
        owner: Address,
        required: TokenAmount,
    ) -> Result<bool, WorkflowError> {
        self.transition(WorkflowStep::CheckingAllowance)?;
        let current = client.allowance(owner).await?;
        if current >= required {
            tracing::debug!(%current, %required, "allowance sufficient");
            return Ok(false);
        }

        self.transition(WorkflowStep::ApprovingTokens)?;
        tracing::info!(%current, %required, "approving token spend");
        let tx = client.approve(required).await?;
        let receipt = client.wait_for_receipt(tx).await?;
        if !receipt.success {
            return Err(ChainError::Reverted { tx_hash: tx }.into());
        }
        self.stats.increment("approvals");
        tracing::info!(%tx, "approval confirmed");
        Ok(true)
    }

    async fn confirm(&self, client: &C, tx: TxHash) -> Result<TxReceipt, WorkflowError> {
        self.transition(WorkflowStep::WaitingConfirmation)?;
        let receipt = client.wait_for_receipt(tx).await?;
        if !receipt.success {
            return Err(ChainError::Reverted { tx_hash: tx }.into());
        }
        tracing::info!(%tx, block = receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    async fn finish<T>(
        &self,
        client: &C,
        owner: Address,
        outcome: Result<T, WorkflowError>,
    ) -> Result<T, WorkflowError> {
        let value = match outcome.and_then(|v| self.transition(WorkflowStep::Success).map(|()| v)) {
            Ok(value) => value,
            Err(e) => return Err(self.fail(e)),
        };
        self.stats.increment("succeeded");
        self.cache.invalidate();
        if let Err(e) = self.cache.refresh(client, Some(owner)).await {
            tracing::warn!(error = %e, "refetch after transaction failed");
        }
        Ok(value)
    }
}

fn validate_username(raw: &str) -> Result<&str, WorkflowError> {
    let name = raw.trim();
    if name.chars().count() < MIN_USERNAME_CHARS {
        return Err(WorkflowError::Validation(format!(
            "Username must be at least {MIN_USERNAME_CHARS} characters"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TxErrorKind;
    use clipclash_nullables::{ChainCall, NullChain, NullOp, DEFAULT_ACCOUNT};
    use clipclash_types::CLASH_DECIMALS;
    use std::time::Duration;
    use WorkflowStep::*;

    fn clash(units: u128) -> TokenAmount {
        TokenAmount::from_units(units, CLASH_DECIMALS).unwrap()
    }

    fn registered_chain() -> Arc<NullChain> {
        let chain = Arc::new(NullChain::new());
        chain.register(DEFAULT_ACCOUNT, "alice");
        chain.fund(DEFAULT_ACCOUNT, clash(1_000));
        chain
    }

    fn create_req(fee: u128) -> CreateBattle {
        CreateBattle {
            category: "dance".into(),
            entry_fee: clash(fee),
            media_ref: ContentHash::new("bafyclipone").unwrap(),
        }
    }

    #[tokio::test]
    async fn create_with_sufficient_allowance_skips_approval() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(50));
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let created = wf.create_battle(create_req(10)).await.unwrap();
        assert_eq!(created, BattleCreation::Decoded(BattleId::new(1)));
        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, CreatingBattle, WaitingConfirmation, Success]
        );
        assert_eq!(chain.count_calls(|c| matches!(c, ChainCall::Approve(_))), 0);
    }

    #[tokio::test]
    async fn create_with_low_allowance_approves_exact_amount_once() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(3));
        let wf = TxWorkflow::new(Arc::clone(&chain));

        wf.create_battle(create_req(10)).await.unwrap();
        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, ApprovingTokens, CreatingBattle, WaitingConfirmation, Success]
        );
        let approvals: Vec<_> = chain
            .calls()
            .into_iter()
            .filter(|c| matches!(c, ChainCall::Approve(_)))
            .collect();
        assert_eq!(approvals, vec![ChainCall::Approve(clash(10))]);
        assert_eq!(wf.stats().get("approvals"), 1);
    }

    #[tokio::test]
    async fn approval_is_confirmed_before_submission() {
        let chain = registered_chain();
        let wf = TxWorkflow::new(Arc::clone(&chain));
        wf.create_battle(create_req(10)).await.unwrap();

        let calls = chain.calls();
        let approve = calls.iter().position(|c| matches!(c, ChainCall::Approve(_))).unwrap();
        let create = calls
            .iter()
            .position(|c| matches!(c, ChainCall::CreateBattle { .. }))
            .unwrap();
        assert!(matches!(calls[approve + 1], ChainCall::WaitForReceipt(_)));
        assert!(approve + 1 < create);
    }

    #[tokio::test]
    async fn missing_event_falls_back_to_tx_hash() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        chain.emit_events(false);
        let wf = TxWorkflow::new(Arc::clone(&chain));

        match wf.create_battle(create_req(10)).await.unwrap() {
            BattleCreation::Unconfirmed(tx) => assert!(!tx.is_zero()),
            other => panic!("expected tx hash fallback, got {other:?}"),
        }
        assert_eq!(wf.step(), Success);
    }

    #[tokio::test]
    async fn no_wallet_fails_before_any_call() {
        let chain = Arc::new(NullChain::new());
        chain.set_account(None);
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.create_battle(create_req(10)).await.unwrap_err();
        assert_eq!(err, WorkflowError::NoWallet);
        assert_eq!(err.to_string(), "No wallet connected");
        assert_eq!(wf.step(), Error);
        assert_eq!(wf.state().error, Some(WorkflowError::NoWallet));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_client_is_reported() {
        let wf: TxWorkflow<NullChain> = TxWorkflow::without_client();
        let err = wf.end_battle(BattleId::new(1)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::ClientUnavailable(_)));
        assert_eq!(wf.last_run(), vec![Idle, Error]);
    }

    #[tokio::test]
    async fn rejected_signature_is_classified() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        chain.fail_next(NullOp::CreateBattle, "User rejected the request.");
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.create_battle(create_req(10)).await.unwrap_err();
        assert_eq!(err.failure().map(|f| f.kind), Some(TxErrorKind::UserRejected));
        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, CreatingBattle, Error]
        );
        assert!(!wf.is_in_flight());
    }

    #[tokio::test]
    async fn fee_below_minimum_is_classified() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.create_battle(create_req(1)).await.unwrap_err();
        assert_eq!(err.failure().map(|f| f.kind), Some(TxErrorKind::EntryFeeTooLow));
    }

    #[tokio::test]
    async fn reverted_approval_stops_the_run() {
        let chain = registered_chain();
        chain.revert_next(NullOp::Approve);
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.create_battle(create_req(10)).await.unwrap_err();
        assert_eq!(err.failure().map(|f| f.kind), Some(TxErrorKind::Reverted));
        assert_eq!(wf.last_run(), vec![Idle, CheckingAllowance, ApprovingTokens, Error]);
        assert_eq!(chain.count_calls(|c| matches!(c, ChainCall::CreateBattle { .. })), 0);
    }

    #[tokio::test]
    async fn reverted_receipt_is_a_failure() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        chain.revert_next(NullOp::CreateBattle);
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.create_battle(create_req(10)).await.unwrap_err();
        assert_eq!(err.failure().map(|f| f.kind), Some(TxErrorKind::Reverted));
        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, CreatingBattle, WaitingConfirmation, Error]
        );
    }

    #[tokio::test]
    async fn second_run_while_in_flight_is_busy() {
        let chain = registered_chain();
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let guard = wf.begin().unwrap();
        assert_eq!(wf.end_battle(BattleId::new(1)).await, Err(WorkflowError::Busy));
        assert!(!wf.reset());
        drop(guard);
        assert!(wf.reset());
        assert_eq!(wf.stats().get("busy"), 1);
    }

    #[tokio::test]
    async fn reset_clears_error() {
        let chain = Arc::new(NullChain::new());
        chain.set_account(None);
        let wf = TxWorkflow::new(chain);
        let _ = wf.end_battle(BattleId::new(1)).await;
        assert_eq!(wf.step(), Error);

        assert!(wf.reset());
        assert_eq!(wf.state(), WorkflowState::default());
    }

    #[tokio::test]
    async fn success_refreshes_cache() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(25));
        let wf = TxWorkflow::new(Arc::clone(&chain));
        wf.cache().store_battles(10, Vec::new());

        wf.create_battle(create_req(10)).await.unwrap();
        assert_eq!(wf.cache().generation(), 1);
        assert_eq!(wf.cache().battle_count(), Some(1));
        assert_eq!(wf.cache().allowance(DEFAULT_ACCOUNT), Some(clash(15)));
        assert!(wf.cache().battles(10).is_none());
    }

    #[tokio::test]
    async fn username_is_validated_before_any_call() {
        let chain = Arc::new(NullChain::new());
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let err = wf.register("  a ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(chain.calls().is_empty());
        assert_eq!(wf.last_run(), vec![Idle, Error]);

        wf.register("  bob ").await.unwrap();
        assert_eq!(chain.profile_of(DEFAULT_ACCOUNT).username, "bob");
        assert_eq!(wf.last_run(), vec![Idle, Registering, WaitingConfirmation, Success]);

        wf.update_username("bobby").await.unwrap();
        assert_eq!(chain.profile_of(DEFAULT_ACCOUNT).username, "bobby");
    }

    #[tokio::test]
    async fn join_stakes_entry_fee() {
        let chain = registered_chain();
        let creator = Address::new([0xc1; 20]);
        chain.set_account(Some(creator));
        chain.register(creator, "carol");
        chain.fund(creator, clash(100));
        chain.set_allowance(creator, clash(10));
        let wf = TxWorkflow::new(Arc::clone(&chain));
        wf.create_battle(create_req(10)).await.unwrap();

        chain.set_account(Some(DEFAULT_ACCOUNT));
        chain.clear_calls();
        wf.join_battle(JoinBattle {
            battle_id: BattleId::new(1),
            media_ref: ContentHash::new("bafyclipreply").unwrap(),
            entry_fee: clash(10),
        })
        .await
        .unwrap();

        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, ApprovingTokens, JoiningBattle, WaitingConfirmation, Success]
        );
        let battle = chain.battle_snapshot(BattleId::new(1)).unwrap();
        assert_eq!(battle.creator2, DEFAULT_ACCOUNT);
        assert_eq!(chain.balance_of(DEFAULT_ACCOUNT), clash(990));
    }

    #[tokio::test]
    async fn observers_see_terminal_state() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        let wf = TxWorkflow::new(chain);
        let mut rx = wf.subscribe();

        wf.create_battle(create_req(10)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().step, Success);
    }

    #[tokio::test]
    async fn dropped_run_ends_in_error() {
        let chain = registered_chain();
        chain.set_allowance(DEFAULT_ACCOUNT, clash(10));
        chain.delay_receipts(Duration::from_secs(30));
        let wf = TxWorkflow::new(Arc::clone(&chain));

        let timed_out = tokio::time::timeout(Duration::from_millis(50), wf.create_battle(create_req(10))).await;
        assert!(timed_out.is_err());

        assert!(!wf.is_in_flight());
        assert!(!wf.state().is_busy());
        assert_eq!(wf.state().error, Some(WorkflowError::Cancelled));
        assert_eq!(
            wf.last_run(),
            vec![Idle, CheckingAllowance, CreatingBattle, WaitingConfirmation, Error]
        );
        assert_eq!(wf.stats().get("failed"), 1);
        assert!(wf.reset());
    }
}
