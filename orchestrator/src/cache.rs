//! Cached contract reads that depend on workflow outcomes.
//!
//! The contract is the source of truth. Entries here are never mutated
//! optimistically; a successful transaction invalidates them and the values
//! are refetched.

use std::sync::{Mutex, MutexGuard};

use clipclash_chain::{ChainClient, ChainError};
use clipclash_types::{Address, Battle, TokenAmount};

use crate::feed::newest_battles;

#[derive(Default)]
struct Entries {
    battle_count: Option<u64>,
    allowance: Option<(Address, TokenAmount)>,
    /// Battle list together with the limit it was fetched with.
    battles: Option<(usize, Vec<Battle>)>,
    /// Limit of the most recent list, kept across invalidation for refresh.
    list_limit: Option<usize>,
    generation: u64,
}

/// Battle count, allowance and battle list reads shared by workflows and
/// feeds.
#[derive(Default)]
pub struct ReadCache {
    entries: Mutex<Entries>,
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn battle_count(&self) -> Option<u64> {
        self.entries().battle_count
    }

    /// Cached allowance of `owner`, if one is held for that account.
    pub fn allowance(&self, owner: Address) -> Option<TokenAmount> {
        match self.entries().allowance {
            Some((cached, amount)) if cached == owner => Some(amount),
            _ => None,
        }
    }

    pub fn battles(&self, limit: usize) -> Option<Vec<Battle>> {
        match &self.entries().battles {
            Some((cached_limit, list)) if *cached_limit == limit => Some(list.clone()),
            _ => None,
        }
    }

    pub fn store_battles(&self, limit: usize, battles: Vec<Battle>) {
        let mut entries = self.entries();
        entries.list_limit = Some(limit);
        entries.battles = Some((limit, battles));
    }

    /// Incremented on every invalidation.
    pub fn generation(&self) -> u64 {
        self.entries().generation
    }

    pub fn invalidate(&self) {
        let mut entries = self.entries();
        entries.battle_count = None;
        entries.allowance = None;
        entries.battles = None;
        entries.generation += 1;
        tracing::debug!(generation = entries.generation, "read cache invalidated");
    }

    /// Refetch battle count, the allowance when an account is known, and the
    /// battle list when one has been fetched before.
    pub async fn refresh<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        owner: Option<Address>,
    ) -> Result<(), ChainError> {
        let count = client.battle_count().await?;
        let allowance = match owner {
            Some(owner) => Some((owner, client.allowance(owner).await?)),
            None => None,
        };
        let list_limit = self.entries().list_limit;
        let battles = match list_limit {
            Some(limit) => Some((limit, newest_battles(client, limit).await?)),
            None => None,
        };
        let mut entries = self.entries();
        entries.battle_count = Some(count);
        entries.allowance = allowance;
        if battles.is_some() {
            entries.battles = battles;
        }
        Ok(())
    }
}
