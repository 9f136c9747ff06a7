//! Newest-first battle listing.

use std::sync::Arc;

use clipclash_chain::{ChainClient, ChainError};
use clipclash_types::{Battle, BattleId};

use crate::cache::ReadCache;

/// Reads the most recent battles from the contract.
///
/// Ids are sequential from 1. Records whose id reads back as 0 do not exist
/// and are skipped; a record that fails to load is logged and skipped so one
/// bad read does not hide the rest of the list.
pub struct BattleFeed<C: ?Sized> {
    client: Arc<C>,
    cache: Option<Arc<ReadCache>>,
}

impl<C: ChainClient + ?Sized> BattleFeed<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client, cache: None }
    }

    /// Serve repeated fetches from `cache` until it is invalidated.
    pub fn with_cache(mut self, cache: Arc<ReadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn fetch(&self, limit: usize) -> Result<Vec<Battle>, ChainError> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.battles(limit)) {
            return Ok(cached);
        }

        let battles = newest_battles(&*self.client, limit).await?;

        if let Some(cache) = &self.cache {
            cache.store_battles(limit, battles.clone());
        }
        Ok(battles)
    }
}

/// Up to `limit` existing battles, newest first.
pub(crate) async fn newest_battles<C: ChainClient + ?Sized>(
    client: &C,
    limit: usize,
) -> Result<Vec<Battle>, ChainError> {
    let count = client.battle_count().await?;
    let mut battles = Vec::with_capacity(limit.min(count as usize));
    let mut id = count;
    while id >= 1 && battles.len() < limit {
        match client.battle(BattleId::new(id)).await {
            Ok(battle) if battle.exists() => battles.push(battle),
            Ok(_) => tracing::debug!(id, "battle id not found"),
            Err(e) => tracing::warn!(id, error = %e, "skipping battle that failed to load"),
        }
        id -= 1;
    }
    Ok(battles)
}
