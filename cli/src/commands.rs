//! Subcommand handlers.
//!
//! Each handler drives the library crates and prints a short, human-readable
//! result to stdout. Progress goes to the tracing subscriber.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clipclash_battle::{creator_names, BattleView, Side};
use clipclash_chain::{ChainClient, GatewayClient};
use clipclash_orchestrator::{
    BattleCreation, BattleFeed, CastVote, CreateBattle, JoinBattle, Notice, ReadCache, TxWorkflow,
};
use clipclash_types::{
    Address, Battle, BattleId, ContentHash, Timestamp, TokenAmount, TokenBalance, TokenInfo,
};
use clipclash_upload::{MediaFile, ProgressReporter, Uploader};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;

/// A connected client plus the shared read cache.
pub struct Session {
    pub config: ClientConfig,
    pub client: Arc<GatewayClient>,
    pub cache: Arc<ReadCache>,
}

impl Session {
    /// Build the gateway client. Without a configured account the gateway is
    /// asked for its connected wallet; failure leaves the session read-only.
    pub async fn open(config: ClientConfig) -> anyhow::Result<Self> {
        let client = GatewayClient::new(&config.gateway_url, config.deployment(), config.account)
            .context("failed to create gateway client")?
            .with_confirmation(config.poll_interval(), config.confirmation_timeout());

        let client = if config.account.is_some() {
            client
        } else {
            let url = client.url().to_string();
            match client.connect().await {
                Ok(connected) => connected,
                Err(e) => {
                    tracing::warn!(gateway = %url, error = %e, "no wallet connected, continuing read-only");
                    GatewayClient::new(&config.gateway_url, config.deployment(), None)?
                        .with_confirmation(config.poll_interval(), config.confirmation_timeout())
                }
            }
        };

        Ok(Self {
            config,
            client: Arc::new(client),
            cache: Arc::new(ReadCache::new()),
        })
    }

    fn workflow(&self) -> TxWorkflow<GatewayClient> {
        TxWorkflow::new(self.client.clone()).with_cache(self.cache.clone())
    }

    async fn token_info(&self) -> TokenInfo {
        match self.client.token_info().await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(error = %e, "token info unavailable, assuming CLASH defaults");
                TokenInfo::default()
            }
        }
    }

    async fn parse_amount(&self, text: &str) -> anyhow::Result<TokenAmount> {
        let info = self.token_info().await;
        TokenAmount::parse_units(text, info.decimals)
            .with_context(|| format!("invalid {} amount {text:?}", info.symbol))
    }

    async fn existing_battle(&self, id: u64) -> anyhow::Result<Battle> {
        let battle = self.client.battle(BattleId::new(id)).await?;
        if !battle.exists() {
            bail!("battle {id} does not exist");
        }
        Ok(battle)
    }
}

/// Log every published workflow step until the workflow is dropped.
fn watch_steps<C: ChainClient + ?Sized>(workflow: &TxWorkflow<C>) -> JoinHandle<()> {
    let mut rx = workflow.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match &state.error {
                Some(e) => tracing::debug!(step = state.step.as_str(), error = %e, "workflow step"),
                None => tracing::info!(step = state.step.as_str(), "workflow step"),
            }
        }
    })
}

/// Print the run outcome the way a toast would show it.
fn report<C: ChainClient + ?Sized>(workflow: &TxWorkflow<C>, success_text: &str) {
    if let Some(notice) = Notice::from_state(&workflow.state(), success_text) {
        println!("{}", notice.text);
    }
    tracing::debug!(
        trail = ?workflow.last_run().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "workflow run finished"
    );
}

// ── Reads ───────────────────────────────────────────────────────────────

pub async fn status(session: &Session) -> anyhow::Result<()> {
    let deployment = session.client.deployment();
    println!("gateway:   {}", session.client.url());
    println!("chain id:  {}", deployment.chain_id);
    println!("contract:  {}", deployment.battle_contract);
    println!("token:     {}", deployment.token);

    let Some(account) = session.client.account() else {
        println!("account:   not connected");
        return Ok(());
    };
    println!("account:   {account}");

    let info = session.token_info().await;
    let balance = session.client.token_balance(account).await?;
    let balance = TokenBalance { raw: balance, info };
    println!("balance:   {} {}", balance.display(), balance.info.symbol);

    let profile = session.client.user_profile(account).await?;
    match profile.display_name() {
        Some(name) if profile.registered() => println!("username:  {name}"),
        _ => println!("username:  not registered"),
    }
    Ok(())
}

#[derive(Serialize)]
struct BattleRow<'a> {
    #[serde(flatten)]
    battle: &'a Battle,
    view: BattleView,
    creator1_name: String,
    creator2_name: String,
}

async fn battle_row<'a>(
    session: &Session,
    battle: &'a Battle,
    decimals: u8,
    now: Timestamp,
) -> BattleRow<'a> {
    let profile1 = session.client.user_profile(battle.creator1).await.ok();
    let profile2 = if battle.has_challenger() {
        session.client.user_profile(battle.creator2).await.ok()
    } else {
        None
    };
    let (creator1_name, creator2_name) = creator_names(battle, profile1.as_ref(), profile2.as_ref());
    BattleRow {
        battle,
        view: BattleView::project(battle, now, decimals),
        creator1_name,
        creator2_name,
    }
}

fn print_row(row: &BattleRow<'_>, symbol: &str) {
    let b = row.battle;
    println!(
        "#{:<4} {:<10} {:<9} {} vs {}  {}%/{}%  prize {} {}  {}",
        b.battle_id.get(),
        b.category,
        row.view.status.as_str(),
        row.creator1_name,
        row.creator2_name,
        row.view.split.left,
        row.view.split.right,
        row.view.prize_pool_display,
        symbol,
        row.view.countdown,
    );
}

pub async fn battles(session: &Session, limit: usize, json: bool) -> anyhow::Result<()> {
    let feed = BattleFeed::new(session.client.clone()).with_cache(session.cache.clone());
    let list = feed.fetch(limit).await?;
    let info = session.token_info().await;
    let now = Timestamp::now();

    let mut rows = Vec::with_capacity(list.len());
    for battle in &list {
        rows.push(battle_row(session, battle, info.decimals, now).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("no battles yet");
    } else {
        for row in &rows {
            print_row(row, &info.symbol);
        }
    }
    Ok(())
}

pub async fn battle(session: &Session, id: u64) -> anyhow::Result<()> {
    let battle = session.existing_battle(id).await?;
    let info = session.token_info().await;
    let row = battle_row(session, &battle, info.decimals, Timestamp::now()).await;
    print_row(&row, &info.symbol);
    if let Some(media) = &battle.media_ref1 {
        println!("  left clip:  {media}");
    }
    if let Some(media) = &battle.media_ref2 {
        println!("  right clip: {media}");
    }
    if battle.has_winner() {
        println!("  winner:     {}", battle.winner);
    }
    Ok(())
}

pub async fn profile(session: &Session, user: Option<Address>) -> anyhow::Result<()> {
    let Some(user) = user.or_else(|| session.client.account()) else {
        bail!("no address given and no wallet connected");
    };
    let profile = session.client.user_profile(user).await?;
    if !profile.registered() {
        println!("{user} is not registered");
        return Ok(());
    }
    let rank = session.client.user_rank(user).await?;
    println!("{} ({user})", profile.display_name().unwrap_or_default());
    println!("  points:      {} (rank {})", profile.points, rank.by_points);
    println!("  reputation:  {} (rank {})", profile.reputation, rank.by_reputation);
    println!("  battles:     {} ({} won)", profile.total_battles, profile.total_wins);
    Ok(())
}

// ── Upload ──────────────────────────────────────────────────────────────

/// Validate and pin a clip, printing its content hash.
pub async fn upload_clip(
    session: &Session,
    path: &Path,
    category: &str,
    title: Option<&str>,
) -> anyhow::Result<ContentHash> {
    let file = MediaFile::read(path).await?;
    let uploader = Uploader::from_config(&session.config.upload);
    if uploader.provider().is_simulated() {
        tracing::warn!("uploading in simulated mode; the content hash is not retrievable");
    }

    let (reporter, mut rx) = ProgressReporter::channel();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let progress = *rx.borrow_and_update();
            tracing::info!(percentage = progress.percentage, loaded = progress.loaded, "upload progress");
        }
    });

    let result = uploader.upload_battle_video(&file, category, title, &reporter).await;
    drop(reporter);
    let _ = watcher.await;

    let uploaded = result?;
    println!("clip:     {}", uploaded.video.hash);
    println!("url:      {}", uploaded.video.url);
    match &uploaded.metadata {
        Ok(hash) => println!("metadata: {hash}"),
        Err(e) => println!("metadata: not pinned ({e})"),
    }
    Ok(uploaded.video.hash)
}

/// Media for create/join: an existing hash, or a file to upload first.
pub enum MediaSource<'a> {
    Hash(ContentHash),
    File { path: &'a Path, title: Option<&'a str> },
}

async fn resolve_media(
    session: &Session,
    media: MediaSource<'_>,
    category: &str,
) -> anyhow::Result<ContentHash> {
    match media {
        MediaSource::Hash(hash) => Ok(hash),
        MediaSource::File { path, title } => upload_clip(session, path, category, title).await,
    }
}

// ── Writes ──────────────────────────────────────────────────────────────

pub async fn create(
    session: &Session,
    category: &str,
    entry_fee: &str,
    media: MediaSource<'_>,
) -> anyhow::Result<()> {
    let entry_fee = session.parse_amount(entry_fee).await?;
    let media_ref = resolve_media(session, media, category).await?;

    let workflow = session.workflow();
    let watcher = watch_steps(&workflow);
    let outcome = workflow
        .create_battle(CreateBattle {
            category: category.to_string(),
            entry_fee,
            media_ref,
        })
        .await;
    report(&workflow, "Battle created");
    watcher.abort();

    match outcome? {
        BattleCreation::Decoded(id) => println!("battle id: {id}"),
        BattleCreation::Unconfirmed(tx) => {
            println!("transaction {tx} confirmed; battle id not found in receipt")
        }
    }
    Ok(())
}

pub async fn join(session: &Session, id: u64, media: MediaSource<'_>) -> anyhow::Result<()> {
    let battle = session.existing_battle(id).await?;
    let media_ref = resolve_media(session, media, &battle.category).await?;

    let workflow = session.workflow();
    let watcher = watch_steps(&workflow);
    let outcome = workflow
        .join_battle(JoinBattle {
            battle_id: battle.battle_id,
            media_ref,
            entry_fee: battle.entry_fee,
        })
        .await;
    report(&workflow, "Joined battle");
    watcher.abort();

    println!("transaction: {}", outcome?);
    Ok(())
}

/// Who a vote goes to.
pub enum VoteTarget {
    Side(Side),
    Creator(Address),
}

pub async fn vote(session: &Session, id: u64, target: VoteTarget, amount: &str) -> anyhow::Result<()> {
    let battle = session.existing_battle(id).await?;
    let creator = match target {
        VoteTarget::Creator(addr) => addr,
        VoteTarget::Side(Side::Left) => battle.creator1,
        VoteTarget::Side(Side::Right) => {
            if !battle.has_challenger() {
                bail!("battle {id} has no challenger yet");
            }
            battle.creator2
        }
    };
    let amount = session.parse_amount(amount).await?;

    let workflow = session.workflow();
    let watcher = watch_steps(&workflow);
    let outcome = workflow
        .vote(CastVote {
            battle_id: battle.battle_id,
            creator,
            amount,
        })
        .await;
    report(&workflow, "Vote cast");
    watcher.abort();

    println!("transaction: {}", outcome?);
    Ok(())
}

pub async fn end(session: &Session, id: u64) -> anyhow::Result<()> {
    let workflow = session.workflow();
    let watcher = watch_steps(&workflow);
    let outcome = workflow.end_battle(BattleId::new(id)).await;
    report(&workflow, "Battle ended");
    watcher.abort();

    println!("transaction: {}", outcome?);
    Ok(())
}

pub async fn register(session: &Session, username: &str) -> anyhow::Result<()> {
    let workflow = session.workflow();
    let outcome = workflow.register(username).await;
    report(&workflow, "Registered");
    println!("transaction: {}", outcome?);
    Ok(())
}

pub async fn rename(session: &Session, username: &str) -> anyhow::Result<()> {
    let workflow = session.workflow();
    let outcome = workflow.update_username(username).await;
    report(&workflow, "Username updated");
    println!("transaction: {}", outcome?);
    Ok(())
}
