//! ClipClash command-line client.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clipclash_battle::Side;
use clipclash_types::{Address, ContentHash};
use clipclash_utils::{init_tracing, LogFormat};

use crate::commands::{MediaSource, Session, VoteTarget};
use crate::config::{ClientConfig, ConfigOverrides};

#[derive(Parser)]
#[command(name = "clipclash", about = "ClipClash battle client", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "CLIPCLASH_CONFIG")]
    config: Option<PathBuf>,

    /// Wallet gateway endpoint.
    #[arg(long, global = true, env = "CLIPCLASH_GATEWAY_URL")]
    gateway_url: Option<String>,

    #[arg(long, global = true, env = "CLIPCLASH_CHAIN_ID")]
    chain_id: Option<u64>,

    /// ClipClash battle contract address.
    #[arg(long, global = true, env = "CLIPCLASH_BATTLE_CONTRACT")]
    battle_contract: Option<Address>,

    /// CLASH token contract address.
    #[arg(long, global = true, env = "CLIPCLASH_TOKEN_CONTRACT")]
    token_contract: Option<Address>,

    /// Account to act as (defaults to the gateway's connected wallet).
    #[arg(long, global = true, env = "CLIPCLASH_ACCOUNT")]
    account: Option<Address>,

    #[arg(long, global = true, env = "PINATA_API_KEY", hide_env_values = true)]
    pinata_api_key: Option<String>,

    #[arg(long, global = true, env = "PINATA_SECRET_KEY", hide_env_values = true)]
    pinata_secret_key: Option<String>,

    /// Skip Pinata and simulate pinning even when keys are present.
    #[arg(long, global = true, env = "CLIPCLASH_USE_PUBLIC_IPFS")]
    use_public_ipfs: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "CLIPCLASH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "CLIPCLASH_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct MediaArgs {
    /// Content hash of an already pinned clip.
    #[arg(long)]
    media: Option<ContentHash>,

    /// Clip file to validate and upload first.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the deployment, connected account and balance.
    Status,

    /// List battles, newest first.
    Battles {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one battle.
    Battle { id: u64 },

    /// Validate and pin a clip.
    Upload {
        path: PathBuf,

        #[arg(long)]
        category: String,

        #[arg(long)]
        title: Option<String>,
    },

    /// Open a new battle.
    Create {
        #[arg(long)]
        category: String,

        /// Entry fee in whole tokens, e.g. "10" or "12.5".
        #[arg(long)]
        entry_fee: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        media: MediaArgs,
    },

    /// Join an open battle as the challenger.
    Join {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        media: MediaArgs,
    },

    /// Vote for one side of a live battle.
    Vote {
        id: u64,

        #[arg(long, value_enum, conflicts_with = "creator", required_unless_present = "creator")]
        side: Option<SideArg>,

        #[arg(long)]
        creator: Option<Address>,

        /// Tokens to stake on the vote.
        #[arg(long)]
        amount: String,
    },

    /// Finalize a battle whose voting window has closed.
    End { id: u64 },

    /// Register the connected account.
    Register { username: String },

    /// Change the connected account's username.
    Rename { username: String },

    /// Show a user's profile (defaults to the connected account).
    Profile { address: Option<Address> },
}

impl MediaArgs {
    fn source<'a>(&'a self, title: Option<&'a str>) -> anyhow::Result<MediaSource<'a>> {
        match (&self.media, &self.file) {
            (Some(hash), _) => Ok(MediaSource::Hash(hash.clone())),
            (None, Some(path)) => Ok(MediaSource::File { path, title }),
            (None, None) => anyhow::bail!("either --media or --file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = cli.config.as_ref().map(|path| (path, ClientConfig::load(path)));
    let mut config = match &loaded {
        Some((_, Ok(cfg))) => cfg.clone(),
        _ => ClientConfig::default(),
    };

    ConfigOverrides {
        gateway_url: cli.gateway_url,
        chain_id: cli.chain_id,
        battle_contract: cli.battle_contract,
        token_contract: cli.token_contract,
        account: cli.account,
        pinata_api_key: cli.pinata_api_key,
        pinata_secret_key: cli.pinata_secret_key,
        use_public_ipfs: cli.use_public_ipfs,
        log_format: cli.log_format,
        log_level: cli.log_level,
    }
    .apply(&mut config);

    let format: LogFormat = config.log_format.parse().unwrap_or_else(|e| {
        eprintln!("{e}, using human logs");
        LogFormat::Human
    });
    init_tracing(format, &config.log_level);

    match &loaded {
        Some((path, Ok(_))) => tracing::info!("Loaded config from {}", path.display()),
        Some((path, Err(e))) => {
            tracing::warn!("Failed to load config file {}: {e:#}, using defaults", path.display())
        }
        None => {}
    }

    let session = Session::open(config).await.context("failed to start client")?;

    match &cli.command {
        Command::Status => commands::status(&session).await,
        Command::Battles { limit, json } => commands::battles(&session, *limit, *json).await,
        Command::Battle { id } => commands::battle(&session, *id).await,
        Command::Upload {
            path,
            category,
            title,
        } => commands::upload_clip(&session, path, category, title.as_deref())
            .await
            .map(|_| ()),
        Command::Create {
            category,
            entry_fee,
            title,
            media,
        } => {
            let source = media.source(title.as_deref())?;
            commands::create(&session, category, entry_fee, source).await
        }
        Command::Join { id, title, media } => {
            commands::join(&session, *id, media.source(title.as_deref())?).await
        }
        Command::Vote {
            id,
            side,
            creator,
            amount,
        } => {
            let target = match (side, creator) {
                (_, Some(addr)) => VoteTarget::Creator(*addr),
                (Some(side), None) => VoteTarget::Side((*side).into()),
                (None, None) => anyhow::bail!("either --side or --creator is required"),
            };
            commands::vote(&session, *id, target, amount).await
        }
        Command::End { id } => commands::end(&session, *id).await,
        Command::Register { username } => commands::register(&session, username).await,
        Command::Rename { username } => commands::rename(&session, username).await,
        Command::Profile { address } => commands::profile(&session, *address).await,
    }
}
