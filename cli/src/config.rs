//! Client configuration: TOML file, then flag and environment overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clipclash_chain::Deployment;
use clipclash_types::Address;
use clipclash_upload::UploadConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Wallet gateway endpoint that signs, relays and answers reads.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    #[serde(default)]
    pub battle_contract: Address,

    #[serde(default)]
    pub token_contract: Address,

    /// Account to act as. When unset the gateway's connected account is used.
    #[serde(default)]
    pub account: Option<Address>,

    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub upload: UploadConfig,
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8787/gateway".to_string()
}

fn default_chain_id() -> u64 {
    31_337
}

fn default_confirmation_timeout_secs() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            chain_id: default_chain_id(),
            battle_contract: Address::ZERO,
            token_contract: Address::ZERO,
            account: None,
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            upload: UploadConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid client config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn deployment(&self) -> Deployment {
        Deployment {
            chain_id: self.chain_id,
            battle_contract: self.battle_contract,
            token: self.token_contract,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

/// Values from flags or the environment; each set field wins over the file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_url: Option<String>,
    pub chain_id: Option<u64>,
    pub battle_contract: Option<Address>,
    pub token_contract: Option<Address>,
    pub account: Option<Address>,
    pub pinata_api_key: Option<String>,
    pub pinata_secret_key: Option<String>,
    pub use_public_ipfs: bool,
    pub log_format: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut ClientConfig) {
        if let Some(url) = self.gateway_url {
            config.gateway_url = url;
        }
        if let Some(id) = self.chain_id {
            config.chain_id = id;
        }
        if let Some(addr) = self.battle_contract {
            config.battle_contract = addr;
        }
        if let Some(addr) = self.token_contract {
            config.token_contract = addr;
        }
        if self.account.is_some() {
            config.account = self.account;
        }
        if self.pinata_api_key.is_some() {
            config.upload.pinata_api_key = self.pinata_api_key;
        }
        if self.pinata_secret_key.is_some() {
            config.upload.pinata_secret_key = self.pinata_secret_key;
        }
        config.upload.use_public_ipfs |= self.use_public_ipfs;
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipclash_upload::UploadProvider;
    use std::io::Write;

    const SAMPLE: &str = r#"
gateway_url = "http://wallet.local:9000/rpc"
chain_id = 10143
battle_contract = "0xbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbcbc"
token_contract = "0x7070707070707070707070707070707070707070"
log_level = "debug"

[upload]
simulated_delay_ms = 0
"#;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_file_and_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.chain_id, 10143);
        assert_eq!(config.gateway_url, "http://wallet.local:9000/rpc");
        assert_eq!(config.deployment().battle_contract, Address::new([0xbc; 20]));
        assert_eq!(config.upload.simulated_delay_ms, 0);
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(300));

        ConfigOverrides {
            chain_id: Some(1),
            pinata_api_key: Some("key".into()),
            pinata_secret_key: Some("secret".into()),
            log_level: Some("warn".into()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.gateway_url, "http://wallet.local:9000/rpc");
        assert!(!UploadProvider::from_config(&config.upload).is_simulated());
    }

    #[test]
    fn no_credentials_selects_simulated_upload() {
        let config = ClientConfig::from_toml_str(SAMPLE).unwrap();
        assert!(UploadProvider::from_config(&config.upload).is_simulated());

        let mut keyed = config.clone();
        ConfigOverrides {
            pinata_api_key: Some("key".into()),
            pinata_secret_key: Some("secret".into()),
            use_public_ipfs: true,
            ..Default::default()
        }
        .apply(&mut keyed);
        assert!(UploadProvider::from_config(&keyed.upload).is_simulated());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn bad_address_is_rejected() {
        let err = ClientConfig::from_toml_str("battle_contract = \"0x1234\"").unwrap_err();
        assert!(format!("{err:#}").contains("40 hex"));
    }
}
