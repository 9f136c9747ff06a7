//! Upload provider settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::UploadError;
use crate::pinata::{PinataCredentials, DEFAULT_API_URL, DEFAULT_GATEWAY};
use crate::simulated::PUBLIC_GATEWAY;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Pinata API key. Usually supplied through `PINATA_API_KEY`.
    #[serde(default)]
    pub pinata_api_key: Option<String>,

    /// Pinata secret key. Usually supplied through `PINATA_SECRET_KEY`.
    #[serde(default)]
    pub pinata_secret_key: Option<String>,

    /// Skip Pinata and simulate uploads.
    #[serde(default)]
    pub use_public_ipfs: bool,

    #[serde(default = "default_api_url")]
    pub pinata_api_url: String,

    #[serde(default = "default_gateway")]
    pub pinata_gateway_url: String,

    /// Gateway used for simulated content ids.
    #[serde(default = "default_public_gateway")]
    pub public_gateway_url: String,

    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_gateway() -> String {
    DEFAULT_GATEWAY.to_string()
}

fn default_public_gateway() -> String {
    PUBLIC_GATEWAY.to_string()
}

fn default_simulated_delay_ms() -> u64 {
    2_000
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            pinata_api_key: None,
            pinata_secret_key: None,
            use_public_ipfs: false,
            pinata_api_url: default_api_url(),
            pinata_gateway_url: default_gateway(),
            public_gateway_url: default_public_gateway(),
            simulated_delay_ms: default_simulated_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UploadConfig {
    pub fn credentials(&self) -> Result<PinataCredentials, UploadError> {
        match (&self.pinata_api_key, &self.pinata_secret_key) {
            (Some(key), Some(secret)) => PinataCredentials::new(key.as_str(), secret.as_str()),
            _ => Err(UploadError::MissingCredentials),
        }
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
