//! Credential-less pinning for development.
//!
//! Nothing leaves the machine. Content ids are `bafy` followed by the
//! lower-case RFC 4648 base32 encoding of the Blake2b-256 digest of the
//! content, so equal bytes always get the same id.

use std::time::Duration;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use clipclash_types::ContentHash;

use crate::error::UploadError;
use crate::media::{MediaFile, UploadOrigin, UploadResult};
use crate::progress::ProgressReporter;

type Blake2b256 = Blake2b<U32>;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);
pub const PUBLIC_GATEWAY: &str = "https://ipfs.io/ipfs";

fn encode_base32(bytes: &[u8]) -> String {
    let mut result = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }
    result
}

/// Content id for `bytes`.
pub fn simulated_cid(bytes: &[u8]) -> Result<ContentHash, UploadError> {
    let digest = Blake2b256::digest(bytes);
    ContentHash::new(format!("bafy{}", encode_base32(&digest)))
        .map_err(|e| UploadError::InvalidResponse(e.to_string()))
}

#[derive(Clone, Debug)]
pub struct SimulatedPinning {
    delay: Duration,
    gateway: String,
}

impl Default for SimulatedPinning {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl SimulatedPinning {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            gateway: PUBLIC_GATEWAY.to_string(),
        }
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into().trim_end_matches('/').to_string();
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn gateway_url(&self, hash: &ContentHash) -> String {
        hash.gateway_url(&self.gateway)
    }

    pub async fn pin_file(
        &self,
        file: &MediaFile,
        progress: &ProgressReporter,
    ) -> Result<UploadResult, UploadError> {
        let total = file.size();
        progress.report(0, total);
        tokio::time::sleep(self.delay).await;

        let hash = simulated_cid(&file.bytes)?;
        tracing::warn!(%hash, name = %file.name, "simulated upload, clip was not pinned");
        progress.report(total, total);
        Ok(UploadResult {
            url: self.gateway_url(&hash),
            hash,
            size: total,
            mime_type: file.mime_type.clone(),
            origin: UploadOrigin::Simulated,
        })
    }

    pub async fn pin_json(&self, document: &serde_json::Value) -> Result<ContentHash, UploadError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| UploadError::InvalidResponse(format!("cannot encode metadata: {e}")))?;
        simulated_cid(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base32_known_vectors() {
        assert_eq!(encode_base32(b""), "");
        assert_eq!(encode_base32(b"f"), "my");
        assert_eq!(encode_base32(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn cid_is_deterministic() {
        let a = simulated_cid(b"clip bytes").unwrap();
        assert_eq!(a, simulated_cid(b"clip bytes").unwrap());
        assert_ne!(a, simulated_cid(b"other bytes").unwrap());
        assert!(a.as_str().starts_with("bafy"));
        // 256 bits -> 52 base32 characters
        assert_eq!(a.as_str().len(), 4 + 52);
    }

    #[tokio::test]
    async fn pins_without_network() {
        let pinning = SimulatedPinning::new(Duration::ZERO);
        let (reporter, rx) = ProgressReporter::channel();
        let file = MediaFile::new("clip.webm", "video/webm", vec![7; 2048]);

        let result = pinning.pin_file(&file, &reporter).await.unwrap();
        assert_eq!(result.origin, UploadOrigin::Simulated);
        assert_eq!(result.url, format!("https://ipfs.io/ipfs/{}", result.hash));
        assert_eq!(result.size, 2048);
        assert!(rx.borrow().is_complete());
    }

    #[test]
    fn default_delay_is_two_seconds() {
        assert_eq!(SimulatedPinning::default().delay(), Duration::from_secs(2));
    }
}
