//! Transaction hashes and IPFS content identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClipClashError;

/// A 32-byte transaction hash, rendered as `0x` + 64 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ClipClashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0x");
        if digits.len() != 64 {
            return Err(ClipClashError::InvalidTxHash(format!(
                "expected 64 hex characters, got {}",
                digits.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| ClipClashError::InvalidTxHash(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A content-addressed identifier (IPFS CID) for pinned media or metadata.
///
/// Never empty; an absent media reference is `Option<ContentHash>::None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(raw: impl Into<String>) -> Result<Self, ClipClashError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClipClashError::InvalidContentHash("empty content hash".into()));
        }
        if trimmed.chars().any(|c| !c.is_ascii_alphanumeric()) {
            return Err(ClipClashError::InvalidContentHash(format!(
                "{trimmed:?} contains non-alphanumeric characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Map the contract's empty-string convention onto `None`.
    pub fn from_optional(raw: &str) -> Option<Self> {
        Self::new(raw).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gateway URL for this content under `gateway_base` (no trailing slash needed).
    pub fn gateway_url(&self, gateway_base: &str) -> String {
        format!("{}/{}", gateway_base.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = ClipClashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_hash_display_and_parse() {
        let hash = TxHash::new([0xab; 32]);
        let text = hash.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.len(), 66);
        assert_eq!(text.parse::<TxHash>().unwrap(), hash);
    }

    #[test]
    fn tx_hash_rejects_short_input() {
        assert!("0x1234".parse::<TxHash>().is_err());
    }

    #[test]
    fn content_hash_rejects_empty_and_odd_characters() {
        assert!(ContentHash::new("").is_err());
        assert!(ContentHash::new("   ").is_err());
        assert!(ContentHash::new("Qm/../etc").is_err());
        assert_eq!(ContentHash::from_optional(""), None);
    }

    #[test]
    fn content_hash_gateway_url() {
        let cid = ContentHash::new("bafybeigdyrzt").unwrap();
        assert_eq!(
            cid.gateway_url("https://gateway.pinata.cloud/ipfs/"),
            "https://gateway.pinata.cloud/ipfs/bafybeigdyrzt"
        );
    }
}
