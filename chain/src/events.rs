//! Best-effort decoding of contract events from receipt logs.
//!
//! Only `BattleCreated` is needed: it carries the id the contract assigned to a
//! new battle. A receipt holds many logs (token transfers, approvals, points
//! updates), so anything that does not decode as `BattleCreated` is skipped.

use clipclash_types::{Address, BattleId, TokenAmount};
use thiserror::Error;

use crate::receipt::{LogEntry, TxReceipt};

/// `keccak256("BattleCreated(uint256,address,string,uint256)")`.
///
/// `battleId` and `creator` are indexed; `category` and `entryFee` are in data.
pub const BATTLE_CREATED_TOPIC: &str =
    "0x2152d3c37fc1215ab177ca585f7d13fd244b82e228181d3d4168ac39f23f0fde";

const WORD: usize = 32;

/// A decoded `BattleCreated` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleCreatedEvent {
    pub battle_id: BattleId,
    pub creator: Address,
    pub category: String,
    pub entry_fee: TokenAmount,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a BattleCreated log")]
    WrongEvent,
    #[error("expected 3 topics, found {0}")]
    TopicCount(usize),
    #[error("malformed hex: {0}")]
    Hex(String),
    #[error("value does not fit: {0}")]
    Overflow(&'static str),
    #[error("data too short")]
    Truncated,
    #[error("category is not UTF-8")]
    Utf8,
}

fn decode_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| DecodeError::Hex(e.to_string()))
}

fn decode_word(text: &str) -> Result<[u8; WORD], DecodeError> {
    let bytes = decode_hex(text)?;
    bytes.try_into().map_err(|_| DecodeError::Hex(format!("{text} is not 32 bytes")))
}

/// Big-endian uint256 word as u128, rejecting values above u128::MAX.
fn word_to_u128(word: &[u8], what: &'static str) -> Result<u128, DecodeError> {
    let (high, low) = word.split_at(WORD - 16);
    if high.iter().any(|&b| b != 0) {
        return Err(DecodeError::Overflow(what));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

fn word_to_u64(word: &[u8], what: &'static str) -> Result<u64, DecodeError> {
    u64::try_from(word_to_u128(word, what)?).map_err(|_| DecodeError::Overflow(what))
}

fn data_word(data: &[u8], index: usize) -> Result<&[u8], DecodeError> {
    let start = index * WORD;
    data.get(start..start + WORD).ok_or(DecodeError::Truncated)
}

fn u128_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

impl BattleCreatedEvent {
    /// Decode a single log.
    pub fn decode(log: &LogEntry) -> Result<Self, DecodeError> {
        let topic0 = log.topics.first().ok_or(DecodeError::WrongEvent)?;
        if !topic0.eq_ignore_ascii_case(BATTLE_CREATED_TOPIC) {
            return Err(DecodeError::WrongEvent);
        }
        if log.topics.len() != 3 {
            return Err(DecodeError::TopicCount(log.topics.len()));
        }

        let id_word = decode_word(&log.topics[1])?;
        let battle_id = BattleId::new(word_to_u64(&id_word, "battleId")?);

        let creator_word = decode_word(&log.topics[2])?;
        if creator_word[..12].iter().any(|&b| b != 0) {
            return Err(DecodeError::Overflow("creator"));
        }
        let mut creator = [0u8; 20];
        creator.copy_from_slice(&creator_word[12..]);

        let data = decode_hex(&log.data)?;
        let offset = usize::try_from(word_to_u64(data_word(&data, 0)?, "category offset")?)
            .map_err(|_| DecodeError::Overflow("category offset"))?;
        let entry_fee = TokenAmount::new(word_to_u128(data_word(&data, 1)?, "entryFee")?);

        let len_end = offset.checked_add(WORD).ok_or(DecodeError::Truncated)?;
        let len_word = data.get(offset..len_end).ok_or(DecodeError::Truncated)?;
        let len = usize::try_from(word_to_u64(len_word, "category length")?)
            .map_err(|_| DecodeError::Overflow("category length"))?;
        let end = len_end.checked_add(len).ok_or(DecodeError::Truncated)?;
        let raw = data.get(len_end..end).ok_or(DecodeError::Truncated)?;
        let category = String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::Utf8)?;

        Ok(Self {
            battle_id,
            creator: Address::new(creator),
            category,
            entry_fee,
        })
    }

    /// ABI-encode this event as a log emitted by `contract`.
    pub fn to_log(&self, contract: Address) -> LogEntry {
        let mut creator_word = [0u8; WORD];
        creator_word[12..].copy_from_slice(self.creator.as_bytes());

        let category = self.category.as_bytes();
        let padded_len = category.len().div_ceil(WORD) * WORD;
        let mut data = Vec::with_capacity(3 * WORD + padded_len);
        data.extend_from_slice(&u128_word(2 * WORD as u128));
        data.extend_from_slice(&u128_word(self.entry_fee.raw()));
        data.extend_from_slice(&u128_word(category.len() as u128));
        data.extend_from_slice(category);
        data.resize(3 * WORD + padded_len, 0);

        LogEntry {
            address: contract,
            topics: vec![
                BATTLE_CREATED_TOPIC.to_string(),
                format!("0x{}", hex::encode(u128_word(u128::from(self.battle_id.get())))),
                format!("0x{}", hex::encode(creator_word)),
            ],
            data: format!("0x{}", hex::encode(data)),
        }
    }
}

/// The first `BattleCreated` event emitted by `contract` in `receipt`.
///
/// Logs that fail to decode are skipped; `None` means no log matched.
pub fn find_battle_created(receipt: &TxReceipt, contract: &Address) -> Option<BattleCreatedEvent> {
    for log in receipt.logs_from(contract) {
        match BattleCreatedEvent::decode(log) {
            Ok(event) => return Some(event),
            Err(DecodeError::WrongEvent) => {}
            Err(e) => tracing::debug!(tx = %receipt.tx_hash, "skipping undecodable log: {e}"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipclash_types::TxHash;

    fn contract() -> Address {
        Address::new([0xcc; 20])
    }

    fn event(id: u64) -> BattleCreatedEvent {
        BattleCreatedEvent {
            battle_id: BattleId::new(id),
            creator: Address::new([0x11; 20]),
            category: "street dance".into(),
            entry_fee: TokenAmount::new(10_000_000_000_000_000_000),
        }
    }

    fn transfer_log() -> LogEntry {
        LogEntry {
            address: Address::new([0xdd; 20]),
            topics: vec![
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".into(),
            ],
            data: format!("0x{}", "00".repeat(32)),
        }
    }

    fn receipt(logs: Vec<LogEntry>) -> TxReceipt {
        TxReceipt {
            tx_hash: TxHash::new([7; 32]),
            block_number: 10,
            success: true,
            logs,
        }
    }

    #[test]
    fn decodes_encoded_event() {
        let log = event(42).to_log(contract());
        assert_eq!(BattleCreatedEvent::decode(&log).unwrap(), event(42));
    }

    #[test]
    fn finds_event_among_other_logs() {
        let logs = vec![transfer_log(), event(5).to_log(contract()), transfer_log()];
        let found = find_battle_created(&receipt(logs), &contract()).unwrap();
        assert_eq!(found.battle_id, BattleId::new(5));
        assert_eq!(found.category, "street dance");
    }

    #[test]
    fn ignores_events_from_other_contracts() {
        let logs = vec![event(5).to_log(Address::new([0xee; 20]))];
        assert_eq!(find_battle_created(&receipt(logs), &contract()), None);
    }

    #[test]
    fn skips_malformed_log_and_keeps_looking() {
        let mut broken = event(1).to_log(contract());
        broken.data = "0x1234".into();
        let logs = vec![broken, event(2).to_log(contract())];
        let found = find_battle_created(&receipt(logs), &contract()).unwrap();
        assert_eq!(found.battle_id, BattleId::new(2));
    }

    #[test]
    fn wrong_topic_is_wrong_event() {
        assert_eq!(BattleCreatedEvent::decode(&transfer_log()), Err(DecodeError::WrongEvent));
    }

    #[test]
    fn truncated_data_is_an_error() {
        let mut log = event(1).to_log(contract());
        log.data = format!("0x{}", "00".repeat(40));
        assert_eq!(BattleCreatedEvent::decode(&log), Err(DecodeError::Truncated));
    }
}
