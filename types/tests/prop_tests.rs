use proptest::prelude::*;

use clipclash_types::{Address, Timestamp, TokenAmount, TxHash};

proptest! {
    /// Address display/parse roundtrip for arbitrary bytes.
    #[test]
    fn address_display_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address parsing is case-insensitive.
    #[test]
    fn address_parse_ignores_case(bytes in prop::array::uniform20(0u8..)) {
        let upper = format!("0x{}", hex_upper(&bytes));
        let parsed: Address = upper.parse().unwrap();
        prop_assert_eq!(parsed, Address::new(bytes));
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// TxHash display/parse roundtrip.
    #[test]
    fn tx_hash_display_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let parsed: TxHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// format_units then parse_units yields the same raw amount.
    #[test]
    fn token_amount_units_roundtrip(raw in 0u128..u128::MAX / 2, decimals in 0u8..=18) {
        let amount = TokenAmount::new(raw);
        let text = amount.format_units(decimals);
        prop_assert_eq!(TokenAmount::parse_units(&text, decimals).unwrap(), amount);
    }

    /// whole_units never exceeds the exact decimal value.
    #[test]
    fn token_amount_whole_units(units in 0u128..1_000_000_000, dust in 0u128..1_000_000_000_000_000_000) {
        let amount = TokenAmount::from_units(units, 18).unwrap().saturating_add(TokenAmount::new(dust));
        prop_assert_eq!(amount.whole_units(18), units);
    }

    /// seconds_from and remaining_from agree when the deadline is ahead.
    #[test]
    fn timestamp_remaining_matches_signed_diff(now in 0u64..1_000_000_000, ahead in 0u64..1_000_000) {
        let end = Timestamp::new(now + ahead);
        let now = Timestamp::new(now);
        prop_assert_eq!(end.seconds_from(now), ahead as i64);
        prop_assert_eq!(end.remaining_from(now), ahead);
    }

    /// remaining_from saturates once the deadline has passed.
    #[test]
    fn timestamp_remaining_saturates(end in 0u64..1_000_000, behind in 1u64..1_000_000) {
        let end_ts = Timestamp::new(end);
        let now = Timestamp::new(end + behind);
        prop_assert_eq!(end_ts.remaining_from(now), 0);
        prop_assert_eq!(end_ts.seconds_from(now), -(behind as i64));
        prop_assert!(!end_ts.is_after(now));
    }
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
