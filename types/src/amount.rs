//! Token amounts in the smallest on-chain unit.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors. The
//! CLASH token uses 18 decimals, so `1 CLASH = 10^18` raw units.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::ClipClashError;

/// Decimals of the CLASH token.
pub const CLASH_DECIMALS: u8 = 18;

/// An ERC-20 amount in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

/// `10^decimals`, or `None` when it does not fit in a u128.
fn unit(decimals: u8) -> Option<u128> {
    10u128.checked_pow(u32::from(decimals))
}

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whole token units, e.g. `from_units(10, 18)` is ten tokens.
    pub fn from_units(units: u128, decimals: u8) -> Option<Self> {
        unit(decimals).and_then(|u| units.checked_mul(u)).map(Self)
    }

    /// Parse a decimal string such as `"2.5"` into raw units.
    pub fn parse_units(text: &str, decimals: u8) -> Result<Self, ClipClashError> {
        let text = text.trim();
        let invalid = |reason: &str| ClipClashError::InvalidAmount(format!("{text:?}: {reason}"));

        let scale = unit(decimals).ok_or_else(|| invalid("too many decimals"))?;
        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty amount"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a decimal number"));
        }
        if frac.len() > usize::from(decimals) {
            return Err(invalid("too many fractional digits"));
        }

        let whole_raw = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| invalid("overflow"))?
        };
        let frac_raw = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = usize::from(decimals));
            padded.parse::<u128>().map_err(|_| invalid("overflow"))?
        };

        whole_raw
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(|| invalid("overflow"))
    }

    /// Integer token units (fraction truncated).
    pub fn whole_units(&self, decimals: u8) -> u128 {
        match unit(decimals) {
            Some(u) => self.0 / u,
            None => 0,
        }
    }

    /// Exact decimal rendering with trailing fractional zeros trimmed.
    pub fn format_units(&self, decimals: u8) -> String {
        let Some(scale) = unit(decimals) else {
            return self.0.to_string();
        };
        let whole = self.0 / scale;
        let frac = self.0 % scale;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:0>width$}", width = usize::from(decimals));
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }

    /// Display rendering: rounded half-up to `max_fraction` digits, thousands
    /// grouped with commas, trailing zeros trimmed (`1234.5` → `"1,234.5"`).
    pub fn format_display(&self, decimals: u8, max_fraction: u8) -> String {
        let max_fraction = max_fraction.min(decimals);
        let (Some(scale), Some(keep)) = (unit(decimals), unit(decimals - max_fraction)) else {
            return self.0.to_string();
        };
        let rounded = self.0.saturating_add(keep / 2) / keep;
        let frac_scale = scale / keep;
        let whole = rounded / frac_scale;
        let frac = rounded % frac_scale;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if frac == 0 {
            grouped
        } else {
            let frac = format!("{frac:0>width$}", width = usize::from(max_fraction));
            format!("{grouped}.{}", frac.trim_end_matches('0'))
        }
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn saturating_mul(self, factor: u128) -> Self {
        Self(self.0.saturating_mul(factor))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = ClipClashError;

    /// Parses a raw (smallest-unit) integer string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|e| ClipClashError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

// Raw amounts routinely exceed 2^53, so they travel as decimal strings.
impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
