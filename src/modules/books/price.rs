//! Exact currency amounts.
//!
//! A `Price` is a signed count of minor units (cents). Text is parsed digit by
//! digit, so `"12.99"` is exactly 1299 cents and never passes through `f64`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MINOR_DIGITS: usize = 2;
const MINOR_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price '{0}' is not a decimal number")]
    Malformed(String),
    #[error("price '{0}' has more than two fractional digits")]
    TooPrecise(String),
    #[error("price '{0}' is out of range")]
    OutOfRange(String),
}

/// Fixed-point amount with two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(PriceError::Empty);
        }

        let (negative, unsigned) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Malformed(raw.to_string()));
        }

        // Trailing zeros past the second digit carry no value ("1.500").
        let significant = fraction.trim_end_matches('0');
        if significant.len() > MINOR_DIGITS {
            return Err(PriceError::TooPrecise(raw.to_string()));
        }

        let out_of_range = || PriceError::OutOfRange(raw.to_string());

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let minor: i64 = format!("{:0<width$}", significant, width = MINOR_DIGITS)
            .parse()
            .map_err(|_| PriceError::Malformed(raw.to_string()))?;

        let cents = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(out_of_range)?;

        Ok(Price(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            magnitude / per_major,
            magnitude % per_major
        )
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        value
            .checked_mul(MINOR_PER_MAJOR)
            .map(Price)
            .ok_or_else(|| E::custom(PriceError::OutOfRange(value.to_string())))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        i64::try_from(value)
            .map_err(|_| E::custom(PriceError::OutOfRange(value.to_string())))
            .and_then(|v| self.visit_i64(v))
    }

    // JSON numbers like 15.99 arrive as f64; their shortest round-trip
    // rendering is the literal the caller wrote, which is then parsed exactly.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        if !value.is_finite() {
            return Err(E::custom(PriceError::Malformed(value.to_string())));
        }
        self.visit_str(&value.to_string())
    }
}
