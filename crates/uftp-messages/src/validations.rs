//! Shared validation helpers and the pattern table.
//!
//! Every regex here is lifted verbatim from the UFTP 3.x schema. Validation
//! runs after parsing and again before sealing, so a value that reaches the
//! wire has always been checked against these rules.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::{MessageError, Result};

fn pattern(re: &str) -> Regex {
    // Anchored so a pattern must cover the whole attribute value.
    Regex::new(&format!("^(?:{re})$")).expect("valid pattern table entry")
}

/// Internet domain of a participant (`agr.dev`, `flex.energy.example`).
pub static DOMAIN: Lazy<Regex> = Lazy::new(|| pattern(r"([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}"));

/// Protocol version, `X.Y.Z`.
pub static VERSION: Lazy<Regex> = Lazy::new(|| pattern(r"\d+\.\d+\.\d+"));

/// Entity address of a connection or congestion point (`ea1.` or `ean.`).
pub static ENTITY_ADDRESS: Lazy<Regex> =
    Lazy::new(|| pattern(r"ea1\.[0-9]{4}-[0-9]{2}\..{1,244}:.{1,244}|ean\.[0-9]{12,34}"));

/// IANA time zone identifier (`Europe/Amsterdam`).
pub static TIME_ZONE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(Africa|America|Australia|Europe|Pacific)/[a-zA-Z0-9_/]{3,}"));

/// ISO 4217 currency code.
pub static CURRENCY: Lazy<Regex> = Lazy::new(|| pattern(r"[A-Z]{3}"));

/// EAN meter identifier.
pub static EAN: Lazy<Regex> = Lazy::new(|| pattern(r"[Ee][0-9]{16}"));

/// Check a string attribute against a pattern from the table.
pub fn check_pattern(field: &'static str, value: &str, re: &Regex) -> Result<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(MessageError::PatternMismatch {
            field,
            value: value.to_string(),
        })
    }
}

/// Parse a decimal attribute value and quantise it to exactly `digits`
/// fraction digits. Non-numeric input is rejected.
pub fn validate_decimal(field: &'static str, value: &str, digits: u32) -> Result<Decimal> {
    let parsed: Decimal = value
        .trim()
        .parse()
        .map_err(|_| MessageError::InvalidDecimal {
            field,
            value: value.to_string(),
        })?;
    Ok(quantize(parsed, digits))
}

/// Quantise a decimal to exactly `digits` fraction digits.
///
/// Values with more precision are rounded (midpoint to even, matching the
/// schema tooling of other UFTP implementations); values with less are
/// padded with trailing zeroes.
pub fn quantize(value: Decimal, digits: u32) -> Decimal {
    let mut rounded = value.round_dp(digits);
    rounded.rescale(digits);
    rounded
}

/// Check that a decimal lies within `[min, max]` inclusive.
pub fn check_range(field: &'static str, value: Decimal, min: Decimal, max: Decimal) -> Result<()> {
    if value < min || value > max {
        return Err(MessageError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Check that a list has at least `minimum` entries.
pub fn validate_list<T>(field: &'static str, value: &[T], minimum: usize) -> Result<()> {
    if value.len() < minimum {
        return Err(MessageError::ListTooShort {
            field,
            minimum,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Check that a series of `(start, duration)` ISP rows is non-empty and
/// free of overlaps. `start` is 1-based; a row covers the half-open range
/// `[start, start + duration)`.
pub fn validate_isp_series<I>(field: &'static str, rows: I) -> Result<()>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut ranges: Vec<(u32, u32)> = rows
        .into_iter()
        .map(|(start, duration)| (start, start.saturating_add(duration.max(1))))
        .collect();
    validate_list(field, &ranges, 1)?;
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(MessageError::IspOverlap { field });
        }
    }
    Ok(())
}

/// Serde adapter for decimal attributes quantised to 4 fraction digits
/// (prices, penalties, settlement amounts).
pub mod decimal4 {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::quantize(*value, 4).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::validate_decimal("decimal", &raw, 4).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for decimal attributes quantised to 2 fraction digits
/// (activation factors).
pub mod decimal2 {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::quantize(*value, 2).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::validate_decimal("decimal", &raw, 2).map_err(serde::de::Error::custom)
    }
}
