//! Monetary amount parsing
//!
//! Marketplace cards print money in many shapes: `$45,000`, `$950K`,
//! `$1.2M`, `USD 2.5 million`. `parse_amount` turns them into whole
//! dollars and reports whether the value had to be clamped.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Largest amount the store's integer columns accept
pub const MAX_SAFE_AMOUNT: u64 = 2_147_483_647;

/// Result of parsing a monetary text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Amount {
    /// Parsed within range
    Valid(u64),
    /// Parsed but above `MAX_SAFE_AMOUNT`; `value` is the bound
    Clamped { value: u64, original: u64 },
    /// No number could be read from the text
    Rejected,
}

impl Amount {
    /// The value to persist; rejected amounts count as zero
    pub fn value(&self) -> u64 {
        match self {
            Amount::Valid(v) => *v,
            Amount::Clamped { value, .. } => *value,
            Amount::Rejected => 0,
        }
    }

    pub fn is_clamped(&self) -> bool {
        matches!(self, Amount::Clamped { .. })
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?|\.\d+)\s*(thousand|million|mm|k|m)?\b")
            .expect("amount pattern is valid")
    })
}

/// Parses a monetary text into whole dollars
///
/// Separators other than the decimal point are dropped, a trailing
/// magnitude marker (`K`, `M`, `thousand`, `million`) multiplies the
/// value, and the result is floored and clamped to `MAX_SAFE_AMOUNT`.
///
/// # Example
///
/// ```
/// use listing_harvester::extract::{parse_amount, Amount};
///
/// assert_eq!(parse_amount("$1.2M"), Amount::Valid(1_200_000));
/// assert_eq!(parse_amount("$950K"), Amount::Valid(950_000));
/// assert_eq!(parse_amount("$45,000"), Amount::Valid(45_000));
/// assert_eq!(parse_amount("Contact broker"), Amount::Rejected);
/// ```
pub fn parse_amount(text: &str) -> Amount {
    let Some(caps) = number_pattern().captures(text) else {
        return Amount::Rejected;
    };

    let digits: String = caps[1].chars().filter(|c| *c != ',').collect();
    let Ok(base) = digits.parse::<f64>() else {
        return Amount::Rejected;
    };

    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(marker) if marker == "k" || marker == "thousand" => 1_000.0,
        Some(marker) if marker == "m" || marker == "mm" || marker == "million" => 1_000_000.0,
        _ => 1.0,
    };

    let value = (base * multiplier).floor();
    if !value.is_finite() || value < 0.0 {
        return Amount::Rejected;
    }

    // `as` saturates for floats beyond u64
    let whole = value as u64;
    if whole > MAX_SAFE_AMOUNT {
        Amount::Clamped {
            value: MAX_SAFE_AMOUNT,
            original: whole,
        }
    } else {
        Amount::Valid(whole)
    }
}
