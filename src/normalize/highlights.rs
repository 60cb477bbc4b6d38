//! Highlight tags
//!
//! Short selling points derived from a listing's text and numbers.

use crate::listing::RawListing;
use regex::Regex;
use std::sync::OnceLock;

/// Revenue above which a business counts as established without other hints
const ESTABLISHED_REVENUE: u64 = 1_000_000;

/// Ordered `(tag, pattern)` checks over name and description
const TEXT_CHECKS: &[(&str, &str)] = &[
    ("Profitable", r"\bprofitable\b|\bprofit\b|net income"),
    ("Established", r"established|since\s+(?:19|20)\d{2}|\b\d{2,}\+?\s+years?\b"),
    ("Growing", r"growing|growth|\byoy\b|year[\s-]over[\s-]year|expanding"),
    ("Turnkey", r"turn-?key|absentee|semi-absentee|owner[\s-]operator optional"),
    ("Strong Cash Flow", r"cash\s*flow|\bsde\b|\bebitda\b"),
    ("Equipment Included", r"equipment\s+(?:is\s+)?included|includes\s+(?:all\s+)?equipment|\bff&e\b"),
    ("Inventory Included", r"inventory\s+(?:is\s+)?included|includes\s+(?:all\s+)?inventory"),
];

/// Negated profit wording, blanked out before the checks run
fn negated_profit() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:un|non[\s-]?|not\s+)profit(?:able)?\b")
            .expect("negated profit pattern is valid")
    })
}

fn compiled() -> &'static [(&'static str, Regex)] {
    static TABLE: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TEXT_CHECKS
            .iter()
            .map(|(tag, pattern)| {
                let regex =
                    Regex::new(&format!("(?i){}", pattern)).expect("highlight patterns are valid");
                (*tag, regex)
            })
            .collect()
    })
}

/// Adds highlight tags to a listing, at most `limit` in total
///
/// Tags are checked in a fixed order; a tag already present is not added
/// twice.
pub fn apply_highlights(listing: &mut RawListing, limit: usize) {
    let text = format!(
        "{} {}",
        listing.name,
        listing.description.as_deref().unwrap_or_default()
    );
    let text = negated_profit().replace_all(&text, " ");

    for (tag, regex) in compiled() {
        let numeric_hint = *tag == "Established" && listing.annual_revenue >= ESTABLISHED_REVENUE;
        if numeric_hint || regex.is_match(&text) {
            listing.push_highlight(tag, limit);
        }
        if listing.highlights.len() >= limit {
            break;
        }
    }
}
