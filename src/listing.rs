//! Normalized listing records
//!
//! A `RawListing` is what one marketplace card becomes after extraction and
//! normalization, before it is written to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptions shorter than this carry no information on their own
pub const MIN_DESCRIPTION_LEN: usize = 50;

/// One business-for-sale listing, ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub asking_price: u64,
    pub annual_revenue: u64,
    pub industry: String,
    pub location: String,
    pub source: String,
    pub highlights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl RawListing {
    /// Creates a listing with only the identifying fields set
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            asking_price: 0,
            annual_revenue: 0,
            industry: "Business".to_string(),
            location: String::new(),
            source: source.into(),
            highlights: Vec::new(),
            image_url: None,
            original_url: None,
            scraped_at: Utc::now(),
        }
    }

    /// Returns true if the listing has no price, no revenue and only a
    /// trivially short description
    ///
    /// Such records are dropped at the extraction boundary.
    pub fn is_trivial(&self) -> bool {
        let description_len = self
            .description
            .as_deref()
            .map(|d| d.trim().chars().count())
            .unwrap_or(0);

        self.asking_price == 0 && self.annual_revenue == 0 && description_len < MIN_DESCRIPTION_LEN
    }

    /// Adds a highlight tag unless it is already present or the cap is reached
    pub fn push_highlight(&mut self, tag: &str, limit: usize) -> bool {
        if self.highlights.len() >= limit || self.highlights.iter().any(|h| h == tag) {
            return false;
        }
        self.highlights.push(tag.to_string());
        true
    }
}
