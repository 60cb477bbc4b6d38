//! Normalization and classification
//!
//! Turns raw extracted fields into `RawListing`s:
//! - Parses monetary amounts
//! - Classifies the industry against a fixed taxonomy
//! - Derives highlight tags
//! - Applies the site's domain filter and the discard rule

mod filter;
mod highlights;
mod industry;

pub use filter::FbaFilter;
pub use highlights::apply_highlights;
pub use industry::{categories, IndustryClassifier};

use crate::config::SiteDefinition;
use crate::extract::{parse_amount, Amount, ExtractedFields};
use crate::listing::RawListing;
use chrono::{DateTime, Utc};

const UNKNOWN_LOCATION: &str = "Unknown";

/// What happened to one extracted record
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Kept for the adapter's output
    Keep(RawListing),
    /// Dropped by the discard rule
    Discarded,
    /// Dropped by the site's domain filter
    FilteredOut,
}

/// Normalization outcome with the parsed amounts, for metrics
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub disposition: Disposition,
    pub price: Amount,
    pub revenue: Amount,
}

impl Normalized {
    /// Number of amounts that had to be clamped
    pub fn clamped_count(&self) -> u64 {
        u64::from(self.price.is_clamped()) + u64::from(self.revenue.is_clamped())
    }
}

/// Returns true if a listing carries too little information to keep
///
/// A listing with no asking price, no revenue and a description shorter
/// than `MIN_DESCRIPTION_LEN` is discarded.
pub fn should_discard(listing: &RawListing) -> bool {
    listing.is_trivial()
}

/// Per-site normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    source_label: String,
    classifier: IndustryClassifier,
    fba_filter: Option<FbaFilter>,
    highlight_limit: usize,
}

impl Normalizer {
    /// Builds the normalizer for a site
    pub fn from_site(site: &SiteDefinition, highlight_limit: usize) -> Self {
        Self {
            source_label: site.source_label.clone(),
            classifier: IndustryClassifier::new(site.default_industry.clone()),
            fba_filter: site.fba_only.then_some(FbaFilter),
            highlight_limit,
        }
    }

    /// Normalizes one extracted record
    ///
    /// # Arguments
    ///
    /// * `fields` - Raw fields from one listing container
    /// * `scraped_at` - Extraction timestamp
    pub fn normalize(&self, fields: ExtractedFields, scraped_at: DateTime<Utc>) -> Normalized {
        let price = fields
            .price_text
            .as_deref()
            .map(parse_amount)
            .unwrap_or(Amount::Rejected);
        let revenue = fields
            .revenue_text
            .as_deref()
            .map(parse_amount)
            .unwrap_or(Amount::Rejected);

        let mut listing = RawListing::new(fields.name, self.source_label.clone());
        listing.description = fields.description;
        listing.asking_price = price.value();
        listing.annual_revenue = revenue.value();
        listing.location = fields
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
        listing.image_url = fields.image_url;
        listing.original_url = fields.url;
        listing.scraped_at = scraped_at;

        let disposition = if should_discard(&listing) {
            tracing::trace!("Discarding trivial listing {:?}", listing.name);
            Disposition::Discarded
        } else if self
            .fba_filter
            .is_some_and(|filter| !filter.accepts(&listing.name, listing.description.as_deref()))
        {
            Disposition::FilteredOut
        } else {
            listing.industry = self.classifier.classify(&[
                fields.industry_text.as_deref().unwrap_or_default(),
                &listing.name,
                listing.description.as_deref().unwrap_or_default(),
            ]);
            apply_highlights(&mut listing, self.highlight_limit);
            Disposition::Keep(listing)
        };

        Normalized {
            disposition,
            price,
            revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContainerStrategy, FieldSelectors};

    fn site(fba_only: bool) -> SiteDefinition {
        SiteDefinition {
            name: "test-market".to_string(),
            source_label: "TestMarket".to_string(),
            start_url: "https://market.example.com/listings".to_string(),
            page_url: None,
            use_proxy: false,
            render_js: None,
            container_selectors: vec![".listing".to_string()],
            container_strategy: ContainerStrategy::FirstMatch,
            fields: FieldSelectors::default(),
            next_page_selectors: Vec::new(),
            default_industry: "Other".to_string(),
            fba_only,
            max_pages: None,
            page_delay_ms: None,
        }
    }

    fn fields(name: &str, price: Option<&str>, description: Option<&str>) -> ExtractedFields {
        ExtractedFields {
            name: name.to_string(),
            price_text: price.map(str::to_string),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_keeps_and_classifies() {
        let normalizer = Normalizer::from_site(&site(false), 3);
        let mut record = fields("Shopify Candle Store", Some("$1.2M"), None);
        record.revenue_text = Some("$800K".to_string());
        record.url = Some("https://market.example.com/biz/1".to_string());

        let normalized = normalizer.normalize(record, Utc::now());
        let Disposition::Keep(listing) = normalized.disposition else {
            panic!("listing should be kept");
        };
        assert_eq!(listing.asking_price, 1_200_000);
        assert_eq!(listing.annual_revenue, 800_000);
        assert_eq!(listing.industry, "E-commerce");
        assert_eq!(listing.location, "Unknown");
        assert_eq!(listing.source, "TestMarket");
        assert_eq!(
            listing.original_url.as_deref(),
            Some("https://market.example.com/biz/1")
        );
    }

    #[test]
    fn test_unmatched_industry_uses_site_default() {
        let normalizer = Normalizer::from_site(&site(false), 3);
        let normalized = normalizer.normalize(fields("Widget Co", Some("$10,000"), None), Utc::now());
        match normalized.disposition {
            Disposition::Keep(listing) => assert_eq!(listing.industry, "Other"),
            other => panic!("unexpected disposition {:?}", other),
        }
    }

    #[test]
    fn test_trivial_records_are_discarded() {
        let normalizer = Normalizer::from_site(&site(false), 3);
        let normalized = normalizer.normalize(
            fields("Mystery Business", Some("Contact broker"), Some("Call us")),
            Utc::now(),
        );
        assert_eq!(normalized.disposition, Disposition::Discarded);
        assert_eq!(normalized.price, Amount::Rejected);
    }

    #[test]
    fn test_fba_filter_drops_unrelated_listings() {
        let normalizer = Normalizer::from_site(&site(true), 3);

        let kept = normalizer.normalize(fields("Amazon FBA Brand", Some("$500K"), None), Utc::now());
        assert!(matches!(kept.disposition, Disposition::Keep(_)));

        let dropped = normalizer.normalize(fields("Plumbing Company", Some("$500K"), None), Utc::now());
        assert_eq!(dropped.disposition, Disposition::FilteredOut);
    }

    #[test]
    fn test_clamped_amounts_are_counted() {
        let normalizer = Normalizer::from_site(&site(false), 3);
        let mut record = fields("Holding Company", Some("$9,000,000,000"), None);
        record.revenue_text = Some("$12,000,000,000".to_string());

        let normalized = normalizer.normalize(record, Utc::now());
        assert_eq!(normalized.clamped_count(), 2);
    }
}
