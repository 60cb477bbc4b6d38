use crate::listing::RawListing;
use serde::Serialize;
use std::fmt::Display;

/// Output of one adapter run
///
/// Built once when the run ends and read through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingResult {
    success: bool,
    listings: Vec<RawListing>,
    errors: Vec<String>,
    total_found: usize,
    total_scraped: usize,
}

impl ScrapingResult {
    /// Builds the result of a finished page loop
    ///
    /// # Arguments
    ///
    /// * `success` - Whether at least one page was fetched
    /// * `listings` - Listings that survived normalization
    /// * `errors` - Page-scoped error messages
    /// * `total_found` - Listing containers located across all pages
    pub fn from_run(
        success: bool,
        listings: Vec<RawListing>,
        errors: Vec<String>,
        total_found: usize,
    ) -> Self {
        let total_scraped = listings.len();
        Self {
            success,
            listings,
            errors,
            total_found,
            total_scraped,
        }
    }

    /// Builds an error-only result
    pub fn failed(error: impl Display) -> Self {
        Self::from_run(false, Vec::new(), vec![error.to_string()], 0)
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn listings(&self) -> &[RawListing] {
        &self.listings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn total_found(&self) -> usize {
        self.total_found
    }

    pub fn total_scraped(&self) -> usize {
        self.total_scraped
    }

    pub fn into_listings(self) -> Vec<RawListing> {
        self.listings
    }
}
