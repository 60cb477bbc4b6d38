//! Source adapters
//!
//! A source adapter retrieves and parses the listings of one marketplace.
//! Every marketplace runs through the generic `SiteAdapter`; what differs
//! between them lives in a `SiteDefinition` from the built-in catalog or
//! the configuration.

mod adapter;
mod catalog;
mod metrics;
mod result;

pub use adapter::{PageLoop, SiteAdapter};
pub use catalog::{builtin_sites, merge_sites};
pub use metrics::ScraperMetrics;
pub use result::ScrapingResult;

use crate::HarvestError;
use async_trait::async_trait;

/// Common contract of all marketplace adapters
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Identifier of the source (the site name)
    fn name(&self) -> &str;

    /// Runs the adapter once
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapingResult)` - The run finished; fetch failures are
    ///   reported inside the result
    /// * `Err(HarvestError)` - The adapter could not run at all
    async fn scrape(&self) -> Result<ScrapingResult, HarvestError>;

    /// Snapshot of the counters of the last run
    fn metrics(&self) -> ScraperMetrics;
}
