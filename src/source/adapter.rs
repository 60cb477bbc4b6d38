//! Generic marketplace adapter
//!
//! One engine drives every marketplace: fetch a page, extract its cards,
//! normalize them, and follow the pagination rule of the site definition.

use crate::config::{ScraperConfig, SiteDefinition};
use crate::extract::{Extractor, NextPage};
use crate::fetch::{FetchOptions, Fetcher};
use crate::listing::RawListing;
use crate::normalize::{Disposition, Normalizer};
use crate::source::{ScraperMetrics, ScrapingResult, SourceAdapter};
use crate::url::{expand_page_template, parse_http_url};
use crate::HarvestError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// State of one adapter's page loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoop {
    /// About to fetch page `page` at `url`
    Fetching { page: u32, url: Url },
    /// Finished; `success` is true if at least one page was fetched
    Done { success: bool },
}

/// Adapter for one marketplace, driven by its `SiteDefinition`
pub struct SiteAdapter {
    site: SiteDefinition,
    extractor: Extractor,
    normalizer: Normalizer,
    fetcher: Arc<dyn Fetcher>,
    options: FetchOptions,
    max_pages: u32,
    page_delay: Duration,
    metrics: Mutex<ScraperMetrics>,
}

impl SiteAdapter {
    /// Creates an adapter
    ///
    /// # Arguments
    ///
    /// * `site` - The marketplace definition
    /// * `fetcher` - Fetch layer (proxy or direct)
    /// * `options` - Per-request fetch settings
    /// * `scraper` - Shared scraping settings; the site may override
    ///   `max_pages` and the page delay
    pub fn new(
        site: SiteDefinition,
        fetcher: Arc<dyn Fetcher>,
        options: FetchOptions,
        scraper: &ScraperConfig,
    ) -> Self {
        let max_pages = site.max_pages.unwrap_or(scraper.max_pages).max(1);
        let page_delay = Duration::from_millis(site.page_delay_ms.unwrap_or(scraper.page_delay_ms));

        Self {
            extractor: Extractor::from_site(&site),
            normalizer: Normalizer::from_site(&site, scraper.highlight_limit),
            site,
            fetcher,
            options,
            max_pages,
            page_delay,
            metrics: Mutex::new(ScraperMetrics::default()),
        }
    }

    pub fn site(&self) -> &SiteDefinition {
        &self.site
    }

    /// Extracts and normalizes one fetched page into `listings`
    ///
    /// Returns the number of containers found and the pagination control.
    fn process_page(
        &self,
        html: &str,
        page_url: &Url,
        listings: &mut Vec<RawListing>,
        metrics: &mut ScraperMetrics,
    ) -> (usize, Option<NextPage>) {
        let extraction = self.extractor.extract_page(html, page_url);
        metrics.extraction_errors += extraction.errors.len() as u64;

        let scraped_at = Utc::now();
        for record in extraction.records {
            let normalized = self.normalizer.normalize(record, scraped_at);
            metrics.amounts_clamped += normalized.clamped_count();

            match normalized.disposition {
                Disposition::Keep(listing) => {
                    metrics.listings_found += 1;
                    listings.push(listing);
                }
                Disposition::Discarded => metrics.listings_discarded += 1,
                Disposition::FilteredOut => metrics.listings_filtered += 1,
            }
        }

        tracing::debug!(
            "{}: {} containers on {} ({:?}), {} listings so far",
            self.site.name,
            extraction.containers_found,
            page_url,
            extraction.matched_by,
            listings.len()
        );

        (extraction.containers_found, extraction.next_page)
    }

    /// Decides the state following a successfully fetched page
    ///
    /// # Errors
    ///
    /// Returns an error if the site's page template cannot produce a URL.
    fn advance(
        &self,
        page: u32,
        next: Option<NextPage>,
        visited: &HashSet<Url>,
    ) -> Result<PageLoop, HarvestError> {
        let Some(next) = next else {
            return Ok(PageLoop::Done { success: true });
        };
        if page >= self.max_pages {
            return Ok(PageLoop::Done { success: true });
        }

        let next_page = page + 1;
        let url = match (&self.site.page_url, next.href) {
            (Some(template), _) => expand_page_template(template, next_page)?,
            (None, Some(href)) => parse_http_url(&href)?,
            (None, None) => {
                tracing::debug!(
                    "{}: next control has no link and no page template, stopping",
                    self.site.name
                );
                return Ok(PageLoop::Done { success: true });
            }
        };

        if visited.contains(&url) {
            tracing::debug!("{}: next page {} already fetched, stopping", self.site.name, url);
            return Ok(PageLoop::Done { success: true });
        }

        Ok(PageLoop::Fetching {
            page: next_page,
            url,
        })
    }
}

#[async_trait]
impl SourceAdapter for SiteAdapter {
    fn name(&self) -> &str {
        &self.site.name
    }

    async fn scrape(&self) -> Result<ScrapingResult, HarvestError> {
        let mut metrics = ScraperMetrics::started();
        let mut listings = Vec::new();
        let mut errors = Vec::new();
        let mut total_found = 0;
        let mut pages_fetched = 0u32;
        let mut visited = HashSet::new();

        let mut state = PageLoop::Fetching {
            page: 1,
            url: parse_http_url(&self.site.start_url)?,
        };

        tracing::info!("Scraping {} (up to {} pages)", self.site.name, self.max_pages);

        let success = loop {
            let (page, url) = match state {
                PageLoop::Fetching { page, url } => (page, url),
                PageLoop::Done { success } => break success,
            };

            let html = match self.fetcher.fetch(url.as_str(), &self.options).await {
                Ok(html) => {
                    metrics.record_request(true);
                    html
                }
                Err(e) => {
                    metrics.record_request(false);
                    let message = format!("page {}: {}", page, e);
                    tracing::warn!("{}: {}", self.site.name, message);
                    metrics.record_error(message.clone());
                    errors.push(message);
                    state = PageLoop::Done {
                        success: pages_fetched > 0,
                    };
                    continue;
                }
            };
            pages_fetched += 1;
            visited.insert(url.clone());

            let (found, next) = self.process_page(&html, &url, &mut listings, &mut metrics);
            total_found += found;

            state = self.advance(page, next, &visited)?;
            if matches!(state, PageLoop::Fetching { .. }) && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        };

        metrics.finish();
        tracing::info!(
            "{}: {} listings from {} pages ({} containers, {} discarded, {} filtered)",
            self.site.name,
            listings.len(),
            pages_fetched,
            total_found,
            metrics.listings_discarded,
            metrics.listings_filtered
        );

        *self
            .metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = metrics;

        Ok(ScrapingResult::from_run(success, listings, errors, total_found))
    }

    fn metrics(&self) -> ScraperMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
