//! Integration tests for Listing Harvester
//!
//! These tests use wiremock to stand in for marketplaces and the
//! rendering proxy, and exercise fetching, adapters, sessions and
//! persistence end-to-end.

mod adapter;
mod fetch;
mod session;
mod storage;

use listing_harvester::config::{ContainerStrategy, FieldSelectors, ScraperConfig, SiteDefinition};
use listing_harvester::fetch::{build_http_client, DirectFetcher, FetchOptions, RateLimiter};
use listing_harvester::source::SiteAdapter;
use std::sync::Arc;
use std::time::Duration;

/// A limiter generous enough to never pause a test
pub fn relaxed_limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(60_000, 1_000))
}

pub fn direct_fetcher() -> Arc<DirectFetcher> {
    let client = build_http_client("TestHarvester/1.0").expect("client");
    Arc::new(DirectFetcher::new(client, relaxed_limiter()))
}

pub fn fast_options() -> FetchOptions {
    FetchOptions {
        timeout: Duration::from_secs(5),
        render_js: false,
    }
}

/// A direct-fetch site served from `base_url`
pub fn test_site(name: &str, base_url: &str) -> SiteDefinition {
    SiteDefinition {
        name: name.to_string(),
        source_label: format!("{}-label", name),
        start_url: format!("{}/{}/listings", base_url, name),
        page_url: None,
        use_proxy: false,
        render_js: None,
        container_selectors: vec![".listing-card".to_string(), ".result".to_string()],
        container_strategy: ContainerStrategy::FirstMatch,
        fields: FieldSelectors {
            name: vec![".title".to_string()],
            price: vec![".price".to_string()],
            revenue: vec![".revenue".to_string()],
            location: vec![".location".to_string()],
            description: vec![".summary".to_string()],
            ..Default::default()
        },
        next_page_selectors: vec!["a.next".to_string()],
        default_industry: "Business".to_string(),
        fba_only: false,
        max_pages: Some(5),
        page_delay_ms: Some(0),
    }
}

pub fn site_adapter(site: SiteDefinition) -> SiteAdapter {
    SiteAdapter::new(site, direct_fetcher(), fast_options(), &ScraperConfig::default())
}

/// One listing card in the primary markup
pub fn card(name: &str, price: &str) -> String {
    format!(
        r#"<div class="listing-card"><h3 class="title">{}</h3><span class="price">{}</span></div>"#,
        name, price
    )
}

pub fn page(body: &str) -> String {
    format!("<html><body>{}</body></html>", body)
}
