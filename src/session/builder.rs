//! Wiring from configuration to a ready orchestrator

use crate::config::{resolve_api_key, Config, SiteDefinition};
use crate::fetch::{build_http_client, DirectFetcher, FetchOptions, Fetcher, ProxyFetcher, RateLimiter};
use crate::session::Orchestrator;
use crate::source::{builtin_sites, merge_sites, SiteAdapter, SourceAdapter};
use crate::{ConfigError, HarvestError};
use std::sync::Arc;
use std::time::Duration;

/// Built-in catalog merged with the configured `[[site]]` entries
pub fn resolve_sites(config: &Config) -> Result<Vec<SiteDefinition>, ConfigError> {
    Ok(merge_sites(builtin_sites()?, &config.site))
}

/// Names of the sources a run should cover
///
/// Explicitly requested names win, then `enabled-sources`, then every
/// known site.
pub fn selected_sources(config: &Config, sites: &[SiteDefinition], requested: &[String]) -> Vec<String> {
    if !requested.is_empty() {
        requested.to_vec()
    } else if !config.enabled_sources.is_empty() {
        config.enabled_sources.clone()
    } else {
        sites.iter().map(|s| s.name.clone()).collect()
    }
}

/// Builds an orchestrator holding adapters for the selected sites
///
/// Names that match no site get no adapter; the orchestrator reports them
/// when the session runs.
///
/// # Errors
///
/// Returns `ConfigError::MissingCredential` if a selected site uses the
/// rendering proxy and no API key is configured. Nothing is fetched
/// before this check.
pub fn build_orchestrator(
    config: &Config,
    sites: &[SiteDefinition],
    selected: &[String],
) -> Result<Orchestrator, HarvestError> {
    let chosen: Vec<&SiteDefinition> = selected
        .iter()
        .filter_map(|name| sites.iter().find(|site| &site.name == name))
        .collect();

    let client = build_http_client(&config.scraper.user_agent)?;
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

    let proxy: Option<Arc<dyn Fetcher>> = if chosen.iter().any(|site| site.use_proxy) {
        let api_key = resolve_api_key(&config.proxy)?;
        Some(Arc::new(ProxyFetcher::new(
            client.clone(),
            config.proxy.endpoint.clone(),
            api_key,
            limiter.clone(),
        )))
    } else {
        None
    };
    let direct: Arc<dyn Fetcher> = Arc::new(DirectFetcher::new(client, limiter));

    let timeout = Duration::from_secs(config.proxy.timeout_secs);
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(chosen.len());
    for site in chosen {
        let fetcher = match (&proxy, site.use_proxy) {
            (Some(proxy), true) => proxy.clone(),
            _ => direct.clone(),
        };
        let options = FetchOptions {
            timeout,
            render_js: site.render_js.unwrap_or(config.proxy.render_js),
        };
        adapters.push(Box::new(SiteAdapter::new(
            site.clone(),
            fetcher,
            options,
            &config.scraper,
        )));
    }

    Ok(Orchestrator::new(
        adapters,
        Duration::from_millis(config.scraper.source_delay_ms),
    ))
}
