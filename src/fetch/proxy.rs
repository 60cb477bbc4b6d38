//! Rendering proxy fetcher
//!
//! Sends every request to the shared rendering proxy, which fetches the
//! target URL on our behalf (optionally executing JavaScript) and returns
//! the resulting HTML.

use crate::fetch::{classify_error, read_body, FetchOptions, Fetcher, RateLimiter};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Rate limit key shared by every proxied request
pub const PROXY_LIMIT_KEY: &str = "render-proxy";

/// Fetcher routing requests through the rendering proxy
pub struct ProxyFetcher {
    client: Client,
    endpoint: String,
    api_key: String,
    limiter: Arc<RateLimiter>,
}

impl ProxyFetcher {
    /// Creates a new proxy fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `endpoint` - Proxy endpoint URL
    /// * `api_key` - Resolved proxy credential
    /// * `limiter` - Shared rate limiter
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            limiter,
        }
    }
}

#[async_trait]
impl Fetcher for ProxyFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        self.limiter.acquire(PROXY_LIMIT_KEY).await;

        let render = if options.render_js { "true" } else { "false" };
        tracing::debug!("Fetching {} via rendering proxy (render={})", url, render);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str()), ("url", url), ("render", render)])
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        read_body(url, response).await
    }
}
