//! Direct fetcher for sites served as static HTML

use crate::fetch::{classify_error, read_body, FetchOptions, Fetcher, RateLimiter};
use crate::url::{host_key, parse_http_url};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Fetcher requesting the target URL without the rendering proxy
///
/// The `render_js` option is ignored; rate limits are keyed by host.
pub struct DirectFetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
}

impl DirectFetcher {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self { client, limiter }
    }
}

#[async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let target = parse_http_url(url).map_err(|e| FetchError::InvalidRequest {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.limiter.acquire(&host_key(&target)).await;
        tracing::debug!("Fetching {} directly", url);

        let response = self
            .client
            .get(target)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        read_body(url, response).await
    }
}
