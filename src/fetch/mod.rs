//! Fetch layer
//!
//! This module retrieves raw HTML for listing pages, including:
//! - Building HTTP clients with the configured user agent
//! - Routing requests through the remote rendering proxy
//! - Direct requests for sites that need no rendering
//! - Token-bucket rate limiting keyed per external dependency
//! - Error classification (timeout, HTTP status, transport)
//!
//! There is no retry: one failed fetch is terminal for that page.

mod direct;
mod limiter;
mod proxy;

pub use direct::DirectFetcher;
pub use limiter::RateLimiter;
pub use proxy::{ProxyFetcher, PROXY_LIMIT_KEY};

use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// Per-request fetch settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum time for the whole request
    pub timeout: Duration,

    /// Ask the rendering proxy to execute JavaScript
    pub render_js: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            render_js: true,
        }
    }
}

/// Something that can turn a URL into HTML
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the page at `url`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError)` - Non-2xx status, timeout or transport failure
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// Per-request timeouts are applied by the fetchers, so the client only
/// carries a connect timeout.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts a response into its body, mapping non-2xx statuses to errors
pub(crate) async fn read_body(url: &str, response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Classifies a reqwest error for the given target URL
pub(crate) fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
