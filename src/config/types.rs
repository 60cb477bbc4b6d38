use crate::storage::ConflictKey;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Listing Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Sources to run when no explicit selection is given (empty = all)
    #[serde(rename = "enabled-sources", default)]
    pub enabled_sources: Vec<String>,

    pub proxy: ProxyConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,

    pub output: OutputConfig,

    /// Site definitions that extend or override the built-in catalog
    #[serde(default)]
    pub site: Vec<SiteDefinition>,
}

/// Remote rendering proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy endpoint receiving `api_key`, `url` and `render` query parameters
    pub endpoint: String,

    /// API key given inline; takes precedence over `api-key-env`
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Ask the proxy to render JavaScript by default
    #[serde(rename = "render-js", default = "default_true")]
    pub render_js: bool,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Scraping behavior shared by all sources
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Maximum pages fetched per source unless the site overrides it
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Delay between page requests of one source (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Delay between two sources in one session (milliseconds)
    #[serde(rename = "source-delay-ms", default = "default_source_delay_ms")]
    pub source_delay_ms: u64,

    /// Maximum number of highlight tags per listing
    #[serde(rename = "highlight-limit", default = "default_highlight_limit")]
    pub highlight_limit: usize,

    /// User agent sent on direct (non-proxied) requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Token bucket settings for each external dependency
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained request rate per dependency
    #[serde(rename = "requests-per-minute", default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Requests allowed back-to-back before throttling starts
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown session summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Rows written per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Fields identifying one real-world listing in the store
    #[serde(rename = "conflict-key", default)]
    pub conflict_key: ConflictKey,
}

/// How listing containers are chosen among the candidate selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerStrategy {
    /// Stop at the first selector with a non-empty match set
    #[default]
    FirstMatch,
    /// Try every selector and keep the largest match set
    MostMatches,
}

/// Ordered selector lists for each listing field
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FieldSelectors {
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub revenue: Vec<String>,
    pub location: Vec<String>,
    pub industry: Vec<String>,
    pub description: Vec<String>,
    pub link: Vec<String>,
    pub image: Vec<String>,
}

/// Declarative description of one marketplace
///
/// Every marketplace is scraped by the same engine; this table carries
/// everything that differs between them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteDefinition {
    /// Identifier used on the command line and in session results
    pub name: String,

    /// Value written to the `source` column
    #[serde(rename = "source-label")]
    pub source_label: String,

    /// First page of listings
    pub start_url: String,

    /// Template for later pages, containing `{page}`
    #[serde(default)]
    pub page_url: Option<String>,

    /// Route requests through the rendering proxy
    #[serde(default = "default_true")]
    pub use_proxy: bool,

    /// Override of the proxy's JavaScript rendering flag
    #[serde(default)]
    pub render_js: Option<bool>,

    /// Candidate selectors for one listing card, most specific first
    pub container_selectors: Vec<String>,

    #[serde(default)]
    pub container_strategy: ContainerStrategy,

    #[serde(default)]
    pub fields: FieldSelectors,

    /// Selectors for the pagination "next" control
    #[serde(default)]
    pub next_page_selectors: Vec<String>,

    /// Category used when no taxonomy keyword matches
    #[serde(default = "default_industry")]
    pub default_industry: String,

    /// Keep only listings that look like FBA / e-commerce businesses
    #[serde(default)]
    pub fba_only: bool,

    #[serde(default)]
    pub max_pages: Option<u32>,

    #[serde(default)]
    pub page_delay_ms: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            source_delay_ms: default_source_delay_ms(),
            highlight_limit: default_highlight_limit(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            burst: default_burst(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_key_env() -> String {
    "SCRAPER_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_pages() -> u32 {
    5
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_source_delay_ms() -> u64 {
    5000
}

fn default_highlight_limit() -> usize {
    3
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; ListingHarvester/0.1)".to_string()
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_burst() -> u32 {
    5
}

fn default_batch_size() -> usize {
    100
}

fn default_industry() -> String {
    "Business".to_string()
}
