//! Listing Harvester: a business-for-sale listing aggregator
//!
//! This crate fetches listing pages from marketplace websites, extracts
//! structured fields from their HTML through selector fallback chains,
//! normalizes and classifies the results, and persists them into a single
//! deduplicated SQLite store.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod normalize;
pub mod output;
pub mod session;
pub mod source;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Listing Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Page template has no {{page}} placeholder: {0}")]
    MissingPlaceholder(String),
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::RawListing;
pub use session::{Orchestrator, ScrapingSession, SessionOutcome, SessionStatus};
pub use source::{ScrapingResult, SourceAdapter};
