//! Configuration module for Listing Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Database: {}", config.output.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ContainerStrategy, FieldSelectors, OutputConfig, ProxyConfig, RateLimitConfig,
    ScraperConfig, SiteDefinition,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_api_key,
};
pub use validation::validate_site_definition;
