use crate::config::types::{Config, ProxyConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use listing_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvester.toml")).unwrap();
/// println!("Max pages: {}", config.scraper.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored with every session so runs made under different
/// configurations can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Resolves the rendering proxy API key
///
/// An inline `api-key` wins; otherwise the variable named by `api-key-env`
/// is read. A missing or blank key is a configuration error, raised before
/// any request is made.
pub fn resolve_api_key(proxy: &ProxyConfig) -> Result<String, ConfigError> {
    if let Some(key) = proxy.api_key.as_deref().map(str::trim) {
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    match std::env::var(&proxy.api_key_env) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingCredential(format!(
            "rendering proxy API key not set (config `api-key` or env `{}`)",
            proxy.api_key_env
        ))),
    }
}
