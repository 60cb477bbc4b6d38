use crate::config::types::{
    Config, FieldSelectors, OutputConfig, ProxyConfig, RateLimitConfig, ScraperConfig,
    SiteDefinition,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_proxy_config(&config.proxy)?;
    validate_scraper_config(&config.scraper)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_output_config(&config.output)?;

    for name in &config.enabled_sources {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "enabled-sources cannot contain empty names".to_string(),
            ));
        }
    }

    for site in &config.site {
        validate_site_definition(site)?;
    }

    Ok(())
}

/// Validates proxy configuration
///
/// The API key itself is checked later, when a proxied source is about to run.
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.endpoint, "proxy endpoint")?;

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 100, got {}",
            config.max_pages
        )));
    }

    if config.highlight_limit < 1 || config.highlight_limit > 10 {
        return Err(ConfigError::Validation(format!(
            "highlight_limit must be between 1 and 10, got {}",
            config.highlight_limit
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates rate limit configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be >= 1, got {}",
            config.requests_per_minute
        )));
    }

    if config.burst < 1 {
        return Err(ConfigError::Validation(format!(
            "burst must be >= 1, got {}",
            config.burst
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates one site definition
///
/// Used for `[[site]]` entries as well as the built-in catalog.
pub fn validate_site_definition(site: &SiteDefinition) -> Result<(), ConfigError> {
    if site.name.is_empty()
        || !site
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "site name must be lowercase alphanumeric with hyphens, got '{}'",
            site.name
        )));
    }

    if site.source_label.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "site '{}' needs a source-label",
            site.name
        )));
    }

    validate_http_url(&site.start_url, &format!("start-url of '{}'", site.name))?;

    if let Some(template) = &site.page_url {
        if !template.contains("{page}") {
            return Err(ConfigError::Validation(format!(
                "page-url of '{}' must contain {{page}}",
                site.name
            )));
        }
        validate_http_url(
            &template.replace("{page}", "2"),
            &format!("page-url of '{}'", site.name),
        )?;
    }

    if site.container_selectors.is_empty() {
        return Err(ConfigError::Validation(format!(
            "site '{}' needs at least one container selector",
            site.name
        )));
    }

    if matches!(site.max_pages, Some(0)) {
        return Err(ConfigError::Validation(format!(
            "max-pages of '{}' must be >= 1",
            site.name
        )));
    }

    validate_selectors(&site.container_selectors)?;
    validate_selectors(&site.next_page_selectors)?;
    validate_field_selectors(&site.fields)?;

    Ok(())
}

fn validate_field_selectors(fields: &FieldSelectors) -> Result<(), ConfigError> {
    for list in [
        &fields.name,
        &fields.price,
        &fields.revenue,
        &fields.location,
        &fields.industry,
        &fields.description,
        &fields.link,
        &fields.image,
    ] {
        validate_selectors(list)?;
    }
    Ok(())
}

fn validate_selectors(selectors: &[String]) -> Result<(), ConfigError> {
    for selector in selectors {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }
    Ok(())
}

fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}
