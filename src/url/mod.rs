//! URL handling module for Listing Harvester
//!
//! Resolves links found inside listing cards against the page they came
//! from, and expands per-site pagination templates.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute http(s) URL
pub fn parse_http_url(value: &str) -> UrlResult<Url> {
    let url = Url::parse(value.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be ignored:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Builds the URL of a numbered listing page from a `{page}` template
pub fn expand_page_template(template: &str, page: u32) -> UrlResult<Url> {
    if !template.contains("{page}") {
        return Err(UrlError::MissingPlaceholder(template.to_string()));
    }
    parse_http_url(&template.replace("{page}", &page.to_string()))
}

/// Returns the host of a URL, used to key per-dependency rate limits
pub fn host_key(url: &Url) -> String {
    url.host_str()
        .map(|h| h.to_ascii_lowercase())
        .unwrap_or_else(|| "unknown-host".to_string())
}
