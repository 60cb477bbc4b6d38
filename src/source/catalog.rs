//! Built-in marketplace catalog

use crate::config::{validate_site_definition, SiteDefinition};
use crate::ConfigError;
use serde::Deserialize;

const CATALOG: &str = include_str!("catalog.toml");

#[derive(Debug, Deserialize)]
struct Catalog {
    site: Vec<SiteDefinition>,
}

/// Returns the built-in site definitions
pub fn builtin_sites() -> Result<Vec<SiteDefinition>, ConfigError> {
    let catalog: Catalog = toml::from_str(CATALOG)?;
    for site in &catalog.site {
        validate_site_definition(site)?;
    }
    Ok(catalog.site)
}

/// Merges configured site definitions over the built-in ones
///
/// A configured site with the name of a built-in replaces it in place;
/// other configured sites are appended in configuration order.
pub fn merge_sites(builtin: Vec<SiteDefinition>, custom: &[SiteDefinition]) -> Vec<SiteDefinition> {
    let mut sites = builtin;
    for site in custom {
        match sites.iter_mut().find(|existing| existing.name == site.name) {
            Some(existing) => {
                tracing::debug!("Site definition '{}' overridden by configuration", site.name);
                *existing = site.clone();
            }
            None => sites.push(site.clone()),
        }
    }
    sites
}
