//! Extraction engine
//!
//! Turns one page of marketplace HTML into raw field records:
//! - Container selection through an ordered selector fallback chain
//! - Per-field selector lists with regex fallbacks over the card text
//! - Detection of the pagination "next" control
//! - Monetary amount parsing
//!
//! Everything here is synchronous; `scraper::Html` is parsed and dropped
//! within one call so callers can stay `Send` across awaits.

mod amount;
mod container;
mod fields;

pub use amount::{parse_amount, Amount, MAX_SAFE_AMOUNT};
pub use container::{heuristic_containers, select_containers, ContainerSource};
pub use fields::{element_text, extract_fields, ExtractedFields, FieldSelectorSet};

use crate::config::{ContainerStrategy, SiteDefinition};
use crate::url::resolve_link;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised for a single listing container
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("listing without a name: {snippet:?}")]
    MissingName { snippet: String },
}

/// The pagination control found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    /// Resolved link target, when the control is a link
    pub href: Option<String>,
}

/// Everything extracted from one page
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Containers located before field extraction
    pub containers_found: usize,
    pub matched_by: Option<ContainerSource>,
    pub records: Vec<ExtractedFields>,
    pub errors: Vec<ExtractionError>,
    pub next_page: Option<NextPage>,
}

/// Compiles selectors, skipping (and logging) the ones that do not parse
pub fn compile_selectors(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|raw| match Selector::parse(raw) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Skipping invalid selector {:?}: {:?}", raw, e);
                None
            }
        })
        .collect()
}

/// Site-specific extractor with its selectors compiled once
#[derive(Debug, Clone)]
pub struct Extractor {
    containers: Vec<Selector>,
    strategy: ContainerStrategy,
    fields: FieldSelectorSet,
    next_page: Vec<Selector>,
}

impl Extractor {
    /// Builds an extractor from a site definition
    pub fn from_site(site: &SiteDefinition) -> Self {
        Self {
            containers: compile_selectors(&site.container_selectors),
            strategy: site.container_strategy,
            fields: FieldSelectorSet::compile(&site.fields),
            next_page: compile_selectors(&site.next_page_selectors),
        }
    }

    /// Extracts listing records and the pagination control from a page
    ///
    /// # Arguments
    ///
    /// * `html` - Raw page body
    /// * `page_url` - URL the body was fetched from, for resolving links
    ///
    /// # Returns
    ///
    /// A `PageExtraction`; containers whose fields cannot be extracted are
    /// reported in `errors` and skipped.
    pub fn extract_page(&self, html: &str, page_url: &Url) -> PageExtraction {
        let document = Html::parse_document(html);
        let (containers, matched_by) =
            select_containers(&document, &self.containers, self.strategy);

        let mut extraction = PageExtraction {
            containers_found: containers.len(),
            matched_by: Some(matched_by),
            ..Default::default()
        };

        for container in containers {
            match extract_fields(container, &self.fields, page_url) {
                Ok(record) => extraction.records.push(record),
                Err(e) => {
                    tracing::trace!("Skipping container: {}", e);
                    extraction.errors.push(e);
                }
            }
        }

        extraction.next_page = self.find_next_page(&document, page_url);
        extraction
    }

    fn find_next_page(&self, document: &Html, page_url: &Url) -> Option<NextPage> {
        self.next_page.iter().find_map(|selector| {
            document
                .select(selector)
                .find(|element| !is_disabled(element.value()))
                .map(|element| NextPage {
                    href: element
                        .value()
                        .attr("href")
                        .and_then(|href| resolve_link(href, page_url)),
                })
        })
    }
}

fn is_disabled(element: &scraper::node::Element) -> bool {
    element.attr("disabled").is_some()
        || element.attr("aria-disabled") == Some("true")
        || element.classes().any(|class| class == "disabled")
}
