//! Listing container selection
//!
//! Finds the elements that each hold one listing card. Candidate selectors
//! are tried per the site's `ContainerStrategy`; when none matches, a
//! structural heuristic looks for heading + link + price blocks.

use crate::config::ContainerStrategy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Which rule produced the containers of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSource {
    /// Candidate selector at this index in the site's list
    Selector(usize),
    /// Structural heuristic fallback
    Heuristic,
    /// Nothing matched
    None,
}

fn generic_container_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::parse("div, article, li, section").expect("generic container selector is valid")
    })
}

fn any_heading_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid")
    })
}

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a").expect("anchor selector is valid"))
}

/// Selects the listing containers of a document
///
/// # Arguments
///
/// * `document` - Parsed page
/// * `candidates` - Compiled candidate selectors, in site order
/// * `strategy` - How to choose among candidates
///
/// # Returns
///
/// The containers found and which rule found them. An empty list is a
/// valid result.
pub fn select_containers<'a>(
    document: &'a Html,
    candidates: &[Selector],
    strategy: ContainerStrategy,
) -> (Vec<ElementRef<'a>>, ContainerSource) {
    let mut best: Option<(usize, Vec<ElementRef<'a>>)> = None;

    for (index, selector) in candidates.iter().enumerate() {
        let matched: Vec<ElementRef<'a>> = document.select(selector).collect();
        tracing::trace!("Container selector #{} matched {} elements", index, matched.len());

        if matched.is_empty() {
            continue;
        }

        match strategy {
            ContainerStrategy::FirstMatch => {
                return (matched, ContainerSource::Selector(index));
            }
            ContainerStrategy::MostMatches => {
                // Strictly greater, so ties keep the earlier selector
                let better = best
                    .as_ref()
                    .map_or(true, |(_, current)| matched.len() > current.len());
                if better {
                    best = Some((index, matched));
                }
            }
        }
    }

    if let Some((index, matched)) = best {
        return (matched, ContainerSource::Selector(index));
    }

    let heuristic = heuristic_containers(document);
    if heuristic.is_empty() {
        (heuristic, ContainerSource::None)
    } else {
        tracing::debug!(
            "No container selector matched, heuristic found {} containers",
            heuristic.len()
        );
        (heuristic, ContainerSource::Heuristic)
    }
}

/// Finds generic blocks that look like a listing card
///
/// A block qualifies when it holds a heading, a link, and either a
/// currency symbol or the word "price". Blocks that contain another
/// qualifying block are dropped so only the innermost cards remain.
pub fn heuristic_containers(document: &Html) -> Vec<ElementRef<'_>> {
    let candidates: Vec<ElementRef<'_>> = document
        .select(generic_container_selector())
        .filter(|element| looks_like_listing(*element))
        .collect();

    let ids: HashSet<_> = candidates.iter().map(|element| element.id()).collect();

    candidates
        .into_iter()
        .filter(|element| {
            !element
                .descendants()
                .skip(1)
                .any(|node| ids.contains(&node.id()))
        })
        .collect()
}

fn looks_like_listing(element: ElementRef<'_>) -> bool {
    if element.select(any_heading_selector()).next().is_none() {
        return false;
    }
    if element.select(anchor_selector()).next().is_none() {
        return false;
    }

    let text: String = element.text().collect();
    text.contains(['$', '£', '€']) || text.to_lowercase().contains("price")
}
