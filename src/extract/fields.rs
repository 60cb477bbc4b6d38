//! Per-container field extraction
//!
//! Every field is looked up through its ordered selector list first. When
//! no selector yields text, a regex over the container's full text is
//! tried instead.

use crate::config::FieldSelectors;
use crate::extract::{compile_selectors, ExtractionError};
use crate::url::resolve_link;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use url::Url;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MIN_PARAGRAPH_LEN: usize = 20;

/// Compiled selector lists for each field
#[derive(Debug, Clone, Default)]
pub struct FieldSelectorSet {
    pub name: Vec<Selector>,
    pub price: Vec<Selector>,
    pub revenue: Vec<Selector>,
    pub location: Vec<Selector>,
    pub industry: Vec<Selector>,
    pub description: Vec<Selector>,
    pub link: Vec<Selector>,
    pub image: Vec<Selector>,
}

impl FieldSelectorSet {
    pub fn compile(fields: &FieldSelectors) -> Self {
        Self {
            name: compile_selectors(&fields.name),
            price: compile_selectors(&fields.price),
            revenue: compile_selectors(&fields.revenue),
            location: compile_selectors(&fields.location),
            industry: compile_selectors(&fields.industry),
            description: compile_selectors(&fields.description),
            link: compile_selectors(&fields.link),
            image: compile_selectors(&fields.image),
        }
    }
}

/// Raw field values found in one listing container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub name: String,
    pub price_text: Option<String>,
    pub revenue_text: Option<String>,
    pub location: Option<String>,
    pub industry_text: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    /// Whitespace-collapsed text of the whole container
    pub full_text: String,
}

struct FallbackPatterns {
    labeled_price: Regex,
    any_price: Regex,
    revenue: Regex,
    cash_flow: Regex,
    location: Regex,
}

fn patterns() -> &'static FallbackPatterns {
    static PATTERNS: OnceLock<FallbackPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let money = r"\$\s?\d[\d,]*(?:\.\d+)?(?:\s*(?:thousand|million|mm|k|m)\b)?";
        let loose_money = r"\$?\s?\d[\d,]*(?:\.\d+)?(?:\s*(?:thousand|million|mm|k|m)\b)?";
        FallbackPatterns {
            labeled_price: Regex::new(&format!(
                r"(?i)(?:asking\s+price|asking|price)\s*:?\s*({money})"
            ))
            .expect("labeled price pattern is valid"),
            any_price: Regex::new(&format!(r"(?i){money}")).expect("price pattern is valid"),
            revenue: Regex::new(&format!(
                r"(?i)(?:gross\s+)?(?:revenue|sales)\s*:?\s*({loose_money})"
            ))
            .expect("revenue pattern is valid"),
            cash_flow: Regex::new(&format!(
                r"(?i)(?:cash\s*flow|net\s+profit|sde|ebitda)\s*:?\s*({loose_money})"
            ))
            .expect("cash flow pattern is valid"),
            location: Regex::new(
                r"\b(?:[Ll]ocated|[Bb]ased)\s+in\s+([A-Z][A-Za-z'-]*(?:\s+[A-Z][A-Za-z'-]*)*(?:,\s*[A-Z][A-Za-z'-]*(?:\s+[A-Z][A-Za-z'-]*)*)?)",
            )
            .expect("location pattern is valid"),
        }
    })
}

fn heading_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("h1, h2, h3, h4").expect("heading selector is valid"))
}

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("link selector is valid"))
}

fn image_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img").expect("image selector is valid"))
}

fn paragraph_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("p").expect("paragraph selector is valid"))
}

/// Collapses all whitespace runs in an element's text into single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element matched by the first selector that yields any
fn first_text(container: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        container
            .select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// First non-empty attribute value among `attrs` on elements matched by `selectors`
fn first_attr(container: ElementRef<'_>, selectors: &[Selector], attrs: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        container.select(selector).find_map(|element| {
            attrs
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Extracts every field from one container
///
/// # Errors
///
/// Returns `ExtractionError::MissingName` when neither the name selectors,
/// a heading, nor a link provide a name; the caller skips the container.
pub fn extract_fields(
    container: ElementRef<'_>,
    selectors: &FieldSelectorSet,
    page_url: &Url,
) -> Result<ExtractedFields, ExtractionError> {
    let full_text = element_text(container);
    let patterns = patterns();

    let name = first_text(container, &selectors.name)
        .or_else(|| first_text(container, std::slice::from_ref(heading_selector())))
        .or_else(|| first_text(container, std::slice::from_ref(link_selector())))
        .map(|name| truncate_chars(&name, MAX_NAME_LEN))
        .ok_or_else(|| ExtractionError::MissingName {
            snippet: truncate_chars(&full_text, 80),
        })?;

    let price_text = first_text(container, &selectors.price).or_else(|| {
        patterns
            .labeled_price
            .captures(&full_text)
            .map(|caps| caps[1].to_string())
            .or_else(|| {
                patterns
                    .any_price
                    .find(&full_text)
                    .map(|m| m.as_str().to_string())
            })
    });

    let revenue_text = first_text(container, &selectors.revenue).or_else(|| {
        patterns
            .revenue
            .captures(&full_text)
            .or_else(|| patterns.cash_flow.captures(&full_text))
            .map(|caps| caps[1].to_string())
    });

    let location = first_text(container, &selectors.location).or_else(|| {
        patterns
            .location
            .captures(&full_text)
            .map(|caps| caps[1].trim_end_matches([',', ' ']).to_string())
    });

    let industry_text = first_text(container, &selectors.industry);

    let description = first_text(container, &selectors.description)
        .or_else(|| {
            container
                .select(paragraph_selector())
                .map(element_text)
                .find(|text| text.chars().count() >= MIN_PARAGRAPH_LEN)
        })
        .map(|text| truncate_chars(&text, MAX_DESCRIPTION_LEN));

    let href = first_attr(container, &selectors.link, &["href"])
        .or_else(|| {
            // Cards are often a single anchor wrapping the whole listing
            (container.value().name() == "a")
                .then(|| container.value().attr("href"))
                .flatten()
                .map(str::to_string)
        })
        .or_else(|| first_attr(container, std::slice::from_ref(link_selector()), &["href"]));
    let url = href.and_then(|href| resolve_link(&href, page_url));

    let image_url = first_attr(container, &selectors.image, &["src", "data-src"])
        .or_else(|| {
            first_attr(
                container,
                std::slice::from_ref(image_selector()),
                &["src", "data-src"],
            )
        })
        .and_then(|src| resolve_link(&src, page_url));

    Ok(ExtractedFields {
        name,
        price_text,
        revenue_text,
        location,
        industry_text,
        description,
        url,
        image_url,
        full_text,
    })
}
