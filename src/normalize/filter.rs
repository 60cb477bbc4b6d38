//! Domain filter for FBA-focused marketplaces

/// Keywords marking an Amazon FBA / e-commerce business
const FBA_KEYWORDS: &[&str] = &[
    "fba",
    "amazon",
    "fulfilled by amazon",
    "fulfillment by amazon",
    "e-commerce",
    "ecommerce",
    "private label",
    "seller central",
    "amazon seller",
    "shopify",
    "online store",
    "dropshipping",
];

/// Keeps only listings whose title or description mentions an allowlisted
/// keyword
#[derive(Debug, Clone, Copy, Default)]
pub struct FbaFilter;

impl FbaFilter {
    /// Returns true if the listing should be kept
    pub fn accepts(&self, name: &str, description: Option<&str>) -> bool {
        let text = format!("{} {}", name, description.unwrap_or_default()).to_lowercase();
        FBA_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }
}
