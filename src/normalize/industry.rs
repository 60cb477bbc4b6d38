//! Industry taxonomy
//!
//! Classifies a listing into one fixed category by keyword. The table is
//! ordered; the first category whose pattern matches wins.

use regex::Regex;
use std::sync::OnceLock;

/// Ordered `(category, pattern)` pairs
const TAXONOMY: &[(&str, &str)] = &[
    ("SaaS", r"\bsaas\b|software as a service|subscription software|\bb2b software\b"),
    (
        "E-commerce",
        r"e-?commerce|shopify|\bamazon\b|\bfba\b|online store|dropship|\betsy\b|woocommerce",
    ),
    (
        "Content",
        r"\bcontent\b|\bblog\b|affiliate|newsletter|youtube|\bmedia\b|publishing|adsense",
    ),
    (
        "Technology",
        r"\btech\b|technology|software|\bapp\b|mobile app|\bit services\b|web development|\bai\b",
    ),
    (
        "Health",
        r"health|medical|dental|clinic|pharma|wellness|fitness|\bgym\b|home care",
    ),
    ("Education", r"education|tutoring|\bschool\b|training|e-?learning|\bcourses?\b"),
    ("Finance", r"finance|financial|accounting|insurance|bookkeeping|\btax\b|lending"),
    (
        "Food & Beverage",
        r"restaurant|\bcafe\b|coffee|bakery|\bbar\b|brewery|catering|\bfood\b|pizza|beverage",
    ),
    ("Manufacturing", r"manufactur|fabricat|machining|\bfactory\b|production plant"),
    (
        "Services",
        r"\bservices?\b|cleaning|landscap|plumbing|\bhvac\b|consulting|staffing|agency",
    ),
    ("Real Estate", r"real estate|property|properties|rental|\brealty\b|apartment"),
    (
        "Automotive",
        r"automotive|\bauto\b|car wash|\bcars?\b|dealership|collision|\btires?\b|mechanic",
    ),
];

fn compiled() -> &'static [(&'static str, Regex)] {
    static TABLE: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TAXONOMY
            .iter()
            .map(|(category, pattern)| {
                let regex = Regex::new(&format!("(?i){}", pattern))
                    .expect("taxonomy patterns are valid");
                (*category, regex)
            })
            .collect()
    })
}

/// All categories in match order
pub fn categories() -> impl Iterator<Item = &'static str> {
    TAXONOMY.iter().map(|(category, _)| *category)
}

/// Keyword classifier with a per-site fallback category
#[derive(Debug, Clone)]
pub struct IndustryClassifier {
    default_industry: String,
}

impl IndustryClassifier {
    pub fn new(default_industry: impl Into<String>) -> Self {
        Self {
            default_industry: default_industry.into(),
        }
    }

    /// Classifies a listing from whatever text is known about it
    ///
    /// The first taxonomy entry matching any of `texts` (category label,
    /// name, description) wins.
    pub fn classify(&self, texts: &[&str]) -> String {
        compiled()
            .iter()
            .find(|(_, regex)| texts.iter().any(|text| regex.is_match(text)))
            .map(|(category, _)| category.to_string())
            .unwrap_or_else(|| self.default_industry.clone())
    }

    pub fn default_industry(&self) -> &str {
        &self.default_industry
    }
}
