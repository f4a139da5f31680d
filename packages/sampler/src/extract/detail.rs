//! Product detail page extraction for enrichment.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::extract::cascade::{element_text, Cascade, Rule};
use crate::extract::classify::KeywordText;
use crate::extract::normalize::{
    parse_board_lengths, parse_count, parse_price, parse_rating, parse_year, title_case,
    year_from_name,
};
use crate::types::record::{Enrichment, Record};

static RE_FLEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"flex[:\s]*([0-9]+(?:/10)?|very stiff|soft|medium|stiff)")
        .expect("flex pattern is valid")
});

const MODEL_YEAR_SELECTORS: &[&str] = &[
    ".product-details__year",
    ".product-year",
    "[data-testid=\"product-year\"]",
];

const SIZE_SELECTORS: &[&str] = &[
    ".product-sizes",
    ".size-selector option",
    ".product-options .size",
    ".sizes-available",
];

const SPEC_SECTIONS: &str = ".product-specifications, .specs-table, .product-specs, .specifications";

const ORIGINAL_PRICE_SELECTORS: &[&str] = &[
    ".price-original",
    ".msrp-price",
    ".original-price",
    ".strikethrough-price",
];

const SALE_MARKERS: &str = ".sale, .discount, .price-sale";

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    ".product-details__description",
    "[data-testid=\"description\"]",
    ".pdp-description",
];

const FEATURE_SELECTORS: &[&str] = &[
    ".product-features",
    ".key-features",
    "[data-testid=\"features\"]",
    ".features-list",
];

const REVIEW_COUNT_SELECTORS: &[&str] = &[
    ".review-count",
    ".reviews-count",
    "[data-testid=\"review-count\"]",
    ".rating-count",
];

const RATING_SELECTORS: &[&str] = &[
    ".average-rating",
    ".rating-average",
    "[data-testid=\"rating\"]",
    ".stars-rating",
    ".product-rating",
];

const CAMBER_KEYWORDS: &[&str] = &["camber", "rocker", "hybrid", "flat", "reverse camber"];
const SHAPE_KEYWORDS: &[&str] = &["directional", "twin", "asymmetrical", "tapered"];
const CORE_KEYWORDS: &[&str] = &["wood core", "poplar", "bamboo", "foam core"];
const BASE_KEYWORDS: &[&str] = &["sintered", "extruded", "ptex"];

/// Terrain tags inferred from the description.
pub const TERRAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("park", &["park", "jib", "rail"]),
    ("pipe", &["pipe", "halfpipe"]),
    ("groomed", &["groomed", "piste", "carving"]),
    ("powder", &["powder", "deep snow", "float"]),
    ("backcountry", &["backcountry", "touring", "splitboard"]),
    ("all-mountain", &["all mountain", "versatile", "anywhere"]),
];

/// Descriptions this short are marketing stubs and ignored.
pub const MIN_DESCRIPTION_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MIN_FEATURE_CHARS: usize = 5;
pub const MAX_FEATURES: usize = 10;

/// Extracts enrichment fields from a product page.
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    model_year: Cascade,
    sizes: Cascade,
    spec_sections: Option<Selector>,
    original_price: Cascade,
    sale_markers: Option<Selector>,
    description: Cascade,
    features: Vec<Selector>,
    review_count: Cascade,
    rating: Cascade,
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailExtractor {
    pub fn new() -> Self {
        // Each rating locator is tried as a data attribute before its text.
        let rating_rules = RATING_SELECTORS
            .iter()
            .flat_map(|css| {
                [
                    Rule::first_attr(*css, ["data-rating", "data-score"], |v| {
                        v.parse::<f32>().is_ok()
                    }),
                    Rule::text(*css),
                ]
            })
            .collect();

        Self {
            model_year: Cascade::text("model_year", MODEL_YEAR_SELECTORS),
            sizes: Cascade::text("board_lengths", SIZE_SELECTORS),
            spec_sections: Selector::parse(SPEC_SECTIONS).ok(),
            original_price: Cascade::text("original_price", ORIGINAL_PRICE_SELECTORS),
            sale_markers: Selector::parse(SALE_MARKERS).ok(),
            description: Cascade::text("description", DESCRIPTION_SELECTORS),
            features: FEATURE_SELECTORS
                .iter()
                .filter_map(|css| Selector::parse(css).ok())
                .collect(),
            review_count: Cascade::text("review_count", REVIEW_COUNT_SELECTORS),
            rating: Cascade::new("average_rating", rating_rules),
        }
    }

    /// Pull every available detail field for `record` out of `html`.
    pub fn extract(&self, html: &str, record: &Record) -> Enrichment {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut enrichment = Enrichment {
            model_year: self
                .model_year
                .extract_with(root, parse_year)
                .or_else(|| year_from_name(&record.name)),
            board_lengths: parse_board_lengths(
                self.sizes.extract_all(root).iter().map(String::as_str),
            ),
            ..Default::default()
        };

        self.extract_specs(root, &mut enrichment);
        self.extract_pricing(root, record.current_price, &mut enrichment);
        self.extract_content(root, &mut enrichment);

        enrichment.review_count = self.review_count.extract_with(root, parse_count);
        enrichment.average_rating = self.rating.extract_with(root, parse_rating);

        enrichment
    }

    fn extract_specs(&self, root: ElementRef<'_>, out: &mut Enrichment) {
        let Some(selector) = &self.spec_sections else {
            return;
        };

        for section in root.select(selector) {
            let text = element_text(section).to_lowercase();

            if out.flex_rating.is_none() {
                out.flex_rating = RE_FLEX
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());
            }
            if out.camber_profile.is_none() {
                out.camber_profile = camber_phrase(&text);
            }
            if out.shape.is_none() {
                out.shape = first_keyword(&text, SHAPE_KEYWORDS);
            }
            if out.core_material.is_none() {
                out.core_material = first_keyword(&text, CORE_KEYWORDS);
            }
            if out.base_material.is_none() {
                out.base_material = first_keyword(&text, BASE_KEYWORDS);
            }
        }
    }

    fn extract_pricing(&self, root: ElementRef<'_>, current: Option<f64>, out: &mut Enrichment) {
        out.original_price = self
            .original_price
            .extract_with(root, parse_price)
            .filter(|original| *original > current.unwrap_or(0.0));

        let on_sale = self
            .sale_markers
            .as_ref()
            .is_some_and(|selector| root.select(selector).next().is_some());
        if on_sale {
            out.sale_price = current;
        }
    }

    fn extract_content(&self, root: ElementRef<'_>, out: &mut Enrichment) {
        out.description = self
            .description
            .extract(root)
            .filter(|d| d.chars().count() > MIN_DESCRIPTION_CHARS)
            .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect());

        out.key_features = self
            .features
            .iter()
            .flat_map(|selector| root.select(selector))
            .map(element_text)
            .filter(|text| text.chars().count() > MIN_FEATURE_CHARS)
            .take(MAX_FEATURES)
            .collect();

        if let Some(description) = &out.description {
            let text = KeywordText::new(description);
            out.terrain = TERRAIN_KEYWORDS
                .iter()
                .filter(|(_, keywords)| text.contains_any(keywords))
                .map(|(terrain, _)| (*terrain).to_string())
                .collect();
        }
    }
}

/// Camber description: from the first camber keyword to the end of its sentence.
fn camber_phrase(text: &str) -> Option<String> {
    let keyword = CAMBER_KEYWORDS.iter().find(|k| text.contains(*k))?;
    let start = text.find(keyword)?;
    let phrase = text[start..].split('.').next()?.trim();
    (!phrase.is_empty()).then(|| phrase.to_string())
}

fn first_keyword(text: &str, keywords: &[&str]) -> Option<String> {
    keywords
        .iter()
        .find(|k| text.contains(*k))
        .map(|k| title_case(k))
}
