//! Listing page extraction: containers, then per-field cascades.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::cascade::{Cascade, ContainerCascade, Rule};
use crate::extract::classify;
use crate::extract::normalize::{absolute_url, extract_brand, is_image_src, parse_price};
use crate::types::config::ClassificationMode;
use crate::types::record::{Availability, Record, MIN_NAME_LEN};
use crate::types::taxonomy::CategoryKey;

/// Product container locators, most specific first.
pub const CONTAINER_SELECTORS: &[&str] = &[
    ".product-thumb-details",
    ".product-thumb",
    ".js-product-thumb",
    ".larger-image-product-thumb",
    ".product-tile",
    ".product-item",
    "[data-productid]",
    ".product-card",
    ".tile",
];

pub const NAME_SELECTORS: &[&str] = &[
    ".product-thumb-title",
    ".product-title",
    ".product-name",
    ".title",
    "h3",
    "h4",
    "h2",
    "[data-testid*=\"title\"]",
    ".name",
    "a[title]",
];

pub const PRICE_SELECTORS: &[&str] = &[
    ".product-thumb-price .discount",
    ".product-thumb-price:not(.slash)",
    ".product-thumb-price",
    ".price",
    ".product-price",
    ".cost",
    "[data-testid*=\"price\"]",
    ".price-current",
    ".sale-price",
    ".regular-price",
    ".amount",
];

pub const URL_SELECTORS: &[&str] = &[
    ".product-thumb-link",
    ".js-product-thumb-details-link",
    "a[href*=\"/snowboards/\"]",
    "a[href*=\"/shop/\"]",
    "a[href]",
];

pub const IMAGE_SELECTORS: &[&str] = &[
    ".product-thumb-image",
    ".js-product-thumb-image",
    "img[src]",
    "img[data-src]",
    "img[data-lazy]",
    "img[data-original]",
];

/// Image attributes tried in order on a matched image element.
pub const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy", "data-original"];

/// One product fragment reduced to typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingItem {
    pub name: String,
    pub brand: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

impl ListingItem {
    /// Category this item would be filed under.
    pub fn classify(&self, mode: ClassificationMode, current: CategoryKey) -> CategoryKey {
        match mode {
            ClassificationMode::Keyword => classify::classify(&self.name, None, self.url.as_deref()),
            ClassificationMode::Target => current,
        }
    }

    /// Build the immutable record for a category.
    pub fn into_record(self, category: CategoryKey) -> Record {
        let mut record = Record::new(self.name, category).with_availability(Availability::InStock);
        record.brand = self.brand;
        record.product_url = self.url;
        record.current_price = self.price;
        record.image_urls = self.image_url.into_iter().collect();
        record
    }
}

/// Result of extracting one listing page.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Items in document order.
    pub items: Vec<ListingItem>,
    /// Containers dropped for lacking a usable name.
    pub skipped: usize,
    /// Container locator that matched, if any.
    pub container_selector: Option<String>,
}

impl ListingPage {
    /// A page with no extractable items ends the listing.
    pub fn is_end_of_listing(&self) -> bool {
        self.items.is_empty()
    }
}

/// Extracts product fragments from listing HTML.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    containers: ContainerCascade,
    name: Cascade,
    price: Cascade,
    url: Cascade,
    image: Cascade,
    base_url: String,
}

impl ListingExtractor {
    /// Extractor with the default locator lists.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            containers: ContainerCascade::new(CONTAINER_SELECTORS),
            name: Cascade::text("name", NAME_SELECTORS),
            price: Cascade::text("price", PRICE_SELECTORS),
            url: Cascade::new(
                "url",
                URL_SELECTORS
                    .iter()
                    .map(|css| Rule::attr(*css, "href"))
                    .collect(),
            ),
            image: Cascade::new(
                "image",
                IMAGE_SELECTORS
                    .iter()
                    .map(|css| Rule::first_attr(*css, IMAGE_ATTRIBUTES.iter().copied(), is_image_src))
                    .collect(),
            ),
            base_url: base_url.into(),
        }
    }

    /// Replace a field cascade (locators drift between site redesigns).
    pub fn with_cascade(mut self, cascade: Cascade) -> Self {
        match cascade.field() {
            "name" => self.name = cascade,
            "price" => self.price = cascade,
            "url" => self.url = cascade,
            "image" => self.image = cascade,
            other => debug!(field = other, "Ignoring cascade for unknown listing field"),
        }
        self
    }

    pub fn with_containers(mut self, selectors: &[&str]) -> Self {
        self.containers = ContainerCascade::new(selectors);
        self
    }

    /// Extract every product fragment on a listing page.
    pub fn extract_page(&self, html: &str) -> ListingPage {
        let document = Html::parse_document(html);

        let Some((selector, containers)) = self.containers.locate(&document) else {
            debug!("No product containers matched");
            return ListingPage::default();
        };

        let mut page = ListingPage {
            container_selector: Some(selector.to_string()),
            ..Default::default()
        };

        for container in containers {
            match self.extract_item(container) {
                Some(item) => page.items.push(item),
                None => page.skipped += 1,
            }
        }

        debug!(
            selector = %selector,
            items = page.items.len(),
            skipped = page.skipped,
            "Extracted listing page"
        );
        page
    }

    /// Reduce one container to an item; `None` when it has no usable name.
    pub fn extract_item(&self, container: ElementRef<'_>) -> Option<ListingItem> {
        let name = self.name.extract(container)?;
        if name.chars().count() < MIN_NAME_LEN {
            return None;
        }

        let url = self
            .url
            .extract(container)
            .map(|href| absolute_url(&href, &self.base_url));
        let image_url = self
            .image
            .extract(container)
            .map(|src| absolute_url(&src, &self.base_url));
        let price = self.price.extract(container).and_then(|text| parse_price(&text));

        Some(ListingItem {
            brand: extract_brand(&name),
            name,
            url,
            image_url,
            price,
        })
    }
}
