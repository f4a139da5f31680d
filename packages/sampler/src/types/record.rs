//! Record types: the immutable unit of collection and its enrichment delta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::taxonomy::CategoryKey;

/// Version tag written on every record this crate produces.
pub const SCRAPER_VERSION: &str = concat!("catalog-sampler/", env!("CARGO_PKG_VERSION"));

/// Shortest product name accepted from a listing fragment.
pub const MIN_NAME_LEN: usize = 3;

/// Content-derived record identity.
///
/// `evo_{first two sanitized words}_{12 hex chars of SHA-256(name)}`.
/// Two products with the same name collide; nothing relies on that not
/// happening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Compute the identity for a product name.
    pub fn for_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let hex = format!("{:x}", digest);

        let sanitized: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
            .collect();
        let words: Vec<&str> = sanitized.split_whitespace().take(2).collect();
        let prefix = if words.is_empty() {
            "product".to_string()
        } else {
            words.join("_")
        };

        Self(format!("evo_{}_{}", prefix, &hex[..12]))
    }

    /// Wrap an identity read back from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock status of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Limited,
    Backorder,
    #[default]
    Unknown,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Limited => "limited",
            Availability::Backorder => "backorder",
            Availability::Unknown => "unknown",
        }
    }

    /// Parse a stored status; anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "in_stock" => Availability::InStock,
            "out_of_stock" => Availability::OutOfStock,
            "limited" => Availability::Limited,
            "backorder" => Availability::Backorder,
            _ => Availability::Unknown,
        }
    }
}

/// A single collected product.
///
/// Records are values: enrichment produces a new version through
/// [`Record::merged_with`] rather than mutating a stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub category: CategoryKey,

    pub brand: Option<String>,
    pub model_year: Option<u16>,
    pub product_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,

    pub current_price: Option<f64>,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,

    #[serde(default)]
    pub board_lengths: Vec<u16>,
    pub flex_rating: Option<String>,
    pub camber_profile: Option<String>,
    pub shape: Option<String>,
    pub core_material: Option<String>,
    pub base_material: Option<String>,

    pub description: Option<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub terrain: Vec<String>,

    pub review_count: Option<u32>,
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub availability: Availability,

    pub scraped_at: DateTime<Utc>,
    pub scraper_version: String,
}

impl Record {
    /// Build a record with its identity derived from `name`.
    pub fn new(name: impl Into<String>, category: CategoryKey) -> Self {
        let name = name.into();
        Self {
            id: RecordId::for_name(&name),
            name,
            category,
            brand: None,
            model_year: None,
            product_url: None,
            image_urls: Vec::new(),
            current_price: None,
            original_price: None,
            sale_price: None,
            board_lengths: Vec::new(),
            flex_rating: None,
            camber_profile: None,
            shape: None,
            core_material: None,
            base_material: None,
            description: None,
            key_features: Vec::new(),
            terrain: Vec::new(),
            review_count: None,
            average_rating: None,
            availability: Availability::Unknown,
            scraped_at: Utc::now(),
            scraper_version: SCRAPER_VERSION.to_string(),
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.product_url = Some(url.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Produce the next version of this record with detail-page fields.
    ///
    /// Present enrichment values win; non-empty lists replace. Identity,
    /// name and category never change.
    pub fn merged_with(&self, enrichment: &Enrichment) -> Record {
        let mut next = self.clone();

        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        fn take_list<T: Clone>(slot: &mut Vec<T>, value: &[T]) {
            if !value.is_empty() {
                *slot = value.to_vec();
            }
        }

        take(&mut next.model_year, &enrichment.model_year);
        take(&mut next.original_price, &enrichment.original_price);
        take(&mut next.sale_price, &enrichment.sale_price);
        take(&mut next.flex_rating, &enrichment.flex_rating);
        take(&mut next.camber_profile, &enrichment.camber_profile);
        take(&mut next.shape, &enrichment.shape);
        take(&mut next.core_material, &enrichment.core_material);
        take(&mut next.base_material, &enrichment.base_material);
        take(&mut next.description, &enrichment.description);
        take(&mut next.review_count, &enrichment.review_count);
        take(&mut next.average_rating, &enrichment.average_rating);
        take_list(&mut next.board_lengths, &enrichment.board_lengths);
        take_list(&mut next.key_features, &enrichment.key_features);
        take_list(&mut next.terrain, &enrichment.terrain);

        next.scraped_at = Utc::now();
        next
    }
}

/// Fields pulled from a product detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub model_year: Option<u16>,
    pub board_lengths: Vec<u16>,
    pub flex_rating: Option<String>,
    pub camber_profile: Option<String>,
    pub shape: Option<String>,
    pub core_material: Option<String>,
    pub base_material: Option<String>,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub description: Option<String>,
    pub key_features: Vec<String>,
    pub terrain: Vec<String>,
    pub review_count: Option<u32>,
    pub average_rating: Option<f32>,
}

impl Enrichment {
    /// True when the detail page produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self == &Enrichment::default()
    }

    /// Number of populated fields.
    pub fn field_count(&self) -> usize {
        [
            self.model_year.is_some(),
            !self.board_lengths.is_empty(),
            self.flex_rating.is_some(),
            self.camber_profile.is_some(),
            self.shape.is_some(),
            self.core_material.is_some(),
            self.base_material.is_some(),
            self.original_price.is_some(),
            self.sale_price.is_some(),
            self.description.is_some(),
            !self.key_features.is_empty(),
            !self.terrain.is_empty(),
            self.review_count.is_some(),
            self.average_rating.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::taxonomy::{RidingStyle, SkillLevel};

    fn key() -> CategoryKey {
        CategoryKey::new(SkillLevel::Intermediate, RidingStyle::AllMountain)
    }

    #[test]
    fn test_identity_is_pure_function_of_name() {
        let a = RecordId::for_name("Burton Custom Snowboard 2025");
        let b = RecordId::for_name("Burton Custom Snowboard 2025");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("evo_burton_custom_"));
        assert_eq!(a.as_str().len(), "evo_burton_custom_".len() + 12);
    }

    #[test]
    fn test_identity_sanitizes_words() {
        let id = RecordId::for_name("CAPiTA D.O.A. - 2025");
        assert!(id.as_str().starts_with("evo_capita_doa_"));

        let id = RecordId::for_name("!!! ???");
        assert!(id.as_str().starts_with("evo_product_"));
    }

    #[test]
    fn test_different_names_get_different_ids() {
        assert_ne!(
            RecordId::for_name("Jones Mountain Twin"),
            RecordId::for_name("Jones Mountain Twin Pro")
        );
    }

    #[test]
    fn test_merge_prefers_present_values() {
        let base = Record::new("Lib Tech Orca", key())
            .with_price(699.95)
            .with_description("listing blurb");

        let enrichment = Enrichment {
            model_year: Some(2025),
            board_lengths: vec![153, 156, 159],
            description: None,
            key_features: vec!["Magne-Traction edges".into()],
            ..Default::default()
        };

        let merged = base.merged_with(&enrichment);
        assert_eq!(merged.id, base.id);
        assert_eq!(merged.model_year, Some(2025));
        assert_eq!(merged.board_lengths, vec![153, 156, 159]);
        assert_eq!(merged.description.as_deref(), Some("listing blurb"));
        assert_eq!(merged.current_price, Some(699.95));
        assert_eq!(merged.key_features.len(), 1);
        // original untouched
        assert!(base.model_year.is_none());
    }

    #[test]
    fn test_enrichment_emptiness() {
        assert!(Enrichment::default().is_empty());
        let e = Enrichment {
            review_count: Some(4),
            ..Default::default()
        };
        assert!(!e.is_empty());
        assert_eq!(e.field_count(), 1);
    }

    #[test]
    fn test_availability_parse_falls_back_to_unknown() {
        assert_eq!(Availability::parse("in_stock"), Availability::InStock);
        assert_eq!(Availability::parse("sold out"), Availability::Unknown);
        assert_eq!(Availability::Backorder.as_str(), "backorder");
    }
}
