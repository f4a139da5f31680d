//! Data-quality bookkeeping over stored records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::record::{Availability, Record};

/// How often one optional field is populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldFill {
    pub filled: usize,
    pub percentage: f64,
}

/// Per-field fill counts across a set of records, in record field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillRates {
    pub total: usize,
    pub fields: IndexMap<&'static str, FieldFill>,
}

type FieldCheck = fn(&Record) -> bool;

const FIELD_CHECKS: &[(&str, FieldCheck)] = &[
    ("brand", |r| r.brand.is_some()),
    ("model_year", |r| r.model_year.is_some()),
    ("product_url", |r| r.product_url.is_some()),
    ("image_urls", |r| !r.image_urls.is_empty()),
    ("current_price", |r| r.current_price.is_some()),
    ("original_price", |r| r.original_price.is_some()),
    ("sale_price", |r| r.sale_price.is_some()),
    ("board_lengths", |r| !r.board_lengths.is_empty()),
    ("flex_rating", |r| r.flex_rating.is_some()),
    ("camber_profile", |r| r.camber_profile.is_some()),
    ("shape", |r| r.shape.is_some()),
    ("core_material", |r| r.core_material.is_some()),
    ("base_material", |r| r.base_material.is_some()),
    ("description", |r| r.description.is_some()),
    ("key_features", |r| !r.key_features.is_empty()),
    ("terrain", |r| !r.terrain.is_empty()),
    ("review_count", |r| r.review_count.is_some()),
    ("average_rating", |r| r.average_rating.is_some()),
    ("availability", |r| r.availability != Availability::Unknown),
];

impl FillRates {
    pub fn compute(records: &[Record]) -> Self {
        let total = records.len();
        let fields = FIELD_CHECKS
            .iter()
            .map(|(name, check)| {
                let filled = records.iter().filter(|r| check(r)).count();
                let percentage = if total == 0 {
                    0.0
                } else {
                    filled as f64 / total as f64 * 100.0
                };
                (*name, FieldFill { filled, percentage })
            })
            .collect();

        Self { total, fields }
    }

    pub fn get(&self, field: &str) -> Option<FieldFill> {
        self.fields.get(field).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::taxonomy::{CategoryKey, RidingStyle, SkillLevel};

    fn key() -> CategoryKey {
        CategoryKey::new(SkillLevel::Expert, RidingStyle::Freeride)
    }

    #[test]
    fn test_fill_rates() {
        let records = vec![
            Record::new("Jones Flagship", key()).with_brand("Jones").with_price(699.95),
            Record::new("Capita Mercury", key()).with_brand("Capita"),
            Record::new("Arbor Bryan Iguchi", key()),
            Record::new("Korua Pencil", key()).with_availability(Availability::InStock),
        ];

        let rates = FillRates::compute(&records);
        assert_eq!(rates.total, 4);

        let brand = rates.get("brand").unwrap();
        assert_eq!(brand.filled, 2);
        assert!((brand.percentage - 50.0).abs() < f64::EPSILON);

        assert_eq!(rates.get("current_price").unwrap().filled, 1);
        assert_eq!(rates.get("availability").unwrap().filled, 1);
        assert_eq!(rates.get("board_lengths").unwrap().filled, 0);
        assert!(rates.get("nonexistent").is_none());
    }

    #[test]
    fn test_empty_input() {
        let rates = FillRates::compute(&[]);
        assert_eq!(rates.total, 0);
        assert_eq!(rates.get("brand").unwrap().percentage, 0.0);
        assert_eq!(rates.fields.keys().next(), Some(&"brand"));
    }
}
