//! HTML extraction: fallback cascades, normalization and classification.

pub mod cascade;
pub mod classify;
pub mod detail;
pub mod listing;
pub mod normalize;

pub use cascade::{Cascade, ContainerCascade, Retrieval, Rule};
pub use classify::{classify, classify_skill, classify_style, KeywordText};
pub use detail::DetailExtractor;
pub use listing::{ListingExtractor, ListingItem, ListingPage};
pub use normalize::{absolute_url, extract_brand, parse_price};
