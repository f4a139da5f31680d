//! Collection and enrichment pipelines.
//!
//! - [`collect`] - quota-driven listing collection (fetch → extract →
//!   classify → admit → persist)
//! - [`enrich`] - detail page pass over stored records

pub mod collect;
pub mod enrich;

pub use collect::{collect, CategoryPass, CollectionReport, Collector, PassOutcome, StopReason};
pub use enrich::{enrich, EnrichmentReport};
