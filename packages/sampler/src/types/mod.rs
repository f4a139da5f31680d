//! Core types for catalog sampling.

pub mod config;
pub mod matrix;
pub mod record;
pub mod session;
pub mod taxonomy;

pub use config::{CatalogUrls, ClassificationMode, SamplerConfig};
pub use matrix::SamplingMatrix;
pub use record::{Availability, Enrichment, Record, RecordId, MIN_NAME_LEN, SCRAPER_VERSION};
pub use session::SessionStats;
pub use taxonomy::{CategoryKey, RidingStyle, SkillLevel};
