//! Balanced Catalog Sampling Library
//!
//! Collects a fixed-size, balanced sample of product records from a
//! paginated web catalog. Every record is classified into a cell of a
//! two-dimensional taxonomy (skill level × riding style) and admitted only
//! while that cell's quota has room, so the finished sample matches a
//! static sampling matrix rather than whatever the catalog happens to list
//! most.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_sampler::{collect, HttpFetcher, MemoryStore, SamplerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = SamplerConfig::new().with_max_pages(2);
//! let fetcher = HttpFetcher::new(&config)?;
//! let store = MemoryStore::new();
//!
//! let report = collect(config, &fetcher, &store, CancellationToken::new()).await?;
//! println!("{:?}: {} admitted", report.stop_reason, report.stats.admitted);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Taxonomy, sampling matrix, records and configuration
//! - [`extract`] - Selector cascades, normalization and classification
//! - [`quota`] - Per-category quota tracking and priorities
//! - [`traits`] - Fetcher and store abstractions
//! - [`fetchers`] - HTTP and rate-limited fetchers
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`pipeline`] - Collection loop and detail enrichment
//! - [`report`] - Field fill rates
//! - [`testing`] - Mock implementations and HTML fixtures for testing

pub mod error;
pub mod extract;
pub mod fetchers;
pub mod pipeline;
pub mod quota;
pub mod report;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, FetchResult, Result, SamplerError};
pub use extract::{Cascade, DetailExtractor, ListingExtractor, Rule};
pub use fetchers::{FetcherExt, HttpFetcher, RateLimitedFetcher};
pub use pipeline::{
    collect, enrich, CategoryPass, CollectionReport, Collector, EnrichmentReport, PassOutcome,
    StopReason,
};
pub use quota::{CompletionSummary, QuotaTracker};
pub use report::FillRates;
pub use stores::MemoryStore;
pub use traits::{CatalogFetcher, FetchedPage, RecordStore};
pub use types::{
    CatalogUrls, CategoryKey, ClassificationMode, Enrichment, Record, RecordId, RidingStyle,
    SamplerConfig, SamplingMatrix, SessionStats, SkillLevel,
};

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;
