//! Enrichment pass over stored records.
//!
//! Revisits each stored record's product page and merges the detail fields
//! back into the store. Categories never change here, so quotas are
//! unaffected.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::detail::DetailExtractor;
use crate::traits::{fetcher::CatalogFetcher, store::RecordStore};
use crate::types::config::SamplerConfig;

/// Counts for one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    /// Records visited (fetched or skipped).
    pub processed: usize,
    /// Records updated with at least one detail field.
    pub enriched: usize,
    /// Pages that yielded nothing usable.
    pub no_data: usize,
    /// Fetch or store failures.
    pub failed: usize,
    /// Records without an absolute https product URL.
    pub skipped: usize,
    pub failed_urls: Vec<String>,
    pub cancelled: bool,
}

impl EnrichmentReport {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Enrich every stored record that has an absolute https product URL.
///
/// Fetches are sequential with the configured delay between them; a
/// failed record is counted and the pass moves on.
pub async fn enrich<F, S>(
    store: &S,
    fetcher: &F,
    config: &SamplerConfig,
    cancel: &CancellationToken,
) -> Result<EnrichmentReport>
where
    F: CatalogFetcher,
    S: RecordStore,
{
    let extractor = DetailExtractor::new();
    let records = store.list().await?;
    let mut report = EnrichmentReport::new();
    let mut fetched_once = false;

    info!(records = records.len(), "Starting enrichment");

    for record in records {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let Some(url) = record
            .product_url
            .as_deref()
            .filter(|u| u.starts_with("https://"))
            .map(str::to_string)
        else {
            debug!(id = %record.id, "No https product URL, skipping");
            report.processed += 1;
            report.skipped += 1;
            continue;
        };

        if fetched_once && !config.delay().is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(config.delay()) => {}
            }
        }
        fetched_once = true;
        report.processed += 1;

        let page = match fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(id = %record.id, url = %url, error = %e, "Detail fetch failed");
                report.failed += 1;
                report.failed_urls.push(url);
                continue;
            }
        };

        let enrichment = extractor.extract(&page.html, &record);
        if enrichment.is_empty() {
            debug!(id = %record.id, "Detail page yielded no fields");
            report.no_data += 1;
            continue;
        }

        let fields = enrichment.field_count();
        match store.replace(&record.merged_with(&enrichment)).await {
            Ok(true) => {
                debug!(id = %record.id, fields, "Record enriched");
                report.enriched += 1;
            }
            Ok(false) => {
                warn!(id = %record.id, "Record vanished before enrichment was saved");
                report.failed += 1;
            }
            Err(e) => {
                warn!(id = %record.id, error = %e, "Failed to save enrichment");
                report.failed += 1;
            }
        }
    }

    info!(
        processed = report.processed,
        enriched = report.enriched,
        no_data = report.no_data,
        failed = report.failed,
        skipped = report.skipped,
        "Enrichment finished"
    );

    Ok(report)
}
