//! Collection loop: fetch → extract → classify → admit → persist.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::listing::{ListingExtractor, ListingItem};
use crate::quota::{CompletionSummary, QuotaTracker};
use crate::traits::{fetcher::CatalogFetcher, store::RecordStore};
use crate::types::{
    config::SamplerConfig,
    session::SessionStats,
    taxonomy::CategoryKey,
};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Overall target reached or every category complete.
    TargetReached,
    /// Every incomplete category had its pass without completing.
    PagesExhausted,
    /// External cancellation.
    Cancelled,
}

/// How one category's pagination pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    /// The category reached its target.
    Completed,
    /// The overall target was reached during the pass.
    TargetReached,
    /// The per-category page limit was hit.
    PageLimit,
    /// A page yielded no extractable records.
    EndOfListing,
    /// A fetch failed; pagination for the category was abandoned.
    TransportError,
    Cancelled,
}

/// One category's pass through its listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPass {
    pub category: CategoryKey,
    pub pages_fetched: u32,
    /// Records admitted during this pass, to any category.
    pub admitted: usize,
    pub outcome: PassOutcome,
}

/// Result of a collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub stop_reason: StopReason,
    pub stats: SessionStats,
    pub summary: CompletionSummary,
    pub passes: Vec<CategoryPass>,
}

/// Drives collection for one session.
///
/// Owns the quota tracker and session counters; the fetcher and store are
/// borrowed collaborators.
pub struct Collector<'a, F: CatalogFetcher, S: RecordStore> {
    fetcher: &'a F,
    store: &'a S,
    config: SamplerConfig,
    extractor: ListingExtractor,
    tracker: QuotaTracker,
    stats: SessionStats,
    cancel: CancellationToken,
    fetched_once: bool,
}

impl<'a, F: CatalogFetcher, S: RecordStore> Collector<'a, F, S> {
    /// Validate the configuration and set up an empty session.
    pub fn new(config: SamplerConfig, fetcher: &'a F, store: &'a S) -> Result<Self> {
        config.validate()?;

        let tracker = QuotaTracker::with_target_total(&config.matrix, config.effective_target());
        let extractor = ListingExtractor::new(config.urls.base_url.clone());

        Ok(Self {
            fetcher,
            store,
            config,
            extractor,
            tracker,
            stats: SessionStats::new(),
            cancel: CancellationToken::new(),
            fetched_once: false,
        })
    }

    /// Stop cooperatively when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Use a custom listing extractor.
    pub fn with_extractor(mut self, extractor: ListingExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Seed the tracker from counts already in the store.
    ///
    /// Returns the number of records seeded.
    pub async fn seed_from_store(&mut self) -> Result<usize> {
        let progress = self.store.load_progress().await?;
        self.tracker.load_progress(&progress);
        Ok(self.tracker.seeded_total())
    }

    pub fn tracker(&self) -> &QuotaTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Collect until the target is reached, pages run out or cancellation.
    pub async fn run(&mut self) -> Result<CollectionReport> {
        info!(
            target = self.tracker.target_total(),
            already_collected = self.tracker.total_collected(),
            max_pages = self.config.max_pages_per_category,
            "Starting collection"
        );

        let mut visited: HashSet<CategoryKey> = HashSet::new();
        let mut passes = Vec::new();

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if self.tracker.is_complete() {
                break StopReason::TargetReached;
            }
            let Some(category) = self.tracker.next_priority_excluding(&visited) else {
                break StopReason::PagesExhausted;
            };

            let pass = self.collect_category(category).await;
            visited.insert(category);
            let outcome = pass.outcome;
            passes.push(pass);

            if outcome == PassOutcome::Cancelled {
                break StopReason::Cancelled;
            }
        };

        self.stats.finish();
        info!(
            reason = ?stop_reason,
            admitted = self.stats.admitted,
            rejected = self.stats.rejected,
            duplicates = self.stats.duplicates,
            failed_requests = self.stats.failed_requests,
            "Collection finished"
        );

        Ok(CollectionReport {
            stop_reason,
            stats: self.stats.clone(),
            summary: self.tracker.completion_summary(),
            passes,
        })
    }

    async fn collect_category(&mut self, category: CategoryKey) -> CategoryPass {
        let admitted_before = self.stats.admitted;
        let mut pass = CategoryPass {
            category,
            pages_fetched: 0,
            admitted: 0,
            outcome: PassOutcome::PageLimit,
        };

        let priority = self.tracker.status(category).map(|s| s.priority).unwrap_or(0.0);
        info!(category = %category, priority, "Collecting category");

        for page in 1..=self.config.max_pages_per_category {
            if let Some(outcome) = self.check_stop(category) {
                pass.outcome = outcome;
                break;
            }

            if !self.polite_delay().await {
                pass.outcome = PassOutcome::Cancelled;
                break;
            }

            self.stats.record_request();
            let fetched = match self.fetcher.fetch_listing(category, page).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    let url = self.config.urls.listing_url(category.style, page);
                    warn!(category = %category, page, url = %url, error = %e, "Listing fetch failed");
                    self.stats.record_failure(url);
                    pass.outcome = PassOutcome::TransportError;
                    break;
                }
            };
            self.stats.record_page();
            pass.pages_fetched += 1;

            let listing = self.extractor.extract_page(&fetched.html);
            self.stats.skipped_fragments += listing.skipped;
            if listing.is_end_of_listing() {
                debug!(category = %category, page, "No products on page, end of listing");
                pass.outcome = PassOutcome::EndOfListing;
                break;
            }

            debug!(category = %category, page, items = listing.items.len(), "Processing listing page");
            for item in listing.items {
                if self.tracker.is_complete() {
                    break;
                }
                self.process_item(item, category).await;
            }
        }

        // A pass that used up its pages may still have filled the category.
        if pass.outcome == PassOutcome::PageLimit {
            if let Some(outcome) = self.check_stop(category) {
                pass.outcome = outcome;
            }
        }

        pass.admitted = self.stats.admitted - admitted_before;
        info!(
            category = %category,
            pages = pass.pages_fetched,
            admitted = pass.admitted,
            outcome = ?pass.outcome,
            "Category pass finished"
        );
        pass
    }

    fn check_stop(&self, category: CategoryKey) -> Option<PassOutcome> {
        if self.cancel.is_cancelled() {
            Some(PassOutcome::Cancelled)
        } else if self.tracker.is_complete() {
            Some(PassOutcome::TargetReached)
        } else if !self.tracker.can_admit(category) {
            Some(PassOutcome::Completed)
        } else {
            None
        }
    }

    /// Wait the politeness delay before every fetch but the first.
    ///
    /// Returns false when cancelled while waiting.
    async fn polite_delay(&mut self) -> bool {
        if !self.fetched_once {
            self.fetched_once = true;
            return true;
        }
        let delay = self.config.delay();
        if delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    async fn process_item(&mut self, item: ListingItem, current: CategoryKey) {
        let category = item.classify(self.config.classification, current);
        let record = item.into_record(category);

        match self.store.exists(&record.id).await {
            Ok(true) => {
                self.stats.duplicates += 1;
                debug!(id = %record.id, name = %record.name, "Duplicate record");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                self.stats.store_errors += 1;
                warn!(id = %record.id, error = %e, "Duplicate check failed, skipping record");
                return;
            }
        }

        if !self.tracker.can_admit(category) {
            self.stats.rejected += 1;
            debug!(category = %category, name = %record.name, "Category cannot admit, discarding");
            return;
        }

        match self.store.insert(&record).await {
            Ok(true) => {
                if self.tracker.admit(&record) {
                    self.stats.admitted += 1;
                }
            }
            Ok(false) => {
                self.stats.failed_inserts += 1;
                warn!(id = %record.id, "Store refused record");
            }
            Err(e) => {
                self.stats.failed_inserts += 1;
                warn!(id = %record.id, error = %e, "Failed to persist record");
            }
        }
    }
}

/// Seed from the store, then collect.
///
/// Progress that cannot be loaded is logged and the run starts unseeded;
/// duplicate checks still keep it from re-admitting stored records.
pub async fn collect<F, S>(
    config: SamplerConfig,
    fetcher: &F,
    store: &S,
    cancel: CancellationToken,
) -> Result<CollectionReport>
where
    F: CatalogFetcher,
    S: RecordStore,
{
    let mut collector = Collector::new(config, fetcher, store)?.with_cancellation(cancel);
    match collector.seed_from_store().await {
        Ok(seeded) => info!(seeded, "Loaded existing progress"),
        Err(e) => warn!(error = %e, "Could not load existing progress, starting unseeded"),
    }
    collector.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{
        empty_listing_html, listing_of, FaultyStore, MockFetcher, MockFetcherCall,
    };
    use crate::types::{
        config::ClassificationMode,
        matrix::SamplingMatrix,
        taxonomy::{RidingStyle, SkillLevel},
    };

    const A: CategoryKey = CategoryKey::new(SkillLevel::Intermediate, RidingStyle::Freestyle);
    const B: CategoryKey = CategoryKey::new(SkillLevel::Intermediate, RidingStyle::Carving);

    fn config(entries: &[(CategoryKey, u32)]) -> SamplerConfig {
        SamplerConfig::new()
            .with_matrix(SamplingMatrix::from_entries(entries.iter().copied()).unwrap())
            .with_delay_ms(0)
            .with_classification(ClassificationMode::Target)
    }

    #[tokio::test]
    async fn test_fills_target_mode_categories() {
        let fetcher = MockFetcher::new()
            .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One", "Board Two", "Board Three"]))
            .with_listing(RidingStyle::Carving, 1, listing_of(&["Board Four"]));
        let store = MemoryStore::new();

        let mut collector = Collector::new(config(&[(A, 2), (B, 1)]), &fetcher, &store).unwrap();
        let report = collector.run().await.unwrap();

        assert_eq!(report.stop_reason, StopReason::TargetReached);
        assert_eq!(report.stats.admitted, 3);
        assert_eq!(collector.tracker().status(A).unwrap().current, 2);
        assert_eq!(collector.tracker().status(B).unwrap().current, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(report.passes[0].outcome, PassOutcome::Completed);
    }

    #[tokio::test]
    async fn test_transport_error_moves_to_next_category() {
        let fetcher = MockFetcher::new()
            .fail_listing(RidingStyle::Freestyle, 1)
            .with_listing(RidingStyle::Carving, 1, listing_of(&["Board Four"]));
        let store = MemoryStore::new();

        let mut collector = Collector::new(config(&[(A, 2), (B, 1)]), &fetcher, &store).unwrap();
        let report = collector.run().await.unwrap();

        assert_eq!(report.stop_reason, StopReason::PagesExhausted);
        assert_eq!(report.passes[0].category, A);
        assert_eq!(report.passes[0].outcome, PassOutcome::TransportError);
        assert_eq!(report.stats.failed_requests, 1);
        assert_eq!(report.stats.failed_urls.len(), 1);
        assert_eq!(collector.tracker().status(B).unwrap().current, 1);
    }

    #[tokio::test]
    async fn test_empty_page_ends_listing() {
        let fetcher = MockFetcher::new()
            .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One"]))
            .with_listing(RidingStyle::Freestyle, 2, empty_listing_html());
        let store = MemoryStore::new();

        let mut collector = Collector::new(config(&[(A, 5)]), &fetcher, &store).unwrap();
        let report = collector.run().await.unwrap();

        assert_eq!(report.passes.len(), 1);
        assert_eq!(report.passes[0].pages_fetched, 2);
        assert_eq!(report.passes[0].outcome, PassOutcome::EndOfListing);
        assert_eq!(report.stop_reason, StopReason::PagesExhausted);
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_is_respected() {
        let mut fetcher = MockFetcher::new();
        for page in 1..=5 {
            fetcher = fetcher.with_listing(
                RidingStyle::Freestyle,
                page,
                listing_of(&[&format!("Board Page {page}")]),
            );
        }
        let store = MemoryStore::new();

        let mut collector =
            Collector::new(config(&[(A, 10)]).with_max_pages(3), &fetcher, &store).unwrap();
        let report = collector.run().await.unwrap();

        assert_eq!(report.passes[0].pages_fetched, 3);
        assert_eq!(report.passes[0].outcome, PassOutcome::PageLimit);
        assert_eq!(report.stats.admitted, 3);
        assert!(!fetcher.calls().contains(&MockFetcherCall::Listing { category: A, page: 4 }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let fetcher = MockFetcher::new().with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One"]));
        let store = MemoryStore::new();
        let token = CancellationToken::new();
        token.cancel();

        let report = collect(config(&[(A, 2)]), &fetcher, &store, token).await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_delay() {
        let fetcher = MockFetcher::new()
            .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One"]))
            .with_listing(RidingStyle::Freestyle, 2, listing_of(&["Board Two"]));
        let store = MemoryStore::new();
        let token = CancellationToken::new();

        let cfg = config(&[(A, 5)]).with_delay_ms(60_000);
        let mut collector = Collector::new(cfg, &fetcher, &store)
            .unwrap()
            .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            token.cancel();
        });

        let report = tokio::time::timeout(std::time::Duration::from_secs(5), collector.run())
            .await
            .expect("run should stop promptly")
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.stats.admitted, 1);
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_progress_starts_unseeded() {
        let fetcher = MockFetcher::new()
            .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One", "Board Two"]));
        let store = FaultyStore::with_records([crate::types::record::Record::new("Board One", A)])
            .fail_progress();

        let report = collect(config(&[(A, 2)]), &fetcher, &store, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.summary.overall.collected, 1);
        assert_eq!(report.stats.duplicates, 1);
        assert_eq!(report.stats.admitted, 1);
        assert_eq!(store.inner().len(), 2);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let fetcher = MockFetcher::new();
        let store = MemoryStore::new();
        let result = Collector::new(SamplerConfig::new().with_max_pages(0), &fetcher, &store);
        assert!(result.is_err());
    }
}
