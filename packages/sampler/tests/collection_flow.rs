//! Integration tests for the collection loop.
//!
//! These drive the full path through the public API:
//! 1. Fetch listing pages from a mock catalog
//! 2. Extract and classify product tiles
//! 3. Admit against the sampling matrix
//! 4. Persist to a store

use catalog_sampler::{
    collect,
    testing::{empty_listing_html, listing_html, listing_of, FaultyStore, MockFetcher, ProductTile},
    CategoryKey, ClassificationMode, Collector, FetcherExt, MemoryStore, PassOutcome, Record,
    RecordStore, RidingStyle, SamplerConfig, SamplingMatrix, SkillLevel, StopReason,
};
use tokio_util::sync::CancellationToken;

const BEGINNER_FREESTYLE: CategoryKey = CategoryKey::new(SkillLevel::Beginner, RidingStyle::Freestyle);
const EXPERT_POWDER: CategoryKey = CategoryKey::new(SkillLevel::Expert, RidingStyle::Powder);

/// Helper to build a config over a small matrix with no politeness delay.
fn config(entries: &[(CategoryKey, u32)]) -> SamplerConfig {
    SamplerConfig::new()
        .with_matrix(SamplingMatrix::from_entries(entries.iter().copied()).unwrap())
        .with_delay_ms(0)
}

fn target_mode(entries: &[(CategoryKey, u32)]) -> SamplerConfig {
    config(entries).with_classification(ClassificationMode::Target)
}

#[tokio::test]
async fn test_keyword_mode_balances_across_categories() {
    let fetcher = MockFetcher::new().with_listing(
        RidingStyle::Freestyle,
        1,
        listing_of(&[
            "Starter Park Board One",
            "Starter Park Board Two",
            "Starter Park Board Three",
            "Cruiser Board",
            "Pro Powder Board",
        ]),
    );
    let store = MemoryStore::new();

    let report = collect(
        config(&[(BEGINNER_FREESTYLE, 2), (EXPERT_POWDER, 1)]),
        &fetcher,
        &store,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(report.stats.admitted, 3);
    // Third starter board (category full) and the cruiser (untracked category)
    assert_eq!(report.stats.rejected, 2);
    assert_eq!(report.summary.breakdown[&BEGINNER_FREESTYLE].current, 2);
    assert_eq!(report.summary.breakdown[&EXPERT_POWDER].current, 1);
    assert!(report.summary.overall.is_complete);

    let progress = store.load_progress().await.unwrap();
    assert_eq!(progress[&BEGINNER_FREESTYLE], 2);
    assert_eq!(progress[&EXPERT_POWDER], 1);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_completed_category_rejects_further_records() {
    let fetcher = MockFetcher::new().with_listing(
        RidingStyle::Freestyle,
        1,
        listing_of(&["Board One", "Board Two", "Board Three", "Board Four"]),
    );
    let store = MemoryStore::new();

    let report = collect(
        target_mode(&[(BEGINNER_FREESTYLE, 2), (EXPERT_POWDER, 1)]),
        &fetcher,
        &store,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.breakdown[&BEGINNER_FREESTYLE].current, 2);
    assert_eq!(report.stats.rejected, 2);
    assert_eq!(store.len(), 2);
    // Powder listing was never served
    assert_eq!(report.stop_reason, StopReason::PagesExhausted);
}

#[tokio::test]
async fn test_duplicates_are_counted_separately() {
    let store = MemoryStore::with_records([Record::new("Board One", BEGINNER_FREESTYLE)]);
    let fetcher = MockFetcher::new()
        .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One", "Board Two"]))
        .with_listing(RidingStyle::Freestyle, 2, empty_listing_html());

    let mut collector = Collector::new(target_mode(&[(BEGINNER_FREESTYLE, 5)]), &fetcher, &store).unwrap();
    let report = collector.run().await.unwrap();

    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.admitted, 1);
    assert_eq!(report.stats.rejected, 0);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let store = MemoryStore::new();
    let fetcher = MockFetcher::new()
        .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One", "Board Two"]))
        .with_listing(RidingStyle::Freestyle, 2, empty_listing_html());
    let cfg = target_mode(&[(BEGINNER_FREESTYLE, 3)]);

    let first = collect(cfg.clone(), &fetcher, &store, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.stats.admitted, 2);
    assert_eq!(first.passes[0].outcome, PassOutcome::EndOfListing);

    let second = collect(cfg, &fetcher, &store, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.stats.admitted, 0);
    assert_eq!(second.stats.duplicates, 2);
    assert_eq!(second.summary.breakdown[&BEGINNER_FREESTYLE].current, 2);
    assert_eq!(second.summary.overall.admitted_this_session, 0);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_seeded_complete_run_fetches_nothing() {
    let store = MemoryStore::with_records([
        Record::new("Board One", BEGINNER_FREESTYLE),
        Record::new("Board Two", BEGINNER_FREESTYLE),
    ]);
    let fetcher = MockFetcher::new();

    let report = collect(
        target_mode(&[(BEGINNER_FREESTYLE, 2)]),
        &fetcher,
        &store,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert!(report.passes.is_empty());
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_store_failures_skip_records() {
    let store = FaultyStore::new()
        .fail_lookup("Lookup Fails")
        .fail_insert("Insert Fails")
        .refuse_insert("Insert Refused");
    let fetcher = MockFetcher::new()
        .with_listing(
            RidingStyle::Freestyle,
            1,
            listing_of(&["Lookup Fails", "Insert Fails", "Insert Refused", "Board Accepted"]),
        )
        .with_listing(RidingStyle::Freestyle, 2, empty_listing_html());

    let mut collector = Collector::new(target_mode(&[(BEGINNER_FREESTYLE, 5)]), &fetcher, &store).unwrap();
    let report = collector.run().await.unwrap();

    assert_eq!(report.stats.store_errors, 1);
    assert_eq!(report.stats.failed_inserts, 2);
    assert_eq!(report.stats.admitted, 1);
    assert_eq!(collector.tracker().total_collected(), 1);
    assert_eq!(store.inner().len(), 1);
}

#[tokio::test]
async fn test_overall_target_stops_early() {
    let fetcher = MockFetcher::new().with_listing(
        RidingStyle::Freestyle,
        1,
        listing_of(&["Board One", "Board Two", "Board Three"]),
    );
    let store = MemoryStore::new();

    let cfg = target_mode(&[(BEGINNER_FREESTYLE, 3), (EXPERT_POWDER, 1)]).with_target_total(2);
    let report = collect(cfg, &fetcher, &store, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(report.stats.admitted, 2);
    assert_eq!(report.stats.rejected, 0);
    assert_eq!(report.passes.len(), 1);
}

#[tokio::test]
async fn test_fragments_without_names_are_skipped() {
    let tiles = vec![
        ProductTile::new("Board One").with_price("$399.95"),
        ProductTile::new("X"),
        ProductTile::new("Board Two").with_price("$1,299.00"),
    ];
    let fetcher = MockFetcher::new()
        .with_listing(RidingStyle::Freestyle, 1, listing_html(&tiles))
        .with_listing(RidingStyle::Freestyle, 2, empty_listing_html());
    let store = MemoryStore::new();

    let report = collect(
        target_mode(&[(BEGINNER_FREESTYLE, 5)]),
        &fetcher,
        &store,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stats.skipped_fragments, 1);
    assert_eq!(report.stats.admitted, 2);

    let records = store.list().await.unwrap();
    assert_eq!(records[1].current_price, Some(1299.0));
    assert_eq!(
        records[0].product_url.as_deref(),
        Some("https://www.evo.com/outlet/board-one")
    );
}

#[tokio::test]
async fn test_rate_limited_fetcher_in_pipeline() {
    let fetcher = MockFetcher::new()
        .with_listing(RidingStyle::Freestyle, 1, listing_of(&["Board One"]))
        .rate_limited(100);
    let store = MemoryStore::new();

    let report = collect(
        target_mode(&[(BEGINNER_FREESTYLE, 1)]),
        &fetcher,
        &store,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(fetcher.inner().fetch_count(), 1);
}
