//! Session-scoped counters owned by the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters for one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Records persisted and admitted this session.
    pub admitted: usize,
    /// Records refused because their category was complete or unknown.
    pub rejected: usize,
    /// Records already present in the store.
    pub duplicates: usize,
    /// Store writes that failed or were refused.
    pub failed_inserts: usize,
    /// Duplicate lookups that failed.
    pub store_errors: usize,
    /// Listing fragments without a usable name.
    pub skipped_fragments: usize,

    pub pages_fetched: usize,
    pub requests_made: usize,
    pub failed_requests: usize,
    pub failed_urls: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            admitted: 0,
            rejected: 0,
            duplicates: 0,
            failed_inserts: 0,
            store_errors: 0,
            skipped_fragments: 0,
            pages_fetched: 0,
            requests_made: 0,
            failed_requests: 0,
            failed_urls: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn record_request(&mut self) {
        self.requests_made += 1;
    }

    pub(crate) fn record_page(&mut self) {
        self.pages_fetched += 1;
    }

    pub(crate) fn record_failure(&mut self, url: impl Into<String>) {
        self.failed_requests += 1;
        self.failed_urls.push(url.into());
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the session so far (or in total once finished).
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Fraction of requests that returned a page, 0.0 when none were made.
    pub fn success_rate(&self) -> f64 {
        if self.requests_made == 0 {
            return 0.0;
        }
        (self.requests_made - self.failed_requests) as f64 / self.requests_made as f64
    }
}
