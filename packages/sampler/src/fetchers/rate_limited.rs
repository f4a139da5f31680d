//! Rate-limited fetcher wrapper.
//!
//! Wraps any [`CatalogFetcher`] with a governor token bucket, on top of the
//! collector's fixed politeness delay.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::FetchResult;
use crate::traits::fetcher::{CatalogFetcher, FetchedPage};
use crate::types::taxonomy::CategoryKey;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A fetcher wrapper that enforces a request rate.
pub struct RateLimitedFetcher<F: CatalogFetcher> {
    inner: F,
    limiter: Arc<DirectRateLimiter>,
}

impl<F: CatalogFetcher> RateLimitedFetcher<F> {
    /// Limit to `requests_per_second`; zero is treated as one.
    pub fn new(fetcher: F, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self::with_quota(fetcher, Quota::per_second(rate))
    }

    /// Limit with a sustained rate and a burst allowance.
    pub fn with_burst(fetcher: F, requests_per_second: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        let burst = NonZeroU32::new(burst).unwrap_or(nonzero!(1u32));
        Self::with_quota(fetcher, Quota::per_second(rate).allow_burst(burst))
    }

    pub fn with_quota(fetcher: F, quota: Quota) -> Self {
        Self {
            inner: fetcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: CatalogFetcher> CatalogFetcher for RateLimitedFetcher<F> {
    async fn fetch_listing(&self, category: CategoryKey, page: u32) -> FetchResult<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch_listing(category, page).await
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch_page(url).await
    }
}

/// Extension trait for wrapping fetchers.
pub trait FetcherExt: CatalogFetcher + Sized {
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::new(self, requests_per_second)
    }

    fn rate_limited_with_burst(self, requests_per_second: u32, burst: u32) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::with_burst(self, requests_per_second, burst)
    }
}

impl<F: CatalogFetcher + Sized> FetcherExt for F {}
