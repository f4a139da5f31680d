//! Network collaborator for listing and detail pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;
use crate::types::taxonomy::CategoryKey;

/// Raw HTML of one fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL the page was requested from.
    pub url: String,
    pub html: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Fetches catalog pages.
///
/// Errors are per-request; the collector treats them as the end of the
/// current category's pagination and carries on.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch page `page` (1-based) of the listing for `category`.
    async fn fetch_listing(&self, category: CategoryKey, page: u32) -> FetchResult<FetchedPage>;

    /// Fetch a single page by absolute URL.
    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage>;
}

#[async_trait]
impl<T: CatalogFetcher + ?Sized> CatalogFetcher for std::sync::Arc<T> {
    async fn fetch_listing(&self, category: CategoryKey, page: u32) -> FetchResult<FetchedPage> {
        (**self).fetch_listing(category, page).await
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        (**self).fetch_page(url).await
    }
}
