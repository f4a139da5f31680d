//! Testing utilities: mock fetcher, fault-injecting store and HTML fixtures.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult, Result, SamplerError};
use crate::stores::MemoryStore;
use crate::traits::fetcher::{CatalogFetcher, FetchedPage};
use crate::traits::store::RecordStore;
use crate::types::config::CatalogUrls;
use crate::types::record::{Record, RecordId};
use crate::types::taxonomy::{CategoryKey, RidingStyle};

/// A mock fetcher serving canned pages by URL.
///
/// Listing pages are addressed the way [`crate::fetchers::HttpFetcher`]
/// addresses them, so the same style listing serves every skill level.
/// Unknown URLs answer [`FetchError::NotFound`].
#[derive(Default)]
pub struct MockFetcher {
    urls: CatalogUrls,

    /// Canned pages by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// URLs that fail with a server error
    fail_urls: Arc<RwLock<HashSet<String>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<MockFetcherCall>>>,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFetcherCall {
    Listing { category: CategoryKey, page: u32 },
    Page { url: String },
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve under a different origin.
    pub fn with_urls(mut self, urls: CatalogUrls) -> Self {
        self.urls = urls;
        self
    }

    /// Add a canned page.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Add listing page `page` for a riding style.
    pub fn with_listing(self, style: RidingStyle, page: u32, html: impl Into<String>) -> Self {
        let url = self.urls.listing_url(style, page);
        self.with_page(url, html)
    }

    /// Make listing page `page` for a style fail.
    pub fn fail_listing(self, style: RidingStyle, page: u32) -> Self {
        let url = self.urls.listing_url(style, page);
        self.fail_url(url)
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().insert(url.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetcherCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches attempted.
    pub fn fetch_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn serve(&self, url: &str) -> FetchResult<FetchedPage> {
        if self.fail_urls.read().unwrap().contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }
        self.pages
            .read()
            .unwrap()
            .get(url)
            .map(|html| FetchedPage::new(url, html.clone()))
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}

#[async_trait]
impl CatalogFetcher for MockFetcher {
    async fn fetch_listing(&self, category: CategoryKey, page: u32) -> FetchResult<FetchedPage> {
        self.calls
            .write()
            .unwrap()
            .push(MockFetcherCall::Listing { category, page });
        let url = self.urls.listing_url(category.style, page);
        self.serve(&url)
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(MockFetcherCall::Page {
            url: url.to_string(),
        });
        self.serve(url)
    }
}

/// A [`MemoryStore`] with injectable failures.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_lookups: RwLock<HashSet<RecordId>>,
    fail_inserts: RwLock<HashSet<RecordId>>,
    refuse_inserts: RwLock<HashSet<RecordId>>,
    fail_replace: RwLock<bool>,
    fail_progress: RwLock<bool>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
            ..Default::default()
        }
    }

    /// `exists` errors for this record name.
    pub fn fail_lookup(self, name: &str) -> Self {
        self.fail_lookups.write().unwrap().insert(RecordId::for_name(name));
        self
    }

    /// `insert` errors for this record name.
    pub fn fail_insert(self, name: &str) -> Self {
        self.fail_inserts.write().unwrap().insert(RecordId::for_name(name));
        self
    }

    /// `insert` returns `Ok(false)` for this record name.
    pub fn refuse_insert(self, name: &str) -> Self {
        self.refuse_inserts.write().unwrap().insert(RecordId::for_name(name));
        self
    }

    /// Every `replace` errors.
    pub fn fail_replace(self) -> Self {
        *self.fail_replace.write().unwrap() = true;
        self
    }

    /// Every `load_progress` errors.
    pub fn fail_progress(self) -> Self {
        *self.fail_progress.write().unwrap() = true;
        self
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

fn injected(operation: &str) -> SamplerError {
    SamplerError::storage(format!("injected {operation} failure"))
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn exists(&self, id: &RecordId) -> Result<bool> {
        if self.fail_lookups.read().unwrap().contains(id) {
            return Err(injected("lookup"));
        }
        self.inner.exists(id).await
    }

    async fn insert(&self, record: &Record) -> Result<bool> {
        if self.fail_inserts.read().unwrap().contains(&record.id) {
            return Err(injected("insert"));
        }
        if self.refuse_inserts.read().unwrap().contains(&record.id) {
            return Ok(false);
        }
        self.inner.insert(record).await
    }

    async fn load_progress(&self) -> Result<HashMap<CategoryKey, usize>> {
        if *self.fail_progress.read().unwrap() {
            return Err(injected("progress"));
        }
        self.inner.load_progress().await
    }

    async fn clear(&self) -> Result<usize> {
        self.inner.clear().await
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<Record>> {
        self.inner.list().await
    }

    async fn replace(&self, record: &Record) -> Result<bool> {
        if *self.fail_replace.read().unwrap() {
            return Err(injected("replace"));
        }
        self.inner.replace(record).await
    }
}

/// One product tile on a fixture listing page.
#[derive(Debug, Clone)]
pub struct ProductTile {
    pub name: String,
    pub href: String,
    pub price: Option<String>,
}

impl ProductTile {
    /// Tile linking to `/outlet/{slug}` where the slug is the kebab-cased name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug: String = name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            href: format!("/outlet/{slug}"),
            name,
            price: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }
}

/// Listing page markup with one `.product-thumb` per tile.
pub fn listing_html(tiles: &[ProductTile]) -> String {
    let body: String = tiles
        .iter()
        .map(|tile| {
            let price = tile
                .price
                .as_ref()
                .map(|p| format!(r#"<span class="product-thumb-price">{p}</span>"#))
                .unwrap_or_default();
            format!(
                r#"<div class="product-thumb">
  <a class="product-thumb-link" href="{href}"><span class="product-thumb-title">{name}</span></a>
  {price}
  <img class="product-thumb-image" src="/images/{slug}.jpg">
</div>
"#,
                href = tile.href,
                name = tile.name,
                slug = tile.href.trim_start_matches('/').replace('/', "-"),
            )
        })
        .collect();
    format!("<html><body><div class=\"results\">\n{body}</div></body></html>")
}

/// Listing page built from plain names.
pub fn listing_of(names: &[&str]) -> String {
    let tiles: Vec<ProductTile> = names.iter().map(|n| ProductTile::new(*n)).collect();
    listing_html(&tiles)
}

/// A listing page with no product containers.
pub fn empty_listing_html() -> String {
    "<html><body><p class=\"no-results\">No products found</p></body></html>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::taxonomy::SkillLevel;

    #[tokio::test]
    async fn test_mock_fetcher_serves_listings_by_style() {
        let fetcher = MockFetcher::new().with_listing(RidingStyle::Powder, 1, listing_of(&["Board"]));

        let beginner = CategoryKey::new(SkillLevel::Beginner, RidingStyle::Powder);
        let expert = CategoryKey::new(SkillLevel::Expert, RidingStyle::Powder);
        assert!(fetcher.fetch_listing(beginner, 1).await.is_ok());
        assert!(fetcher.fetch_listing(expert, 1).await.is_ok());
        assert!(matches!(
            fetcher.fetch_listing(expert, 2).await,
            Err(FetchError::NotFound { .. })
        ));

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            MockFetcherCall::Listing {
                category: beginner,
                page: 1
            }
        );
    }

    #[tokio::test]
    async fn test_mock_fetcher_failures() {
        let fetcher = MockFetcher::new()
            .with_listing(RidingStyle::Carving, 1, listing_of(&["Board"]))
            .fail_listing(RidingStyle::Carving, 1);
        let key = CategoryKey::new(SkillLevel::Advanced, RidingStyle::Carving);
        assert!(matches!(
            fetcher.fetch_listing(key, 1).await,
            Err(FetchError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_faulty_store_injection() {
        let key = CategoryKey::new(SkillLevel::Advanced, RidingStyle::Carving);
        let store = FaultyStore::new().fail_lookup("Bad Lookup").refuse_insert("Refused");

        assert!(store.exists(&RecordId::for_name("Bad Lookup")).await.is_err());
        assert!(!store.insert(&Record::new("Refused", key)).await.unwrap());
        assert!(store.insert(&Record::new("Accepted", key)).await.unwrap());
        assert_eq!(store.inner().len(), 1);
    }

    #[test]
    fn test_product_tile_slug() {
        let tile = ProductTile::new("Lib Tech T.Rice Pro");
        assert_eq!(tile.href, "/outlet/lib-tech-t-rice-pro");
    }
}
