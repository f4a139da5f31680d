//! HTTP fetcher for the live catalog.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{CatalogFetcher, FetchedPage};
use crate::types::config::{CatalogUrls, SamplerConfig};
use crate::types::taxonomy::CategoryKey;

/// Fetches listing and product pages over HTTP with browser-like headers.
///
/// Listing URLs depend only on the riding style; skill levels share pages.
pub struct HttpFetcher {
    client: reqwest::Client,
    urls: CatalogUrls,
}

impl HttpFetcher {
    /// Build a client from the run configuration.
    pub fn new(config: &SamplerConfig) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            urls: config.urls.clone(),
        })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client, urls: CatalogUrls) -> Self {
        Self { client, urls }
    }

    pub fn urls(&self) -> &CatalogUrls {
        &self.urls
    }

    async fn get(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            map_reqwest_error(url, e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        debug!(url = %url, bytes = html.len(), "HTTP fetch complete");
        Ok(FetchedPage::new(url, html))
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
        }
    } else {
        FetchError::Http(Box::new(e))
    }
}

#[async_trait]
impl CatalogFetcher for HttpFetcher {
    async fn fetch_listing(&self, category: CategoryKey, page: u32) -> FetchResult<FetchedPage> {
        let url = self.urls.listing_url(category.style, page);
        self.get(&url).await
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        if url::Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }
        self.get(url).await
    }
}
