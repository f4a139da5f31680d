//! Configuration for collection runs and the catalog being sampled.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{Result, SamplerError};
use crate::types::matrix::SamplingMatrix;
use crate::types::taxonomy::RidingStyle;

/// Default catalog origin.
pub const DEFAULT_BASE_URL: &str = "https://www.evo.com";

/// Listing root under which each riding style has its own path.
pub const DEFAULT_LISTING_ROOT: &str = "/shop/snowboard/snowboards";

/// Browser user agent sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How listing records are assigned to a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Classify every record from its title, description and URL path.
    #[default]
    Keyword,
    /// Assign the category whose listing is being paginated.
    Target,
}

/// Where listing pages live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogUrls {
    /// Origin used to absolutize relative links, without trailing slash.
    pub base_url: String,

    /// Path prefix of per-style listings.
    pub listing_root: String,
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_root: DEFAULT_LISTING_ROOT.to_string(),
        }
    }
}

impl CatalogUrls {
    /// Point at a different origin (e.g. a local fixture server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Listing path for a riding style.
    pub fn listing_path(&self, style: RidingStyle) -> String {
        format!("{}/{}", self.listing_root.trim_end_matches('/'), style.as_str())
    }

    /// Absolute listing URL. Page 1 carries no query string.
    ///
    /// Listings are keyed by style only; every skill level for a style
    /// paginates the same pages.
    pub fn listing_url(&self, style: RidingStyle, page: u32) -> String {
        let path = self.listing_path(style);
        if page > 1 {
            format!("{}{}?page={}", self.base_url, path, page)
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Check the origin parses as an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| SamplerError::config(format!("invalid base URL {}: {e}", self.base_url)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(SamplerError::config(format!(
                "unsupported base URL scheme: {other}"
            ))),
        }
    }
}

/// Settings for a collection or enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Per-category targets.
    pub matrix: SamplingMatrix,

    /// Overall goal. Defaults to the matrix total.
    pub target_total: Option<usize>,

    /// Maximum listing pages visited per category pass.
    pub max_pages_per_category: u32,

    /// Politeness delay between page fetches in milliseconds.
    pub delay_ms: u64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent header.
    pub user_agent: String,

    /// Optional token-bucket limit on top of the fixed delay.
    pub requests_per_second: Option<u32>,

    pub classification: ClassificationMode,

    pub urls: CatalogUrls,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            matrix: SamplingMatrix::standard(),
            target_total: None,
            max_pages_per_category: 3,
            delay_ms: 2000,
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requests_per_second: None,
            classification: ClassificationMode::Keyword,
            urls: CatalogUrls::default(),
        }
    }
}

impl SamplerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matrix(mut self, matrix: SamplingMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_target_total(mut self, total: usize) -> Self {
        self.target_total = Some(total);
        self
    }

    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages_per_category = pages;
        self
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }

    pub fn with_classification(mut self, mode: ClassificationMode) -> Self {
        self.classification = mode;
        self
    }

    pub fn with_urls(mut self, urls: CatalogUrls) -> Self {
        self.urls = urls;
        self
    }

    /// Effective overall goal.
    pub fn effective_target(&self) -> usize {
        self.target_total.unwrap_or_else(|| self.matrix.total())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.matrix.total() == 0 {
            return Err(SamplerError::config("sampling matrix has no positive targets"));
        }
        if self.target_total == Some(0) {
            return Err(SamplerError::config("target total must be positive"));
        }
        if self.max_pages_per_category == 0 {
            return Err(SamplerError::config("max pages per category must be positive"));
        }
        if self.requests_per_second == Some(0) {
            return Err(SamplerError::config("requests per second must be positive"));
        }
        self.urls.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_pagination() {
        let urls = CatalogUrls::default();
        assert_eq!(
            urls.listing_url(RidingStyle::AllMountain, 1),
            "https://www.evo.com/shop/snowboard/snowboards/all-mountain"
        );
        assert_eq!(
            urls.listing_url(RidingStyle::Powder, 3),
            "https://www.evo.com/shop/snowboard/snowboards/powder?page=3"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let urls = CatalogUrls::default().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            urls.listing_url(RidingStyle::Carving, 1),
            "http://127.0.0.1:8080/shop/snowboard/snowboards/carving"
        );
    }

    #[test]
    fn test_defaults_validate() {
        let config = SamplerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_target(), 50);
        assert_eq!(config.delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(SamplerConfig::new().with_max_pages(0).validate().is_err());
        assert!(SamplerConfig::new().with_target_total(0).validate().is_err());
        assert!(SamplerConfig::new()
            .with_urls(CatalogUrls::default().with_base_url("ftp://example.com"))
            .validate()
            .is_err());
        assert!(SamplerConfig::new()
            .with_urls(CatalogUrls::default().with_base_url("not a url"))
            .validate()
            .is_err());
    }
}
