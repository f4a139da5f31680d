use anyhow::{bail, Context, Result};
use catalog_sampler::SamplerConfig;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub user_agent: Option<String>,
    pub delay_seconds: f64,
    pub timeout_seconds: u64,
    pub max_pages: u32,
    pub requests_per_second: Option<u32>,
    /// Overall goal; the matrix total when unset
    pub target_total: Option<usize>,
    pub verbose_logging: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let delay_seconds: f64 = parse_var("SCRAPER_DELAY_SECONDS")?.unwrap_or(2.0);
        if !delay_seconds.is_finite() || delay_seconds < 0.0 {
            bail!("SCRAPER_DELAY_SECONDS must be a non-negative number");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            user_agent: env::var("SCRAPER_USER_AGENT").ok().filter(|v| !v.trim().is_empty()),
            delay_seconds,
            timeout_seconds: parse_var("SCRAPER_TIMEOUT_SECONDS")?.unwrap_or(15),
            max_pages: parse_var("SCRAPER_MAX_PAGES")?.unwrap_or(3),
            requests_per_second: parse_var("SCRAPER_REQUESTS_PER_SECOND")?,
            target_total: parse_var("TARGET_PRODUCTS_TOTAL")?,
            verbose_logging: env::var("VERBOSE_LOGGING")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Library configuration for these settings (standard matrix).
    pub fn sampler_config(&self) -> SamplerConfig {
        let mut config = SamplerConfig::new()
            .with_delay_ms((self.delay_seconds * 1000.0).round() as u64)
            .with_timeout_secs(self.timeout_seconds)
            .with_max_pages(self.max_pages);

        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(agent.clone());
        }
        if let Some(rps) = self.requests_per_second {
            config = config.with_requests_per_second(rps);
        }
        if let Some(total) = self.target_total {
            config = config.with_target_total(total);
        }
        config
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{name} must be a valid number, got {value:?}")),
        _ => Ok(None),
    }
}
