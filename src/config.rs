use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use url::Url;

use crate::selectors::SelectorMap;

/// Product page used when no URL is given on the command line.
pub const DEFAULT_TARGET_URL: &str =
    "https://www.amazon.com/Logitech-Master-Bluetooth-Wireless-Receiver/dp/B0FB21526X";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const DEFAULT_CONFIG_FILE: &str = "product-scraper";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub browser: BrowserConfig,
    pub selectors: SelectorMap,
    pub scraping_api: ScrapingApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub target_url: String,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Seconds.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub chrome_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub navigation_timeout_ms: u64,
    pub ready_timeout_ms: u64,
    /// Pause after the page is ready so deferred widgets can render.
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingApiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub js_render: bool,
    pub premium_proxy: bool,
    pub autoparse: bool,
    /// Seconds. Rendering on the service side is slow.
    pub request_timeout: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout: 30,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_ms: 60_000,
            ready_timeout_ms: 30_000,
            settle_delay_ms: 2_000,
        }
    }
}

impl Default for ScrapingApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.zenrows.com/v1/".to_string(),
            api_key: None,
            js_render: true,
            premium_proxy: true,
            autoparse: true,
            request_timeout: 120,
        }
    }
}

impl AppConfig {
    /// Defaults, then `product-scraper.toml` (or `path`), then `PRODUCT_SCRAPER__*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let s = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(Environment::with_prefix("PRODUCT_SCRAPER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Add Chrome path and API key from the conventional variables if not set
        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }
        if config.scraping_api.api_key.is_none() {
            config.scraping_api.api_key = env::var("ZENROWS_API_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.scraper.target_url) {
            return Err(ConfigError::Message("Invalid target URL format".into()));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(ConfigError::Message("Browser window size must be greater than 0".into()));
        }

        if self.browser.navigation_timeout_ms == 0 || self.browser.ready_timeout_ms == 0 {
            return Err(ConfigError::Message("Browser timeouts must be greater than 0".into()));
        }

        if !is_http_url(&self.scraping_api.endpoint) {
            return Err(ConfigError::Message("Invalid scraping API endpoint".into()));
        }

        if self.scraping_api.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraping API request_timeout must be greater than 0".into(),
            ));
        }

        self.selectors
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(())
    }
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
