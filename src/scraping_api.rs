//! Thin passthrough to a hosted scraping service. The service renders the
//! page, rotates proxies and parses the product itself; whatever it sends
//! back is handed to the caller untouched.

use config::ConfigError;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ScrapingApiConfig;
use crate::utils::error::{AppError, Result};

pub struct ScrapingApiClient {
    client: reqwest::Client,
    config: ScrapingApiConfig,
    api_key: String,
}

impl ScrapingApiClient {
    pub fn new(config: ScrapingApiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(ConfigError::Message(
                    "Scraping API key is not set (scraping_api.api_key or ZENROWS_API_KEY)".into(),
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Query parameters sent with every request, in a stable order.
    pub fn query_params<'a>(&'a self, url: &'a str) -> Vec<(&'static str, &'a str)> {
        vec![
            ("url", url),
            ("apikey", self.api_key.as_str()),
            ("js_render", flag(self.config.js_render)),
            ("premium_proxy", flag(self.config.premium_proxy)),
            ("autoparse", flag(self.config.autoparse)),
        ]
    }

    /// Returns the response body exactly as the service sent it.
    pub async fn fetch_raw(&self, url: &str) -> Result<String> {
        info!(url, endpoint = %self.config.endpoint, "Requesting page from scraping API");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query_params(url))
            .send()
            .await
            .map_err(|e| AppError::from_request(e, &self.config.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_request(e, &self.config.endpoint))?;

        // The service explains rejections (bad key, blocked target) in the body
        if !status.is_success() {
            return Err(AppError::ServiceStatus {
                status: status.as_u16(),
                url: self.config.endpoint.clone(),
                body,
            });
        }

        debug!(bytes = body.len(), "Scraping API response received");
        Ok(body)
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}
