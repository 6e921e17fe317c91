use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, info};

use super::PageSource;
use crate::config::ScraperConfig;
use crate::document::{Document, HtmlDocument};
use crate::utils::error::{AppError, Result};

/// Static fetch: one GET with browser-like headers, body parsed as HTML.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        // Accept-Encoding is negotiated by reqwest itself (gzip, br, deflate)
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(browser_headers(&config)?)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        info!(url, "Fetching page");
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::from_request(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_request(e, url))?;

        debug!(
            url,
            bytes = body.len(),
            response_time_ms = start_time.elapsed().as_millis() as u64,
            "Page fetched"
        );
        Ok(body)
    }
}

fn browser_headers(config: &ScraperConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Scraping(format!("Invalid header value '{}': {}", value, e)))
}

#[async_trait(?Send)]
impl PageSource for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn acquire(&self, url: &str) -> Result<Box<dyn Document>> {
        let body = self.fetch_html(url).await?;
        Ok(Box::new(HtmlDocument::parse(&body)))
    }
}
