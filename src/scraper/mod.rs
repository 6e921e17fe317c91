//! Page acquisition. Each backend turns a URL into a queryable
//! [`Document`]; the extractor does not care which one ran.

pub mod browser;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::document::Document;
use crate::utils::error::Result;

pub use browser::{BrowserRenderer, LiveDocument};
pub use http::HttpFetcher;

#[async_trait(?Send)]
pub trait PageSource {
    fn name(&self) -> &str;

    /// Fetches `url` and hands back something selectors can run against.
    /// Any error here is an acquisition failure and ends the run.
    async fn acquire(&self, url: &str) -> Result<Box<dyn Document>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain GET, static HTML.
    Static,
    /// Headless Chrome, rendered DOM.
    Headless,
}

pub fn page_source(backend: Backend, config: &AppConfig) -> Result<Box<dyn PageSource>> {
    match backend {
        Backend::Static => Ok(Box::new(HttpFetcher::new(config.scraper.clone())?)),
        Backend::Headless => Ok(Box::new(BrowserRenderer::new(
            config.browser.clone(),
            config.scraper.clone(),
            config.selectors.ready.clone(),
        ))),
    }
}
