use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::PageSource;
use crate::config::{BrowserConfig, ScraperConfig};
use crate::document::{Document, ElementSnapshot};
use crate::utils::error::{AppError, Result};

/// Rendered fetch: drives headless Chrome to the page, waits for it to
/// settle, then queries the live DOM.
pub struct BrowserRenderer {
    config: BrowserConfig,
    user_agent: String,
    accept_language: String,
    ready_selector: String,
}

/// A rendered tab. Keeps the browser process alive for as long as the
/// document is being queried.
pub struct LiveDocument {
    _browser: Browser,
    tab: Arc<Tab>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    text: String,
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryOutcome {
    Matches(Vec<RawElement>),
    Failed { error: String },
}

impl BrowserRenderer {
    pub fn new(config: BrowserConfig, scraper: ScraperConfig, ready_selector: String) -> Self {
        Self {
            config,
            user_agent: scraper.user_agent,
            accept_language: scraper.accept_language,
            ready_selector,
        }
    }

    fn launch(&self) -> Result<Browser> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .window_size(Some((self.config.window_width, self.config.window_height)))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        // Set Chrome path if provided
        if let Some(chrome_path) = &self.config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))
    }
}

#[async_trait(?Send)]
impl PageSource for BrowserRenderer {
    fn name(&self) -> &str {
        "headless_chrome"
    }

    async fn acquire(&self, url: &str) -> Result<Box<dyn Document>> {
        info!(url, "Rendering page in headless Chrome");
        let start_time = std::time::Instant::now();

        let browser = self.launch()?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(self.config.navigation_timeout_ms));

        tab.set_user_agent(&self.user_agent, Some(self.accept_language.as_str()), None)
            .map_err(|e| AppError::Browser(format!("Failed to set user agent: {}", e)))?;

        tab.navigate_to(url)
            .map_err(|e| AppError::Browser(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| AppError::Browser(format!("Page load failed: {}", e)))?;

        if !self.ready_selector.is_empty() {
            tab.wait_for_element_with_custom_timeout(
                &self.ready_selector,
                Duration::from_millis(self.config.ready_timeout_ms),
            )
            .map_err(|e| {
                AppError::Browser(format!(
                    "Wait for selector '{}' failed: {}",
                    self.ready_selector, e
                ))
            })?;
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        debug!(
            url,
            final_url = %tab.get_url(),
            response_time_ms = start_time.elapsed().as_millis() as u64,
            "Page rendered"
        );

        Ok(Box::new(LiveDocument {
            _browser: browser,
            tab,
        }))
    }
}

impl LiveDocument {
    fn query(&self, selector: &str, first_only: bool) -> Result<Vec<ElementSnapshot>> {
        let script = query_script(selector, first_only)?;

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| AppError::Browser(format!("Selector evaluation failed: {}", e)))?;

        let payload = result
            .value
            .as_ref()
            .and_then(|value| value.as_str())
            .ok_or_else(|| AppError::Browser(format!("No result for selector '{}'", selector)))?;

        parse_query_result(selector, payload)
    }
}

impl Document for LiveDocument {
    fn select_first(&self, selector: &str) -> Result<Option<ElementSnapshot>> {
        Ok(self.query(selector, true)?.into_iter().next())
    }

    fn select_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        self.query(selector, false)
    }
}

/// Builds the in-page query. The result is serialized to a JSON string so it
/// comes back by value over the DevTools protocol.
fn query_script(selector: &str, first_only: bool) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        r#"
        (function() {{
            try {{
                let nodes = Array.from(document.querySelectorAll({selector}));
                if ({first_only}) {{
                    nodes = nodes.slice(0, 1);
                }}
                return JSON.stringify(nodes.map(function(node) {{
                    return {{
                        text: node.innerText || node.textContent || "",
                        attributes: Array.from(node.attributes).map(function(a) {{
                            return [a.name, a.value];
                        }})
                    }};
                }}));
            }} catch (e) {{
                return JSON.stringify({{ error: e.message }});
            }}
        }})()
        "#,
        selector = quoted,
        first_only = first_only,
    ))
}

fn parse_query_result(selector: &str, payload: &str) -> Result<Vec<ElementSnapshot>> {
    match serde_json::from_str::<QueryOutcome>(payload)? {
        QueryOutcome::Matches(elements) => Ok(elements
            .into_iter()
            .map(|element| ElementSnapshot::new(&element.text, element.attributes))
            .collect()),
        QueryOutcome::Failed { error } => Err(AppError::Selector {
            selector: selector.to_string(),
            message: error,
        }),
    }
}
