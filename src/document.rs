use scraper::{ElementRef, Html, Selector};

use crate::utils::error::{AppError, Result};

/// A matched element, detached from whatever backend produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementSnapshot {
    /// Inner text with whitespace runs collapsed and the ends trimmed.
    pub text: String,
    pub attributes: Vec<(String, String)>,
}

impl ElementSnapshot {
    pub fn new(raw_text: &str, attributes: Vec<(String, String)>) -> Self {
        Self {
            text: normalize_text(raw_text),
            attributes,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Anything that can answer CSS selector queries: a parsed static page or
/// a live browser tab.
#[cfg_attr(test, mockall::automock)]
pub trait Document {
    fn select_first(&self, selector: &str) -> Result<Option<ElementSnapshot>>;
    fn select_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>>;
}

pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Static HTML parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    fn compile(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| AppError::Selector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })
    }

    fn snapshot(element: ElementRef<'_>) -> ElementSnapshot {
        // Text nodes carry their own whitespace; joining adds none
        let text = element.text().collect::<String>();
        let attributes = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ElementSnapshot::new(&text, attributes)
    }
}

impl Document for HtmlDocument {
    fn select_first(&self, selector: &str) -> Result<Option<ElementSnapshot>> {
        let css_selector = Self::compile(selector)?;
        Ok(self.html.select(&css_selector).next().map(Self::snapshot))
    }

    fn select_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        let css_selector = Self::compile(selector)?;
        Ok(self.html.select(&css_selector).map(Self::snapshot).collect())
    }
}
