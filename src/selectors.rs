//! Selector configuration for product pages.
//!
//! The defaults target the current Amazon product page layout. Update the
//! values here (or override them through configuration) when the markup
//! changes; the extractor itself does not need to change.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, Result};

/// Field name to CSS selector mapping, plus the handful of attribute names
/// and rewrite rules the image collection depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    pub title: String,
    pub price: String,
    pub avg_rating: String,
    pub review_count: String,
    pub availability: String,
    pub description: String,
    pub features: String,
    pub main_image: String,
    pub thumbnails: String,
    pub category: String,
    pub ships_from: String,
    pub sold_by: String,
    /// Attribute on the main image carrying the high-resolution URL.
    pub hires_attribute: String,
    pub source_attribute: String,
    /// Element the browser backend waits for before extracting.
    pub ready: String,
    pub image_rewrite: ImageRewrite,
}

/// Turns a thumbnail URL into its large-size variant.
///
/// Amazon encodes the rendition size as a `._XX123_.` token in the file
/// name, so swapping that token is enough to get the full image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRewrite {
    pub pattern: String,
    pub replacement: String,
}

impl Default for ImageRewrite {
    fn default() -> Self {
        Self {
            pattern: r"\._[A-Z]+\d+_\.".to_string(),
            replacement: "._AC_SL1500_.".to_string(),
        }
    }
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            title: "#productTitle".to_string(),
            price: "span.a-price span.a-offscreen".to_string(),
            avg_rating: "span.a-icon-alt".to_string(),
            review_count: "#acrCustomerReviewText".to_string(),
            availability: "#availability span".to_string(),
            description: "#productDescription p".to_string(),
            features: "#feature-bullets ul li span.a-list-item".to_string(),
            main_image: "#imgTagWrapperId img".to_string(),
            thumbnails: "#altImages img.a-dynamic-image".to_string(),
            category: "#wayfinding-breadcrumbs_feature_div ul li a".to_string(),
            ships_from: "#tabular-buybox-truncate-0 span.tabular-buybox-text".to_string(),
            sold_by: "#tabular-buybox-truncate-1 span.tabular-buybox-text".to_string(),
            hires_attribute: "data-old-hires".to_string(),
            source_attribute: "src".to_string(),
            ready: "#productTitle".to_string(),
            image_rewrite: ImageRewrite::default(),
        }
    }
}

impl SelectorMap {
    /// All selector expressions, paired with the field they feed.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", self.title.as_str()),
            ("price", self.price.as_str()),
            ("avg_rating", self.avg_rating.as_str()),
            ("review_count", self.review_count.as_str()),
            ("availability", self.availability.as_str()),
            ("description", self.description.as_str()),
            ("features", self.features.as_str()),
            ("main_image", self.main_image.as_str()),
            ("thumbnails", self.thumbnails.as_str()),
            ("category", self.category.as_str()),
            ("ships_from", self.ships_from.as_str()),
            ("sold_by", self.sold_by.as_str()),
            ("ready", self.ready.as_str()),
        ]
    }

    /// Checks every selector parses and the rewrite pattern compiles.
    pub fn validate(&self) -> Result<()> {
        for (field, selector) in self.entries() {
            Selector::parse(selector).map_err(|e| AppError::Selector {
                selector: selector.to_string(),
                message: format!("{} ({:?})", field, e),
            })?;
        }

        regex::Regex::new(&self.image_rewrite.pattern).map_err(|e| AppError::Selector {
            selector: self.image_rewrite.pattern.clone(),
            message: format!("image_rewrite ({})", e),
        })?;

        if self.hires_attribute.is_empty() || self.source_attribute.is_empty() {
            return Err(AppError::Scraping(
                "Image attribute names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
