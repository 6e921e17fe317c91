use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::document::Document;
use crate::models::product::{ProductRecord, is_out_of_stock};
use crate::selectors::SelectorMap;
use crate::utils::error::{AppError, Result};

/// Feature bullets this short or shorter are layout noise.
pub const MIN_FEATURE_LEN: usize = 5;

pub const CATEGORY_SEPARATOR: &str = " > ";

// "4.5 out of 5 stars"
static RATING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)\s*out of").unwrap());

// "1,234 ratings"
static REVIEW_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d,]+)").unwrap());

/// Runs one extraction step, falling back to the empty value on any error.
pub fn attempt<T: Default>(field: &str, step: impl FnOnce() -> Result<T>) -> T {
    match step() {
        Ok(value) => value,
        Err(e) => {
            debug!(field, error = %e, "Extraction gap, using empty value");
            T::default()
        }
    }
}

pub fn parse_rating(text: &str) -> Option<String> {
    RATING_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn parse_review_count(text: &str) -> Option<String> {
    REVIEW_COUNT_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().replace(',', ""))
}

/// True for absolute `http://` or `https://` URLs.
pub fn is_absolute_http(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Pulls a [`ProductRecord`] out of any [`Document`] using a fixed
/// [`SelectorMap`]. Extraction is total: missing data only ever shows up
/// as `None` or an empty list.
pub struct FieldExtractor {
    selectors: SelectorMap,
    image_rewrite: Regex,
}

impl FieldExtractor {
    pub fn new(selectors: SelectorMap) -> Result<Self> {
        let image_rewrite =
            Regex::new(&selectors.image_rewrite.pattern).map_err(|e| AppError::Selector {
                selector: selectors.image_rewrite.pattern.clone(),
                message: format!("image_rewrite ({})", e),
            })?;

        Ok(Self {
            selectors,
            image_rewrite,
        })
    }

    pub fn extract(&self, document: &dyn Document, url: &str) -> ProductRecord {
        let s = &self.selectors;

        let availability = attempt("availability", || text_of(document, &s.availability));
        let out_of_stock = is_out_of_stock(availability.as_deref());

        let record = ProductRecord {
            title: attempt("title", || text_of(document, &s.title)),
            price: attempt("price", || text_of(document, &s.price)),
            avg_rating: attempt("avg_rating", || {
                Ok(text_of(document, &s.avg_rating)?.as_deref().and_then(parse_rating))
            }),
            review_count: attempt("review_count", || {
                Ok(text_of(document, &s.review_count)?
                    .as_deref()
                    .and_then(parse_review_count))
            }),
            availability,
            out_of_stock,
            description: attempt("description", || text_of(document, &s.description)),
            features: attempt("features", || self.features(document)),
            images: self.images(document),
            category: attempt("category", || self.category(document)),
            ships_from: attempt("ships_from", || text_of(document, &s.ships_from)),
            sold_by: attempt("sold_by", || text_of(document, &s.sold_by)),
            url: url.to_string(),
        };

        debug!(
            url,
            title = record.title.is_some(),
            price = record.price.is_some(),
            features = record.features.len(),
            images = record.images.len(),
            "Extracted product fields"
        );

        record
    }

    fn features(&self, document: &dyn Document) -> Result<Vec<String>> {
        Ok(document
            .select_all(&self.selectors.features)?
            .into_iter()
            .map(|element| element.text)
            .filter(|text| text.chars().count() > MIN_FEATURE_LEN)
            .collect())
    }

    fn category(&self, document: &dyn Document) -> Result<Option<String>> {
        let crumbs: Vec<String> = document
            .select_all(&self.selectors.category)?
            .into_iter()
            .map(|element| element.text)
            .collect();

        if crumbs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(crumbs.join(CATEGORY_SEPARATOR)))
        }
    }

    /// Main image first, then the thumbnail strip upsized. Each stage fails
    /// independently of the other.
    fn images(&self, document: &dyn Document) -> Vec<String> {
        let mut images = Vec::new();

        if let Some(main) = attempt("images.main", || self.main_image(document)) {
            images.push(main);
        }

        for candidate in attempt("images.thumbnails", || self.thumbnails(document)) {
            if !images.contains(&candidate) {
                images.push(candidate);
            }
        }

        images
    }

    fn main_image(&self, document: &dyn Document) -> Result<Option<String>> {
        let Some(element) = document.select_first(&self.selectors.main_image)? else {
            return Ok(None);
        };

        let url = element
            .attr(&self.selectors.hires_attribute)
            .filter(|value| !value.is_empty())
            .or_else(|| element.attr(&self.selectors.source_attribute))
            .filter(|value| is_absolute_http(value));

        Ok(url.map(str::to_string))
    }

    fn thumbnails(&self, document: &dyn Document) -> Result<Vec<String>> {
        Ok(document
            .select_all(&self.selectors.thumbnails)?
            .iter()
            .filter_map(|thumb| thumb.attr(&self.selectors.source_attribute))
            .filter(|src| is_absolute_http(src))
            .map(|src| self.upsize(src))
            .collect())
    }

    /// Applies the configured size-token rewrite to a thumbnail URL.
    pub fn upsize(&self, thumbnail_url: &str) -> String {
        self.image_rewrite
            .replace_all(thumbnail_url, self.selectors.image_rewrite.replacement.as_str())
            .into_owned()
    }
}

fn text_of(document: &dyn Document, selector: &str) -> Result<Option<String>> {
    Ok(document.select_first(selector)?.map(|element| element.text))
}
