use serde::{Deserialize, Serialize};

/// Phrases in the availability line that mean the product cannot be bought.
pub const OUT_OF_STOCK_KEYWORDS: [&str; 3] = ["out of stock", "unavailable", "currently unavailable"];

/// One product page, flattened. Field order is the output key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: Option<String>,
    pub price: Option<String>,
    pub avg_rating: Option<String>,
    pub review_count: Option<String>,
    pub availability: Option<String>,
    pub out_of_stock: bool,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub ships_from: Option<String>,
    pub sold_by: Option<String>,
    pub url: String,
}

impl ProductRecord {
    /// A record with every optional field unset.
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

/// Derives the stock flag from the availability text.
pub fn is_out_of_stock(availability: Option<&str>) -> bool {
    match availability {
        Some(text) => {
            let lowered = text.to_lowercase();
            OUT_OF_STOCK_KEYWORDS
                .iter()
                .any(|keyword| lowered.contains(keyword))
        }
        None => false,
    }
}
