pub mod config;
pub mod document;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod scraper;
pub mod scraping_api;
pub mod selectors;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use document::{Document, ElementSnapshot, HtmlDocument};
pub use extractor::FieldExtractor;
pub use models::ProductRecord;
pub use selectors::SelectorMap;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
