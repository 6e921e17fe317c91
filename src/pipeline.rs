use tracing::info;

use crate::extractor::FieldExtractor;
use crate::models::product::ProductRecord;
use crate::scraper::PageSource;
use crate::utils::error::Result;

/// Acquire then extract. Acquisition errors propagate and no record is
/// built; extraction itself cannot fail.
pub async fn scrape_product(
    source: &dyn PageSource,
    extractor: &FieldExtractor,
    url: &str,
) -> Result<ProductRecord> {
    info!(url, backend = source.name(), "Scraping product page");

    let document = source.acquire(url).await?;
    let record = extractor.extract(document.as_ref(), url);

    info!(
        url,
        title = record.title.as_deref().unwrap_or("<none>"),
        out_of_stock = record.out_of_stock,
        "Product extracted"
    );
    Ok(record)
}

/// Pretty-printed JSON, keys in record order, non-ASCII left as-is.
pub fn render_json(record: &ProductRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
