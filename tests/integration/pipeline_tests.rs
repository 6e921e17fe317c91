use super::*;
use product_scraper::{
    AppError, HtmlDocument, ProductRecord,
    pipeline::{render_json, scrape_product},
};
use serde_json::{Value, json};

#[tokio::test]
async fn test_static_pipeline_extracts_every_field() -> anyhow::Result<()> {
    let server = start_product_server(200, product_page()).await;
    let url = product_url(&server);

    let record = scrape_product(&create_test_fetcher(), &create_test_extractor(), &url).await?;

    assert_eq!(
        record.title.as_deref(),
        Some("Logitech MX Master 3S – Wireless Performance Mouse, Ergo, 8K DPI, Quiet Clicks")
    );
    assert_eq!(record.price.as_deref(), Some("$99.99"));
    assert_eq!(record.avg_rating.as_deref(), Some("4.5"));
    assert_eq!(record.review_count.as_deref(), Some("12345"));
    assert_eq!(record.availability.as_deref(), Some("In Stock"));
    assert!(!record.out_of_stock);
    assert_eq!(record.features.len(), 3);
    assert_eq!(record.images.len(), 3);
    assert_eq!(record.category.as_deref(), Some("Electronics > Computers > Mice"));
    assert_eq!(record.ships_from.as_deref(), Some("Amazon.com"));
    assert_eq!(record.sold_by.as_deref(), Some("Amazon.com"));
    assert_eq!(record.url, url);
    Ok(())
}

#[tokio::test]
async fn test_empty_page_yields_fully_keyed_null_record() -> anyhow::Result<()> {
    let server = start_product_server(200, "<html><head></head><body><p>Robot check</p></body></html>").await;
    let url = product_url(&server);

    let record = scrape_product(&create_test_fetcher(), &create_test_extractor(), &url).await?;
    assert_eq!(record, ProductRecord::empty(&url));

    let value: Value = serde_json::from_str(&render_json(&record)?)?;
    assert_eq!(
        value,
        json!({
            "title": null,
            "price": null,
            "avg_rating": null,
            "review_count": null,
            "availability": null,
            "out_of_stock": false,
            "description": null,
            "features": [],
            "images": [],
            "category": null,
            "ships_from": null,
            "sold_by": null,
            "url": url,
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_out_of_stock_page() -> anyhow::Result<()> {
    let page = product_page().replace("In Stock", "Currently unavailable.");
    let server = start_product_server(200, &page).await;

    let record = scrape_product(
        &create_test_fetcher(),
        &create_test_extractor(),
        &product_url(&server),
    )
    .await?;

    assert_eq!(record.availability.as_deref(), Some("Currently unavailable."));
    assert!(record.out_of_stock);
    // The rest of the page is unaffected
    assert_eq!(record.price.as_deref(), Some("$99.99"));
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_produces_no_record() {
    let result = scrape_product(&create_test_fetcher(), &create_test_extractor(), REFUSED_URL).await;

    let err = result.expect_err("no record on acquisition failure");
    assert!(err.is_acquisition_failure());
    assert!(matches!(err, AppError::Connection { .. }));
}

#[tokio::test]
async fn test_http_error_produces_no_record() {
    let server = start_product_server(404, "<html><body>Page Not Found</body></html>").await;

    let result = scrape_product(
        &create_test_fetcher(),
        &create_test_extractor(),
        &product_url(&server),
    )
    .await;

    assert!(matches!(result, Err(AppError::HttpStatus { status: 404, .. })));
}

#[test]
fn test_images_never_duplicated_or_relative() {
    let page = r#"
        <div id="imgTagWrapperId"><img src="//cdn.example.com/main._SX300_.jpg"></div>
        <div id="altImages">
            <img class="a-dynamic-image" src="https://cdn.example.com/a._SS40_.jpg">
            <img class="a-dynamic-image" src="https://cdn.example.com/a._US40_.jpg">
            <img class="a-dynamic-image" src="images/b._SS40_.jpg">
            <img class="a-dynamic-image" src="https://cdn.example.com/c._SS40_.jpg">
            <img class="a-dynamic-image" src="https://cdn.example.com/c._SS40_.jpg">
        </div>
    "#;

    let record = create_test_extractor().extract(&HtmlDocument::parse(page), "https://example.com/dp/1");

    assert_eq!(
        record.images,
        vec![
            "https://cdn.example.com/a._AC_SL1500_.jpg".to_string(),
            "https://cdn.example.com/c._AC_SL1500_.jpg".to_string(),
        ]
    );
}

#[test]
fn test_category_breadcrumbs_joined() {
    let page = r#"
        <div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li><a href="/e">Electronics</a></li>
            <li><a href="/c">Computers</a></li>
            <li><a href="/m">Mice</a></li>
        </ul></div>
    "#;

    let record = create_test_extractor().extract(&HtmlDocument::parse(page), "https://example.com/dp/1");

    assert_eq!(record.category.as_deref(), Some("Electronics > Computers > Mice"));
    assert_eq!(record.title, None);
}
