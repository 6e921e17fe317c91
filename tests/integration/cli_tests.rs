use super::*;
use serde_json::Value;
use tokio::process::Command;

fn scraper_command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_product-scraper"));
    command.env("RUST_LOG", "product_scraper=debug");
    command
}

#[tokio::test]
async fn test_fetch_prints_json_on_stdout() -> anyhow::Result<()> {
    let server = start_product_server(200, product_page()).await;
    let url = product_url(&server);

    let output = scraper_command().args(["fetch", url.as_str()]).output().await?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let value: Value = serde_json::from_str(&stdout)?;

    assert_eq!(value["price"], "$99.99");
    assert_eq!(value["url"], url.as_str());
    // Pretty-printed, non-ASCII left unescaped
    assert!(stdout.starts_with("{\n  \"title\""));
    assert!(stdout.contains("Master 3S – Wireless"));
    Ok(())
}

#[tokio::test]
async fn test_fetch_connection_refused_exits_nonzero() -> anyhow::Result<()> {
    let output = scraper_command().args(["fetch", REFUSED_URL]).output().await?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to scrape product data"));
    Ok(())
}

#[tokio::test]
async fn test_fetch_http_error_exits_nonzero() -> anyhow::Result<()> {
    let server = start_product_server(503, "Service Unavailable").await;

    let output = scraper_command()
        .args(["fetch", product_url(&server).as_str()])
        .output()
        .await?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_api_without_key_exits_nonzero() -> anyhow::Result<()> {
    let output = scraper_command()
        .env_remove("ZENROWS_API_KEY")
        .env_remove("PRODUCT_SCRAPER__SCRAPING_API__API_KEY")
        .args(["api", "https://www.amazon.com/dp/B0FB21526X"])
        .output()
        .await?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_api_prints_body_verbatim() -> anyhow::Result<()> {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(query_param("apikey", "cli-key"))
        .and(query_param("autoparse", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"title\":\"Mouse\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let output = scraper_command()
        .env("PRODUCT_SCRAPER__SCRAPING_API__ENDPOINT", format!("{}/v1/", server.uri()))
        .args(["api", "https://www.amazon.com/dp/B0FB21526X", "--api-key", "cli-key"])
        .output()
        .await?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "{\"title\":\"Mouse\"}\n");
    Ok(())
}

#[tokio::test]
async fn test_api_rejection_body_reported_once() -> anyhow::Result<()> {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"code\":\"AUTH001\"}"))
        .mount(&server)
        .await;

    let output = Command::new(env!("CARGO_BIN_EXE_product-scraper"))
        .env_remove("RUST_LOG")
        .env("PRODUCT_SCRAPER__SCRAPING_API__ENDPOINT", format!("{}/v1/", server.uri()))
        .args(["api", "https://www.amazon.com/dp/B0FB21526X", "--api-key", "bad-key"])
        .output()
        .await?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("{\"code\":\"AUTH001\"}"));
    assert_eq!(stderr.matches("AUTH001").count(), 1);
    Ok(())
}
