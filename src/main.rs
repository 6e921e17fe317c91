use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

use product_scraper::config::AppConfig;
use product_scraper::extractor::FieldExtractor;
use product_scraper::pipeline::{render_json, scrape_product};
use product_scraper::scraper::{Backend, page_source};
use product_scraper::scraping_api::ScrapingApiClient;

#[derive(Parser)]
#[command(name = "product-scraper", version, about = "Extract product fields from a single product page")]
struct Cli {
    /// Configuration file (defaults to ./product-scraper.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the static HTML and extract fields
    Fetch { url: Option<String> },
    /// Render the page in headless Chrome and extract fields
    Browse { url: Option<String> },
    /// Print the hosted scraping API's raw response
    Api {
        url: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("product_scraper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            debug!(error = ?e, "Run failed");
            eprintln!("failed to scrape product data: {:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Fetch { url } => extract(&config, Backend::Static, url).await,
        Command::Browse { url } => extract(&config, Backend::Headless, url).await,
        Command::Api { url, api_key } => {
            if api_key.is_some() {
                config.scraping_api.api_key = api_key;
            }
            let url = url.unwrap_or_else(|| config.scraper.target_url.clone());
            let client = ScrapingApiClient::new(config.scraping_api.clone())?;
            let body = client
                .fetch_raw(&url)
                .await
                .with_context(|| format!("Scraping API request for {} failed", url))?;
            Ok(body)
        }
    }
}

async fn extract(config: &AppConfig, backend: Backend, url: Option<String>) -> Result<String> {
    let url = url.unwrap_or_else(|| config.scraper.target_url.clone());
    info!(url = %url, ?backend, "Starting product scrape");

    let extractor = FieldExtractor::new(config.selectors.clone())?;
    let source = page_source(backend, config)?;

    let record = scrape_product(source.as_ref(), &extractor, &url)
        .await
        .with_context(|| format!("Could not acquire {}", url))?;

    Ok(render_json(&record)?)
}
