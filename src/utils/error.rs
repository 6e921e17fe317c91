use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Failed to connect to the server: {url}")]
    Connection { url: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Scraping API returned HTTP {status} for {url}: {body}")]
    ServiceStatus { status: u16, url: String, body: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Scraping error: {0}")]
    Scraping(String),
}

impl AppError {
    /// Classifies errors raised while obtaining the page, before any
    /// extraction happens. These are fatal to a run.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::Timeout { .. }
                | AppError::Connection { .. }
                | AppError::HttpStatus { .. }
                | AppError::ServiceStatus { .. }
                | AppError::Browser(_)
        )
    }

    /// Maps a transport error from `reqwest` onto the acquisition taxonomy.
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            AppError::Timeout { url: url.to_string() }
        } else if err.is_connect() {
            AppError::Connection { url: url.to_string() }
        } else if let Some(status) = err.status() {
            AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            AppError::Http(err)
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
