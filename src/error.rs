use thiserror::Error;

/// Errors surfaced by the scraping and analytics pipeline
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Unsupported site: {0}")]
    UnsupportedSite(String),

    #[error("Invalid region pattern '{pattern}': {source}")]
    InvalidRegion {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// A single listing card could not be read; the card is skipped
    #[error("Card extraction failed: {0}")]
    Card(String),

    /// The page source could not deliver or navigate a page
    #[error("Page source error: {0}")]
    PageSource(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Wrap an error coming out of headless_chrome, which reports through anyhow
    pub fn browser(err: anyhow::Error) -> Self {
        ScoutError::Browser(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
