//! Error types for scraping and conversion.

use thiserror::Error;

/// Errors that can occur while turning one page into Markdown.
///
/// The assembler catches every variant per page and replaces the page with a
/// placeholder chunk, so none of these abort a run on their own.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or transport failure
    #[error("request to {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Markdown conversion failed
    #[error("conversion error: {0}")]
    Convert(String),

    /// A job URL is not a valid absolute URL
    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Rejected settings, or a job URL with an unsupported scheme
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
