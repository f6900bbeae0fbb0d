//! Librestock: a photo-listing crawler with near-duplicate detection
//!
//! This crate walks the paginated listing pages of stock-photo sites, extracts
//! per-image metadata through site adapters, fingerprints every thumbnail and
//! merges near-duplicates into a shared image corpus.

pub mod config;
pub mod crawler;
pub mod fingerprint;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Librestock operations
#[derive(Debug, Error)]
pub enum LibreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Unknown site: {0}")]
    UnknownSite(String),
}

/// HTTP fetch errors, raised once the retry budget is spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} responded with HTTP {status}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Errors raised while pulling a single field out of a page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No element matching '{selector}' for {field}")]
    Missing {
        field: &'static str,
        selector: String,
    },

    #[error("Element for {field} has no '{attribute}' attribute")]
    MissingAttribute {
        field: &'static str,
        attribute: String,
    },

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Site adapter does not support {operation}")]
    Unsupported { operation: &'static str },
}

/// Result type alias for Librestock operations
pub type Result<T> = std::result::Result<T, LibreError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for field extraction
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

// Re-export commonly used types
pub use config::Config;
pub use fingerprint::Fingerprint;
pub use site::{SiteAdapter, SiteRegistry};
pub use state::{CrawlReport, RunCounters, Termination};
