//! Configuration module for Librestock
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use librestock::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("librestock.toml")).unwrap();
//! println!("Crawl starts at page {}", config.crawler.start_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FingerprintConfig, SiteEntry, StorageConfig, BROWSER_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub(crate) use validation::{parse_selector, validate_site};
