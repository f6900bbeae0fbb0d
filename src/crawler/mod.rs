//! Crawler module
//!
//! This module contains the crawl itself:
//! - HTTP fetching with bounded retries
//! - The paging controller that drives one site's crawl

mod controller;
mod fetcher;

pub use controller::{Controller, CrawlOptions};
pub use fetcher::{
    build_http_client, BodyMode, ByteStream, FetchBody, FetchResponse, FetchedPage, Fetcher,
};

use crate::config::Config;
use crate::fingerprint::DedupEngine;
use crate::site::SiteRegistry;
use crate::state::CrawlReport;
use crate::storage::open_shared_storage;
use crate::LibreError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Crawls one site with the given configuration
///
/// Builds the site adapter, opens the corpus, wires the fetcher and dedup
/// engine together and runs a controller until it terminates.
pub async fn crawl(
    config: &Config,
    site_id: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, LibreError> {
    let site = SiteRegistry::new(config).build(site_id)?;
    let storage = open_shared_storage(Path::new(&config.storage.database_path))?;
    let fetcher = Fetcher::from_config(&config.crawler)?;
    let dedup = DedupEngine::new(
        fetcher.clone(),
        storage.clone(),
        &config.fingerprint,
        &config.storage.thumbnail_dir,
    );

    Controller::new(
        site,
        fetcher,
        dedup,
        storage,
        CrawlOptions::from(&config.crawler),
        cancel,
    )
    .run()
    .await
}
