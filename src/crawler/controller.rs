//! Crawl controller - the paging state machine
//!
//! One controller drives one crawl of one site:
//! - walks listing pages in increasing order from the start page
//! - dispatches each page to container mode or link mode
//! - applies the known-image policy (skip on a full crawl, stop otherwise)
//! - scrapes and stores every new image, counting the outcome
//! - polls the cancellation token at the top of the page and image loops

use crate::config::CrawlerConfig;
use crate::crawler::Fetcher;
use crate::fingerprint::{DedupEngine, ImageCandidate};
use crate::site::{ImageContainer, SiteAdapter};
use crate::state::{CrawlReport, PageCursor, RunCounters, Termination};
use crate::storage::{lock_storage, CorpusStore, ImageSource, SharedStorage, UpsertOutcome};
use crate::url::resolve_link;
use crate::LibreError;
use scraper::Html;
use tokio_util::sync::CancellationToken;

/// Per-crawl policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub start_page: u32,
    /// Keep going past images that are already in the corpus
    pub full_crawl: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            full_crawl: true,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            start_page: config.start_page,
            full_crawl: config.full_crawl,
        }
    }
}

/// What a listing page offers
enum Listing {
    Containers(Vec<ImageContainer>),
    PageLinks(Vec<String>),
    Empty,
}

/// Corpus check result for one page URL
enum Seen {
    New,
    Skip,
    Stop(Termination),
}

pub struct Controller {
    site: Box<dyn SiteAdapter>,
    fetcher: Fetcher,
    dedup: DedupEngine,
    storage: SharedStorage,
    options: CrawlOptions,
    cancel: CancellationToken,
    counters: RunCounters,
}

impl Controller {
    pub fn new(
        site: Box<dyn SiteAdapter>,
        fetcher: Fetcher,
        dedup: DedupEngine,
        storage: SharedStorage,
        options: CrawlOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            site,
            fetcher,
            dedup,
            storage,
            options,
            cancel,
            counters: RunCounters::new(),
        }
    }

    /// Runs the crawl to termination
    ///
    /// The run counters are logged however the crawl ends. Page fetch
    /// failures and storage failures abort the crawl with an error; every
    /// other problem is confined to the image it happened on.
    pub async fn run(mut self) -> Result<CrawlReport, LibreError> {
        tracing::info!("Started crawler for {}", self.site.info().long_name);

        let mut cursor = PageCursor::new(self.options.start_page);
        let result = self.crawl_pages(&mut cursor).await;

        match result {
            Ok(termination) => {
                tracing::info!("{}", termination);
                self.counters.log_summary();
                Ok(CrawlReport {
                    termination,
                    counters: self.counters,
                    last_page: cursor.page(),
                })
            }
            Err(e) => {
                tracing::error!("Crawl aborted on page #{}: {}", cursor.page(), e);
                self.counters.log_summary();
                Err(e)
            }
        }
    }

    async fn crawl_pages(&mut self, cursor: &mut PageCursor) -> Result<Termination, LibreError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(Termination::Interrupted);
            }

            let url = self.site.info().listing_url(cursor.page());
            let page = self.fetcher.fetch_page(&url).await?;
            let final_url = page.final_url.to_string();

            if !cursor.mark_visited(&final_url) {
                return Ok(Termination::RevisitedPage { url: final_url });
            }

            tracing::info!("crawling page #{}", cursor.page());
            tracing::debug!("URL: {}", final_url);

            let listing = self.read_listing(&page.body);
            let stop = match listing {
                Listing::Containers(containers) => {
                    tracing::debug!("crawling image containers");
                    self.crawl_containers(containers).await?
                }
                Listing::PageLinks(links) => {
                    tracing::debug!("crawling image page urls");
                    self.crawl_links(links).await?
                }
                Listing::Empty => {
                    if cursor.visited_count() == 1 {
                        tracing::warn!(
                            "{} yielded no image containers or page links on its first page; check the site's selectors",
                            self.site.info().id
                        );
                    }
                    return Ok(Termination::OutOfPages {
                        page: cursor.page(),
                    });
                }
            };

            if let Some(termination) = stop {
                return Ok(termination);
            }

            cursor.advance();
        }
    }

    fn read_listing(&self, body: &str) -> Listing {
        let doc = Html::parse_document(body);

        let containers = self.site.image_containers(&doc);
        if !containers.is_empty() {
            return Listing::Containers(containers);
        }

        let links = self.site.image_page_links(&doc);
        if !links.is_empty() {
            return Listing::PageLinks(links);
        }

        Listing::Empty
    }

    async fn crawl_containers(
        &mut self,
        containers: Vec<ImageContainer>,
    ) -> Result<Option<Termination>, LibreError> {
        let total = containers.len();

        for (n, container) in containers.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(Some(Termination::Interrupted));
            }
            tracing::info!("crawling image {} of {}", n + 1, total);

            let candidate = {
                let doc = container.document();
                let page_url = match self.site.image_page_url(&doc) {
                    Ok(url) => url,
                    Err(e) => {
                        self.fail("There was a problem getting the page url for this image", &e);
                        continue;
                    }
                };

                match self.check_seen(&page_url)? {
                    Seen::New => {}
                    Seen::Skip => continue,
                    Seen::Stop(termination) => return Ok(Some(termination)),
                }

                self.scrape(&doc, page_url)
            };

            if let Some(candidate) = candidate {
                self.store(candidate).await?;
            }
        }

        Ok(None)
    }

    async fn crawl_links(&mut self, links: Vec<String>) -> Result<Option<Termination>, LibreError> {
        let total = links.len();

        for (n, href) in links.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(Some(Termination::Interrupted));
            }

            let url = match resolve_link(&self.site.info().base_url, href) {
                Some(url) => url,
                None => {
                    tracing::error!("Could not resolve image page link '{}', moving on", href);
                    self.counters.record_failed();
                    continue;
                }
            };
            tracing::info!("crawling image at: {} (image {} of {})", url, n + 1, total);

            match self.check_seen(url.as_str())? {
                Seen::New => {}
                Seen::Skip => continue,
                Seen::Stop(termination) => return Ok(Some(termination)),
            }

            let page = match self.fetcher.fetch_page(url.as_str()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("Failed to reach image page url at: {}, moving on", url);
                    tracing::debug!("{}", e);
                    self.counters.record_failed();
                    continue;
                }
            };

            // Redirects can land on a page the corpus already knows
            let page_url = page.final_url.to_string();
            if page_url != url.as_str() {
                match self.check_seen(&page_url)? {
                    Seen::New => {}
                    Seen::Skip => continue,
                    Seen::Stop(termination) => return Ok(Some(termination)),
                }
            }

            let candidate = {
                let doc = Html::parse_document(&page.body);
                self.scrape(&doc, page_url)
            };

            if let Some(candidate) = candidate {
                self.store(candidate).await?;
            }
        }

        Ok(None)
    }

    /// Applies the known-image policy to a page URL
    fn check_seen(&mut self, page_url: &str) -> Result<Seen, LibreError> {
        if !lock_storage(&self.storage)?.image_exists(page_url)? {
            return Ok(Seen::New);
        }

        tracing::info!("Image already exists in database, moving on");
        self.counters.record_existing();

        if self.options.full_crawl {
            Ok(Seen::Skip)
        } else {
            tracing::info!("Not a full crawl, terminating");
            Ok(Seen::Stop(Termination::KnownImage {
                page_url: page_url.to_string(),
            }))
        }
    }

    /// Extracts source, thumbnail and tags; None when the image failed
    fn scrape(&mut self, doc: &Html, page_url: String) -> Option<ImageCandidate> {
        tracing::info!("getting image source url");
        let source_url = match self.site.image_source_url(doc) {
            Ok(url) => url,
            Err(e) => {
                self.fail("There was a problem getting the image source url for this image", &e);
                return None;
            }
        };

        tracing::info!("getting image thumbnail url");
        let thumbnail_url = match self.site.image_thumbnail_url(doc) {
            Ok(url) => url,
            Err(e) => {
                self.fail("There was a problem getting the thumbnail url for this image", &e);
                return None;
            }
        };

        tracing::info!("getting tags");
        let tags = match self.site.tags(doc) {
            Ok(tags) => tags,
            Err(e) => {
                self.fail("There was a problem getting the tags for this image", &e);
                return None;
            }
        };

        let info = self.site.info();
        Some(ImageCandidate {
            source: ImageSource {
                short_name: info.short_name.clone(),
                long_name: info.long_name.clone(),
                source_url,
                page_url,
            },
            thumbnail_url,
            tags,
        })
    }

    async fn store(&mut self, candidate: ImageCandidate) -> Result<(), LibreError> {
        match self.dedup.store(&candidate).await {
            Ok(UpsertOutcome::Inserted(_)) => self.counters.record_added(),
            Ok(UpsertOutcome::Merged(_)) => self.counters.record_existing(),
            // The corpus itself is unusable
            Err(LibreError::Storage(e)) => return Err(LibreError::Storage(e)),
            Err(e) => self.fail("There was a problem storing this image", &e),
        }
        Ok(())
    }

    fn fail(&mut self, message: &str, error: &dyn std::fmt::Display) {
        tracing::error!("{}, moving on", message);
        tracing::debug!("{}", error);
        self.counters.record_failed();
    }
}
