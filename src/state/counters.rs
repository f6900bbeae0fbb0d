/// Per-run image counters
///
/// Reset when a crawl starts and reported when it terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// New records inserted into the corpus
    pub added: u64,

    /// Images whose page URL was already known, or that merged into an
    /// existing near-duplicate record
    pub already_existed: u64,

    /// Images that could not be scraped, fetched, or fingerprinted
    pub failed: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&mut self) {
        self.added += 1;
    }

    pub fn record_existing(&mut self) {
        self.already_existed += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Total number of images the crawl looked at
    pub fn total(&self) -> u64 {
        self.added + self.already_existed + self.failed
    }

    /// Logs the counters the way every crawl ends
    pub fn log_summary(&self) {
        tracing::info!("Crawling halted.");
        tracing::info!("{} images added to database", self.added);
        tracing::info!(
            "{} images already existed from another website",
            self.already_existed
        );
        tracing::info!("{} images failed to add", self.failed);
    }
}
