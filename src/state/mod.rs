//! State module for tracking a single crawl
//!
//! # Components
//!
//! - `PageCursor`: the current listing page and the pages already visited
//! - `RunCounters`: images added, already existing, and failed
//! - `Termination` / `CrawlReport`: why a crawl stopped and what it did

mod counters;
mod cursor;

pub use counters::RunCounters;
pub use cursor::PageCursor;

use std::fmt;

/// Reason a crawl stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The cancellation token fired
    Interrupted,

    /// A listing page resolved to a URL that was already crawled in this run
    RevisitedPage { url: String },

    /// Not a full crawl, and an image already in the corpus was reached
    KnownImage { page_url: String },

    /// A listing page had neither image containers nor image page links
    OutOfPages { page: u32 },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "interrupted"),
            Self::RevisitedPage { url } => {
                write!(f, "trying to visit a page that has already been visited: {}", url)
            }
            Self::KnownImage { page_url } => {
                write!(f, "not a full crawl, stopped at known image {}", page_url)
            }
            Self::OutOfPages { page } => write!(
                f,
                "no image containers or page links on page {} (probably ran out of pages)",
                page
            ),
        }
    }
}

/// Final outcome of one crawl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub termination: Termination,
    pub counters: RunCounters,
    /// Last page number the crawl worked on
    pub last_page: u32,
}
