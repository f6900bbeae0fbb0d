use std::collections::HashSet;

/// Listing page cursor for one crawl
///
/// Tracks the page number being crawled and every final page URL seen so far.
/// The visited set only guards against loops within a run (e.g. a site that
/// redirects past-the-end pages back to page one); nothing is persisted.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page: u32,
    visited: HashSet<String>,
}

impl PageCursor {
    /// Creates a cursor positioned at `start_page`
    pub fn new(start_page: u32) -> Self {
        Self {
            page: start_page.max(1),
            visited: HashSet::new(),
        }
    }

    /// Current page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Records a final page URL as visited
    ///
    /// Returns false if it had been visited before.
    pub fn mark_visited(&mut self, final_url: &str) -> bool {
        self.visited.insert(final_url.to_string())
    }

    /// Moves to the next page
    pub fn advance(&mut self) {
        self.page += 1;
    }

    /// Number of distinct pages visited
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
