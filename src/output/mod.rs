//! Output module for crawl reports and corpus summaries
//!
//! This module handles:
//! - Printing the outcome of a finished crawl
//! - Loading and printing corpus statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, CorpusStatistics};

use crate::state::CrawlReport;

/// Prints the outcome of a crawl to stdout
pub fn print_report(site_id: &str, report: &CrawlReport) {
    println!("=== Crawl Report: {} ===\n", site_id);
    println!("Stopped on page #{}: {}", report.last_page, report.termination);
    println!("  Added: {}", report.counters.added);
    println!("  Already existed: {}", report.counters.already_existed);
    println!("  Failed: {}", report.counters.failed);
    println!("  Images seen: {}", report.counters.total());
}
