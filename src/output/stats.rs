//! Statistics about the image corpus
//!
//! This module provides functionality for extracting and displaying
//! corpus statistics from the storage layer.

use crate::storage::{CorpusStore, StorageResult};

/// Corpus statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStatistics {
    /// Number of distinct images
    pub total_images: u64,

    /// Number of sources across all images
    pub total_sources: u64,

    /// Number of distinct tags
    pub distinct_tags: u64,

    /// Images found on more than one source
    pub merged_images: u64,

    /// Source count per site, largest first
    pub sources_by_site: Vec<(String, u64)>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn CorpusStore) -> StorageResult<CorpusStatistics> {
    Ok(CorpusStatistics {
        total_images: storage.count_images()?,
        total_sources: storage.count_sources()?,
        distinct_tags: storage.count_distinct_tags()?,
        merged_images: storage.count_merged_images()?,
        sources_by_site: storage.sources_by_site()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Overview:");
    println!("  Images: {}", stats.total_images);
    println!("  Sources: {}", stats.total_sources);
    println!("  Distinct tags: {}", stats.distinct_tags);
    println!();

    if !stats.sources_by_site.is_empty() {
        println!("Sources by Site:");
        for (site, count) in &stats.sources_by_site {
            let percentage = if stats.total_sources > 0 {
                (*count as f64 / stats.total_sources as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", site, count, percentage);
        }
        println!();
    }

    let merge_rate = if stats.total_images > 0 {
        (stats.merged_images as f64 / stats.total_images as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Merge Rate: {:.1}% ({} / {} images found on more than one source)",
        merge_rate, stats.merged_images, stats.total_images
    );
}
