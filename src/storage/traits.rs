//! Storage traits and error types

use crate::fingerprint::Fingerprint;
use crate::storage::{ImageRecord, NewImage, UpsertOutcome};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Image not found: {0}")]
    ImageNotFound(i64),

    #[error("Stored fingerprint for image {id} is not valid hex: {value}")]
    InvalidFingerprint { id: i64, value: String },

    #[error("Storage lock poisoned")]
    Lock,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus backends
///
/// Records are never deleted. A record's fingerprint and thumbnail are fixed
/// at creation; merges only add sources and tags.
pub trait CorpusStore {
    // ===== Lookups =====

    /// Returns true if any record has a source with this page URL
    fn image_exists(&self, page_url: &str) -> StorageResult<bool>;

    /// Returns the first record, in insertion order, whose fingerprint is
    /// strictly closer than `threshold` bits to `fingerprint`
    ///
    /// This is a linear scan over the whole corpus.
    fn find_near(
        &self,
        fingerprint: &Fingerprint,
        threshold: u32,
    ) -> StorageResult<Option<ImageRecord>>;

    /// Loads a record with its sources and tags
    fn get_image(&self, id: i64) -> StorageResult<ImageRecord>;

    // ===== Writes =====

    /// Inserts the image, or merges its source and tags into the first
    /// near-duplicate record
    ///
    /// Lookup and write happen in one transaction.
    fn upsert(&mut self, image: &NewImage, threshold: u32) -> StorageResult<UpsertOutcome>;

    // ===== Statistics =====

    fn count_images(&self) -> StorageResult<u64>;

    fn count_sources(&self) -> StorageResult<u64>;

    /// Number of distinct tag strings
    fn count_distinct_tags(&self) -> StorageResult<u64>;

    /// Number of records with more than one source
    fn count_merged_images(&self) -> StorageResult<u64>;

    /// Source counts per site long name, largest first
    fn sources_by_site(&self) -> StorageResult<Vec<(String, u64)>>;
}
