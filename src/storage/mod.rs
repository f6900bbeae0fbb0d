//! Storage module for the shared image corpus
//!
//! This module handles all database operations for the corpus, including:
//! - SQLite database initialization and schema management
//! - Page URL existence checks
//! - Near-duplicate lookup by fingerprint
//! - Inserting new images and merging sources/tags into existing ones

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{CorpusStore, StorageError, StorageResult};

use crate::fingerprint::Fingerprint;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the crawl controller and the dedup engine
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Opens (or creates) the corpus database behind a shared handle
pub fn open_shared_storage(path: &Path) -> StorageResult<SharedStorage> {
    Ok(Arc::new(Mutex::new(SqliteStorage::new(path)?)))
}

/// Locks the shared storage, mapping a poisoned lock to a storage error
pub fn lock_storage(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
    storage.lock().map_err(|_| StorageError::Lock)
}

/// Where one copy of an image was found
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageSource {
    /// Short site code, e.g. "PX"
    pub short_name: String,
    /// Human readable site name, e.g. "Pexels.com"
    pub long_name: String,
    /// Full-resolution image URL
    pub source_url: String,
    /// Canonical page identifying the image on that site
    pub page_url: String,
}

/// An image as stored in the corpus
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: i64,
    pub fingerprint: Fingerprint,
    pub sources: Vec<ImageSource>,
    pub tags: BTreeSet<String>,
    pub thumbnail: String,
    pub created_at: String,
}

/// An incoming image to insert or merge
#[derive(Debug, Clone)]
pub struct NewImage {
    pub fingerprint: Fingerprint,
    pub source: ImageSource,
    pub tags: BTreeSet<String>,
    pub thumbnail: String,
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No near-duplicate existed; a new record was created
    Inserted(i64),
    /// The source and tags were merged into this existing record
    Merged(i64),
}

impl UpsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Merged(id) => *id,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Merged(_))
    }
}
