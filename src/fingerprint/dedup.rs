//! Thumbnail download, fingerprinting and corpus upsert

use super::{block_hash, fit_thumbnail, save_thumbnail, Fingerprint};
use crate::config::FingerprintConfig;
use crate::crawler::Fetcher;
use crate::storage::{
    lock_storage, CorpusStore, ImageRecord, ImageSource, NewImage, SharedStorage, UpsertOutcome,
};
use crate::url::thumbnail_stem;
use crate::LibreError;
use image::DynamicImage;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Everything scraped about one image, ready to be stored
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub source: ImageSource,
    pub thumbnail_url: String,
    pub tags: BTreeSet<String>,
}

/// A fitted thumbnail and its fingerprint
#[derive(Debug, Clone)]
pub struct ProcessedThumbnail {
    pub image: DynamicImage,
    pub fingerprint: Fingerprint,
}

/// Turns candidates into corpus records, merging near-duplicates
#[derive(Clone)]
pub struct DedupEngine {
    fetcher: Fetcher,
    storage: SharedStorage,
    thumbnail_size: u32,
    hash_bits: u32,
    threshold: u32,
    thumbnail_dir: PathBuf,
}

impl DedupEngine {
    pub fn new(
        fetcher: Fetcher,
        storage: SharedStorage,
        config: &FingerprintConfig,
        thumbnail_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            storage,
            thumbnail_size: config.thumbnail_size,
            hash_bits: config.hash_bits,
            threshold: config.duplicate_threshold,
            thumbnail_dir: thumbnail_dir.into(),
        }
    }

    /// Downloads a thumbnail, fits it to the square and fingerprints it
    pub async fn process(&self, thumbnail_url: &str) -> Result<ProcessedThumbnail, LibreError> {
        tracing::info!("creating thumbnail from url: {}", thumbnail_url);
        let (_, bytes) = self.fetcher.fetch_bytes(thumbnail_url).await?;

        let image = fit_thumbnail(&bytes, self.thumbnail_size)?;
        let fingerprint = block_hash(&image, self.hash_bits);
        tracing::debug!("fingerprint {}", fingerprint);

        Ok(ProcessedThumbnail { image, fingerprint })
    }

    /// First corpus record within the duplicate threshold
    pub fn find_duplicate(&self, fingerprint: &Fingerprint) -> Result<Option<ImageRecord>, LibreError> {
        Ok(lock_storage(&self.storage)?.find_near(fingerprint, self.threshold)?)
    }

    /// Processes a candidate and inserts it, or merges it into its duplicate
    ///
    /// The thumbnail file is written either way, under a name no other
    /// record uses; a merged record keeps the thumbnail it was created with.
    pub async fn store(&self, candidate: &ImageCandidate) -> Result<UpsertOutcome, LibreError> {
        let processed = self.process(&candidate.thumbnail_url).await?;

        let hex = processed.fingerprint.to_hex();
        let stem = match thumbnail_stem(&candidate.thumbnail_url) {
            Some(stem) => format!("{}-{}", stem, hex),
            None => hex,
        };
        let path = save_thumbnail(&processed.image, &self.thumbnail_dir, &stem)?;

        let image = NewImage {
            fingerprint: processed.fingerprint,
            source: candidate.source.clone(),
            tags: candidate.tags.clone(),
            thumbnail: path.to_string_lossy().into_owned(),
        };

        tracing::info!("storing image in db");
        let outcome = lock_storage(&self.storage)?.upsert(&image, self.threshold)?;

        match outcome {
            UpsertOutcome::Merged(id) => {
                tracing::info!("Found duplicate, id: {}. Adding tags and new source", id)
            }
            UpsertOutcome::Inserted(id) => tracing::debug!("Inserted image {}", id),
        }

        Ok(outcome)
    }
}
