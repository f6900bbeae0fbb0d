//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CorpusStore trait.

use crate::fingerprint::Fingerprint;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CorpusStore, StorageError, StorageResult};
use crate::storage::{ImageRecord, ImageSource, NewImage, UpsertOutcome};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // The corpus is shared by crawls of different sites running side by side
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl CorpusStore for SqliteStorage {
    // ===== Lookups =====

    fn image_exists(&self, page_url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM image_sources WHERE page_url = ?1 LIMIT 1",
                params![page_url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn find_near(
        &self,
        fingerprint: &Fingerprint,
        threshold: u32,
    ) -> StorageResult<Option<ImageRecord>> {
        match find_near_id(&self.conn, fingerprint, threshold)? {
            Some(id) => Ok(Some(load_image(&self.conn, id)?)),
            None => Ok(None),
        }
    }

    fn get_image(&self, id: i64) -> StorageResult<ImageRecord> {
        load_image(&self.conn, id)
    }

    // ===== Writes =====

    fn upsert(&mut self, image: &NewImage, threshold: u32) -> StorageResult<UpsertOutcome> {
        // IMMEDIATE takes the write lock before the scan, so two writers
        // cannot both miss and insert the same image
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = match find_near_id(&tx, &image.fingerprint, threshold)? {
            Some(id) => UpsertOutcome::Merged(id),
            None => {
                tx.execute(
                    "INSERT INTO images (fingerprint, thumbnail, created_at) VALUES (?1, ?2, ?3)",
                    params![
                        image.fingerprint.to_hex(),
                        image.thumbnail,
                        Utc::now().to_rfc3339()
                    ],
                )?;
                UpsertOutcome::Inserted(tx.last_insert_rowid())
            }
        };

        tx.execute(
            "INSERT OR IGNORE INTO image_sources (image_id, short_name, long_name, source_url, page_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                outcome.id(),
                image.source.short_name,
                image.source.long_name,
                image.source.source_url,
                image.source.page_url
            ],
        )?;

        for tag in &image.tags {
            tx.execute(
                "INSERT OR IGNORE INTO image_tags (image_id, tag) VALUES (?1, ?2)",
                params![outcome.id(), tag],
            )?;
        }

        tx.commit()?;
        Ok(outcome)
    }

    // ===== Statistics =====

    fn count_images(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM images")
    }

    fn count_sources(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM image_sources")
    }

    fn count_distinct_tags(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(DISTINCT tag) FROM image_tags")
    }

    fn count_merged_images(&self) -> StorageResult<u64> {
        count(
            &self.conn,
            "SELECT COUNT(*) FROM (
                SELECT image_id FROM image_sources GROUP BY image_id HAVING COUNT(*) > 1
            )",
        )
    }

    fn sources_by_site(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT long_name, COUNT(*) AS c FROM image_sources
             GROUP BY long_name ORDER BY c DESC, long_name",
        )?;

        let sites = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sites)
    }
}

/// First record in insertion order within `threshold` of `fingerprint`
fn find_near_id(
    conn: &Connection,
    fingerprint: &Fingerprint,
    threshold: u32,
) -> StorageResult<Option<i64>> {
    let mut stmt = conn.prepare("SELECT id, fingerprint FROM images ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    for row in rows {
        let (id, stored) = row?;
        match Fingerprint::from_hex(&stored) {
            Ok(candidate) if fingerprint.is_near(&candidate, threshold) => return Ok(Some(id)),
            Ok(_) => {}
            Err(_) => tracing::warn!("Skipping image {} with unreadable fingerprint", id),
        }
    }

    Ok(None)
}

fn load_image(conn: &Connection, id: i64) -> StorageResult<ImageRecord> {
    let (fingerprint_hex, thumbnail, created_at): (String, String, String) = conn
        .query_row(
            "SELECT fingerprint, thumbnail, created_at FROM images WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?
        .ok_or(StorageError::ImageNotFound(id))?;

    let fingerprint =
        Fingerprint::from_hex(&fingerprint_hex).map_err(|_| StorageError::InvalidFingerprint {
            id,
            value: fingerprint_hex.clone(),
        })?;

    let mut stmt = conn.prepare(
        "SELECT short_name, long_name, source_url, page_url FROM image_sources
         WHERE image_id = ?1 ORDER BY id",
    )?;
    let sources = stmt
        .query_map(params![id], |row| {
            Ok(ImageSource {
                short_name: row.get(0)?,
                long_name: row.get(1)?,
                source_url: row.get(2)?,
                page_url: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("SELECT tag FROM image_tags WHERE image_id = ?1")?;
    let tags = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(ImageRecord {
        id,
        fingerprint,
        sources,
        tags,
        thumbnail,
        created_at,
    })
}

fn count(conn: &Connection, sql: &str) -> StorageResult<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}
