//! Database schema definitions
//!
//! Sources and tags live in their own tables so merges are plain
//! `INSERT OR IGNORE` set unions.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per distinct image
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fingerprint TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Every site/page an image was found on
CREATE TABLE IF NOT EXISTS image_sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_id INTEGER NOT NULL REFERENCES images(id),
    short_name TEXT NOT NULL,
    long_name TEXT NOT NULL,
    source_url TEXT NOT NULL,
    page_url TEXT NOT NULL,
    UNIQUE(image_id, short_name, long_name, source_url, page_url)
);

CREATE INDEX IF NOT EXISTS idx_image_sources_page_url ON image_sources(page_url);
CREATE INDEX IF NOT EXISTS idx_image_sources_image ON image_sources(image_id);

-- Tag set per image
CREATE TABLE IF NOT EXISTS image_tags (
    image_id INTEGER NOT NULL REFERENCES images(id),
    tag TEXT NOT NULL,
    PRIMARY KEY(image_id, tag)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
