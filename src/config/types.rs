use serde::Deserialize;

/// User agent sent with every request unless the config overrides it
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/45.0.2454.101 Safari/537.36";

/// Main configuration structure for Librestock
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Page number the crawl starts from
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Keep going past images that are already in the corpus
    #[serde(rename = "full-crawl", default = "default_full_crawl")]
    pub full_crawl: bool,

    /// Total number of GET attempts per URL
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            full_crawl: default_full_crawl(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Corpus storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory thumbnails are written to
    #[serde(rename = "thumbnail-dir")]
    pub thumbnail_dir: String,
}

/// Thumbnail and near-duplicate matching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintConfig {
    /// Edge length of the square thumbnail (pixels)
    #[serde(rename = "thumbnail-size", default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Edge length of the hash grid; the fingerprint has `hash_bits²` bits
    #[serde(rename = "hash-bits", default = "default_hash_bits")]
    pub hash_bits: u32,

    /// Two fingerprints match when their distance is strictly below this
    #[serde(rename = "duplicate-threshold", default = "default_duplicate_threshold")]
    pub duplicate_threshold: u32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: default_thumbnail_size(),
            hash_bits: default_hash_bits(),
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

/// A selector-driven site variant
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Identifier used on the command line
    pub id: String,

    #[serde(rename = "short-name")]
    pub short_name: String,

    #[serde(rename = "long-name")]
    pub long_name: String,

    /// Base used to resolve relative links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing page template, `{}` is replaced by the page number
    #[serde(rename = "page-url")]
    pub page_url: String,

    #[serde(rename = "first-page-url")]
    pub first_page_url: Option<String>,

    #[serde(rename = "container-selector")]
    pub container_selector: Option<String>,

    #[serde(rename = "page-link-selector")]
    pub page_link_selector: Option<String>,

    #[serde(rename = "page-url-selector")]
    pub page_url_selector: Option<String>,

    #[serde(rename = "page-url-attribute", default = "default_link_attribute")]
    pub page_url_attribute: String,

    #[serde(rename = "source-url-selector")]
    pub source_url_selector: String,

    #[serde(rename = "source-url-attribute", default = "default_link_attribute")]
    pub source_url_attribute: String,

    #[serde(rename = "thumbnail-url-selector")]
    pub thumbnail_url_selector: String,

    #[serde(rename = "thumbnail-url-attribute", default = "default_image_attribute")]
    pub thumbnail_url_attribute: String,

    #[serde(rename = "tags-selector")]
    pub tags_selector: Option<String>,
}

fn default_start_page() -> u32 {
    1
}

fn default_full_crawl() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    3000
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_thumbnail_size() -> u32 {
    500
}

fn default_hash_bits() -> u32 {
    16
}

fn default_duplicate_threshold() -> u32 {
    5
}

fn default_link_attribute() -> String {
    "href".to_string()
}

fn default_image_attribute() -> String {
    "src".to_string()
}
