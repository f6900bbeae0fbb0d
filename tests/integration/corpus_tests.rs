//! The corpus shared between crawls of different sites

use crate::support::*;
use librestock::crawler::crawl;
use librestock::output::load_statistics;
use librestock::storage::CorpusStore;
use librestock::{ConfigError, LibreError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[tokio::test]
async fn test_same_image_on_two_sites_is_merged() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri), link_site(&uri)]);

    // Both sites serve thumbnail 1
    mount_listing(&server, "/", 1, page(&[grid_item(&uri, 1, true)])).await;
    mount_listing(&server, "/", 2, page(&[])).await;
    mount_listing(&server, "/links", 1, page(&[link_item("copy")])).await;
    mount_listing(&server, "/links", 2, page(&[])).await;
    mount_html(&server, "/photo/copy", detail_page(&uri, 1, &["dog"])).await;
    mount_thumbnail(&server, 1).await;

    let grid = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(grid.counters.added, 1);

    let links = crawl(&config, "links", CancellationToken::new()).await.unwrap();
    assert_eq!(links.counters.added, 0);
    assert_eq!(links.counters.already_existed, 1);

    let corpus = open_corpus(&config);
    assert_eq!(corpus.count_images().unwrap(), 1);

    let record = corpus.get_image(1).unwrap();
    let sites: Vec<&str> = record.sources.iter().map(|s| s.short_name.as_str()).collect();
    assert_eq!(sites, vec!["GR", "LK"]);
    assert!(record.tags.contains("dog"));
    assert!(record.tags.contains("tag1"));
    let thumbnail = std::path::Path::new(&record.thumbnail);
    let file_name = thumbnail.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("1-") && file_name.ends_with(".jpg"));
    assert!(thumbnail.exists());

    let stats = load_statistics(&corpus).unwrap();
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.total_sources, 2);
    assert_eq!(stats.merged_images, 1);
}

#[tokio::test]
async fn test_unknown_site_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[]);

    let result = crawl(&config, "nowhere", CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(LibreError::Config(ConfigError::UnknownSite(_)))
    ));
}
