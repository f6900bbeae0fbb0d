//! Crawls of a link-mode site

use crate::support::*;
use librestock::crawler::crawl;
use librestock::storage::CorpusStore;
use librestock::{RunCounters, Termination};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_unreachable_detail_page_counts_as_failed() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[link_site(&uri)]);

    mount_listing(
        &server,
        "/links",
        1,
        page(&[link_item("gone"), link_item("sunset")]),
    )
    .await;
    mount_listing(&server, "/links", 2, page(&[])).await;
    Mock::given(method("GET"))
        .and(path("/photo/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;
    mount_html(&server, "/photo/sunset", detail_page(&uri, 4, &["sunset", "sky"])).await;
    mount_thumbnail(&server, 4).await;

    let report = crawl(&config, "links", CancellationToken::new()).await.unwrap();
    assert_eq!(report.termination, Termination::OutOfPages { page: 2 });
    assert_eq!(
        report.counters,
        RunCounters {
            added: 1,
            already_existed: 0,
            failed: 1
        }
    );

    let corpus = open_corpus(&config);
    let record = corpus.get_image(1).unwrap();
    assert_eq!(record.sources.len(), 1);
    assert_eq!(record.sources[0].short_name, "LK");
    assert_eq!(record.sources[0].page_url, format!("{}/photo/sunset", uri));
    assert_eq!(record.sources[0].source_url, format!("{}/full/4.jpg", uri));
    assert_eq!(
        record.tags.into_iter().collect::<Vec<_>>(),
        vec!["sky".to_string(), "sunset".to_string()]
    );
}

#[tokio::test]
async fn test_known_link_is_not_fetched() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[link_site(&uri)]);

    mount_listing(&server, "/links", 1, page(&[link_item("old")])).await;
    mount_listing(&server, "/links", 2, page(&[])).await;
    Mock::given(method("GET"))
        .and(path("/photo/old"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    seed_known_page(&config, &format!("{}/photo/old", uri));

    let report = crawl(&config, "links", CancellationToken::new()).await.unwrap();
    assert_eq!(report.counters.already_existed, 1);
    assert_eq!(report.counters.added, 0);
}

#[tokio::test]
async fn test_redirected_detail_page_checked_against_corpus() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, false, &[link_site(&uri)]);

    mount_listing(&server, "/links", 1, page(&[link_item("short-link")])).await;
    Mock::given(method("GET"))
        .and(path("/photo/short-link"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/photo/canonical", uri).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/photo/canonical", detail_page(&uri, 1, &[])).await;
    Mock::given(method("GET"))
        .and(path("/thumbs/1.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let canonical = format!("{}/photo/canonical", uri);
    seed_known_page(&config, &canonical);

    let report = crawl(&config, "links", CancellationToken::new()).await.unwrap();
    assert_eq!(report.termination, Termination::KnownImage { page_url: canonical });
    assert_eq!(report.counters.already_existed, 1);
}

#[tokio::test]
async fn test_detail_page_without_download_link() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[link_site(&uri)]);

    mount_listing(&server, "/links", 1, page(&[link_item("broken"), link_item("fine")])).await;
    mount_listing(&server, "/links", 2, page(&[])).await;
    mount_html(
        &server,
        "/photo/broken",
        "<html><body><img class=\"preview\" src=\"/thumbs/1.png\"></body></html>".to_string(),
    )
    .await;
    mount_html(&server, "/photo/fine", detail_page(&uri, 2, &["city"])).await;
    mount_thumbnail(&server, 2).await;

    let report = crawl(&config, "links", CancellationToken::new()).await.unwrap();
    assert_eq!(report.counters.failed, 1);
    assert_eq!(report.counters.added, 1);
}
