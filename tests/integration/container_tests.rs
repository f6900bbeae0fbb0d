//! Crawls of a container-mode site

use crate::support::*;
use librestock::crawler::crawl;
use librestock::storage::CorpusStore;
use librestock::{RunCounters, Termination};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves a thumbnail and cancels the crawl while doing so
struct CancelWhileServing {
    token: CancellationToken,
    body: Vec<u8>,
}

impl Respond for CancelWhileServing {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.token.cancel();
        ResponseTemplate::new(200).set_body_bytes(self.body.clone())
    }
}

#[tokio::test]
async fn test_known_image_skipped_then_out_of_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    mount_listing(
        &server,
        "/",
        1,
        page(&[grid_item(&uri, 1, true), grid_item(&uri, 2, true)]),
    )
    .await;
    mount_listing(&server, "/", 2, page(&[])).await;
    mount_thumbnail(&server, 2).await;
    // The known image is never fingerprinted
    Mock::given(method("GET"))
        .and(path("/thumbs/1.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    seed_known_page(&config, &format!("{}/p/1", uri));

    let report = crawl(&config, "grid", CancellationToken::new())
        .await
        .expect("crawl should finish");

    assert_eq!(report.termination, Termination::OutOfPages { page: 2 });
    assert_eq!(
        report.counters,
        RunCounters {
            added: 1,
            already_existed: 1,
            failed: 0
        }
    );

    let corpus = open_corpus(&config);
    assert!(corpus.image_exists(&format!("{}/p/2", uri)).unwrap());
    assert_eq!(corpus.count_images().unwrap(), 2);
    let thumbnails: Vec<String> = std::fs::read_dir(dir.path().join("thumbs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(thumbnails.len(), 1);
    assert!(thumbnails[0].starts_with("2-") && thumbnails[0].ends_with(".jpg"));
}

#[tokio::test]
async fn test_rerun_counts_existing_instead_of_added() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    mount_listing(
        &server,
        "/",
        1,
        page(&[grid_item(&uri, 1, true), grid_item(&uri, 2, true)]),
    )
    .await;
    mount_listing(&server, "/", 2, page(&[grid_item(&uri, 3, true)])).await;
    mount_listing(&server, "/", 3, page(&[])).await;
    for pattern in 1..=3 {
        mount_thumbnail(&server, pattern).await;
    }

    let first = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(first.counters.added, 3);
    assert_eq!(first.counters.already_existed, 0);

    let second = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(second.termination, Termination::OutOfPages { page: 3 });
    assert_eq!(second.counters.added, 0);
    assert_eq!(second.counters.already_existed, 3);
    assert_eq!(open_corpus(&config).count_images().unwrap(), 3);
}

#[tokio::test]
async fn test_stop_at_first_known_image() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, false, &[grid_site(&uri)]);

    mount_listing(
        &server,
        "/",
        1,
        page(&[grid_item(&uri, 1, true), grid_item(&uri, 2, true)]),
    )
    .await;
    mount_thumbnail(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/thumbs/2.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let known = format!("{}/p/2", uri);
    seed_known_page(&config, &known);

    let report = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(report.termination, Termination::KnownImage { page_url: known });
    assert_eq!(report.counters.added, 1);
    assert_eq!(report.counters.already_existed, 1);
    assert_eq!(report.last_page, 1);
}

#[tokio::test]
async fn test_redirect_to_visited_page_terminates() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    mount_listing(&server, "/", 1, page(&[grid_item(&uri, 1, true)])).await;
    mount_thumbnail(&server, 1).await;
    // Sites that run out of pages often bounce back to the first one
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/?page=1", uri).as_str()),
        )
        .mount(&server)
        .await;

    let report = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(
        report.termination,
        Termination::RevisitedPage {
            url: format!("{}/?page=1", uri)
        }
    );
    assert_eq!(report.counters.added, 1);
    assert_eq!(report.last_page, 2);
}

#[tokio::test]
async fn test_failures_do_not_abort_the_page() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    mount_listing(
        &server,
        "/",
        1,
        page(&[
            grid_item(&uri, 1, true),
            grid_item(&uri, 2, false),
            grid_item(&uri, 3, true),
            grid_item(&uri, 4, true),
        ]),
    )
    .await;
    mount_listing(&server, "/", 2, page(&[])).await;
    mount_thumbnail(&server, 1).await;
    mount_thumbnail(&server, 3).await;
    // Not an image
    Mock::given(method("GET"))
        .and(path("/thumbs/4.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let report = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(report.termination, Termination::OutOfPages { page: 2 });
    assert_eq!(
        report.counters,
        RunCounters {
            added: 2,
            already_existed: 0,
            failed: 2
        }
    );
    assert!(!open_corpus(&config)
        .image_exists(&format!("{}/p/2", uri))
        .unwrap());
}

#[tokio::test]
async fn test_crawl_begins_at_start_page() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, true, &[grid_site(&uri)]);
    config.crawler.start_page = 3;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_listing(&server, "/", 3, page(&[grid_item(&uri, 3, true)])).await;
    mount_listing(&server, "/", 4, page(&[])).await;
    mount_thumbnail(&server, 3).await;

    let report = crawl(&config, "grid", CancellationToken::new()).await.unwrap();
    assert_eq!(report.termination, Termination::OutOfPages { page: 4 });
    assert_eq!(report.counters.added, 1);
}

#[tokio::test]
async fn test_cancelled_crawl_reports_interrupted() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = crawl(&config, "grid", cancel).await.unwrap();
    assert_eq!(report.termination, Termination::Interrupted);
    assert_eq!(report.counters, RunCounters::default());
}

#[tokio::test]
async fn test_cancel_mid_page_stops_before_next_image() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);
    let token = CancellationToken::new();

    mount_listing(
        &server,
        "/",
        1,
        page(&[grid_item(&uri, 1, true), grid_item(&uri, 2, true)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/thumbs/1.png"))
        .respond_with(CancelWhileServing {
            token: token.clone(),
            body: png(1),
        })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thumbs/2.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(2)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&config, "grid", token).await.unwrap();

    // The image in flight is finished, the rest of the page is not touched
    assert_eq!(report.termination, Termination::Interrupted);
    assert_eq!(
        report.counters,
        RunCounters {
            added: 1,
            already_existed: 0,
            failed: 0
        }
    );
    assert_eq!(report.last_page, 1);

    let corpus = open_corpus(&config);
    assert_eq!(corpus.count_images().unwrap(), 1);
    assert!(corpus.image_exists(&format!("{}/p/1", uri)).unwrap());
    assert!(!corpus.image_exists(&format!("{}/p/2", uri)).unwrap());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true, &[grid_site(&uri)]);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let result = crawl(&config, "grid", CancellationToken::new()).await;
    assert!(matches!(result, Err(librestock::LibreError::Fetch(_))));
}
