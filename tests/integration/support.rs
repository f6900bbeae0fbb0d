//! Shared fixtures: mock site pages, generated images and test configs

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use librestock::config::{parse_config, Config};
use librestock::fingerprint::Fingerprint;
use librestock::storage::{CorpusStore, ImageSource, NewImage, SqliteStorage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Container-mode site listing at `/?page=N`
pub fn grid_site(uri: &str) -> String {
    format!(
        r#"
[[site]]
id = "grid"
short-name = "GR"
long-name = "Grid Photos"
base-url = "{uri}/"
page-url = "{uri}/?page={{}}"
container-selector = "div.photo"
page-url-selector = "a.permalink"
source-url-selector = "a.download"
thumbnail-url-selector = "img.preview"
tags-selector = "ul.tags"
"#
    )
}

/// Link-mode site listing at `/links?page=N`
pub fn link_site(uri: &str) -> String {
    format!(
        r#"
[[site]]
id = "links"
short-name = "LK"
long-name = "Linked Photos"
base-url = "{uri}/"
page-url = "{uri}/links?page={{}}"
page-link-selector = "article.photo a.open"
source-url-selector = "a.download"
thumbnail-url-selector = "img.preview"
tags-selector = "ul.tags"
"#
    )
}

/// Builds a validated config with the corpus inside `dir`
pub fn config(dir: &TempDir, full_crawl: bool, sites: &[String]) -> Config {
    let toml = format!(
        r#"
[crawler]
full-crawl = {full_crawl}
max-attempts = 2
retry-delay-ms = 1

[storage]
database-path = "{db}"
thumbnail-dir = "{thumbs}"

[fingerprint]
thumbnail-size = 64

{sites}
"#,
        db = dir.path().join("corpus.db").display(),
        thumbs = dir.path().join("thumbs").display(),
        sites = sites.join("\n"),
    );
    parse_config(&toml).expect("test config should be valid")
}

pub fn open_corpus(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.storage.database_path)).expect("open corpus")
}

/// Records `page_url` as already crawled
///
/// The fingerprint has a different size from crawled ones, so it never
/// matches any of them.
pub fn seed_known_page(config: &Config, page_url: &str) {
    let mut corpus = open_corpus(config);
    corpus
        .upsert(
            &NewImage {
                fingerprint: Fingerprint::from_bytes(vec![0xA5; 4]),
                source: ImageSource {
                    short_name: "GR".to_string(),
                    long_name: "Grid Photos".to_string(),
                    source_url: format!("{}.jpg", page_url),
                    page_url: page_url.to_string(),
                },
                tags: Default::default(),
                thumbnail: "seed.jpg".to_string(),
            },
            5,
        )
        .expect("seed corpus");
}

/// Distinct 64x64 test images
pub fn png(pattern: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, y| {
        let light = match pattern {
            1 => x < 32,
            2 => y < 32,
            3 => (x / 16 + y / 16) % 2 == 0,
            _ => x > y,
        };
        if light {
            Rgb([240, 240, 240])
        } else {
            Rgb([15, 15, 15])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// One listing entry of the grid site
pub fn grid_item(uri: &str, id: u32, with_download: bool) -> String {
    let download = if with_download {
        format!(r#"<a class="download" href="{uri}/full/{id}.jpg">Download</a>"#)
    } else {
        String::new()
    };
    format!(
        r##"<div class="photo">
            <a class="permalink" href="/p/{id}">Photo {id}</a>
            {download}
            <img class="preview" src="/thumbs/{id}.png">
            <ul class="tags"><li><a href="/t/a">#tag{id}</a></li><li><a href="/t/common">common</a></li></ul>
        </div>"##
    )
}

/// One listing entry of the link site
pub fn link_item(id: &str) -> String {
    format!(r#"<article class="photo"><a class="open" href="/photo/{id}">open</a></article>"#)
}

/// Detail page of the link site
pub fn detail_page(uri: &str, thumb: u32, tags: &[&str]) -> String {
    let tags: String = tags
        .iter()
        .map(|tag| format!(r##"<li><a href="/t/{tag}">#{tag}</a></li>"##))
        .collect();
    format!(
        r#"<html><body>
            <a class="download" href="{uri}/full/{thumb}.jpg">Download</a>
            <img class="preview" src="{uri}/thumbs/{thumb}.png">
            <ul class="tags">{tags}</ul>
        </body></html>"#
    )
}

pub fn page(items: &[String]) -> String {
    format!("<html><body>{}</body></html>", items.join("\n"))
}

pub async fn mount_listing(server: &MockServer, route: &str, number: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", number.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn mount_thumbnail(server: &MockServer, pattern: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/thumbs/{}.png", pattern)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png(pattern))
                .insert_header("content-type", "image/png"),
        )
        .mount(server)
        .await;
}
