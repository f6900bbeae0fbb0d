//! Pexels: listing pages only link to per-photo detail pages

use super::{absolute_url, attribute, Capabilities, FieldSelector, SiteAdapter, SiteInfo};
use crate::{ConfigError, ConfigResult, ExtractionResult};
use scraper::{ElementRef, Html};
use url::Url;

pub(crate) const ID: &str = "pexels";

const BASE_URL: &str = "https://www.pexels.com/";
const PAGE_URL: &str = "https://www.pexels.com/?format=html&page={}";

pub struct Pexels {
    info: SiteInfo,
    article: FieldSelector,
    link: FieldSelector,
    download: FieldSelector,
    photo: FieldSelector,
    tags: FieldSelector,
}

impl Pexels {
    pub fn new() -> ConfigResult<Self> {
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", BASE_URL, e)))?;

        Ok(Self {
            info: SiteInfo {
                id: ID.to_string(),
                short_name: "PX".to_string(),
                long_name: "Pexels.com".to_string(),
                base_url,
                page_url_template: PAGE_URL.to_string(),
                first_page_url: None,
            },
            article: FieldSelector::parse("article.photos__photo")?,
            link: FieldSelector::parse("a")?,
            download: FieldSelector::parse("a.js-download")?,
            photo: FieldSelector::parse("img.photo__img")?,
            tags: FieldSelector::parse("ul.list-padding")?,
        })
    }
}

impl SiteAdapter for Pexels {
    fn info(&self) -> &SiteInfo {
        &self.info
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            image_page_links: true,
            ..Capabilities::default()
        }
    }

    fn image_page_links(&self, page: &Html) -> Vec<String> {
        self.article
            .all(page)
            .filter_map(|article| self.link.first_in(article, "page link").ok())
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    fn image_source_url(&self, doc: &Html) -> ExtractionResult<String> {
        let link = self.download.first(doc, "source url")?;
        absolute_url(&self.info.base_url, &attribute(link, "href", "source url")?, "source url")
    }

    fn image_thumbnail_url(&self, doc: &Html) -> ExtractionResult<String> {
        let img = self.photo.first(doc, "thumbnail url")?;
        absolute_url(&self.info.base_url, &attribute(img, "src", "thumbnail url")?, "thumbnail url")
    }

    fn tags_container<'a>(&self, doc: &'a Html) -> ExtractionResult<Option<ElementRef<'a>>> {
        Ok(self.tags.all(doc).next())
    }
}
