//! PicJumbo: every listing entry carries its own image, link and tags

use super::{
    absolute_url, attribute, Capabilities, FieldSelector, ImageContainer, SiteAdapter, SiteInfo,
};
use crate::{ConfigError, ConfigResult, ExtractionError, ExtractionResult};
use scraper::{ElementRef, Html};
use url::Url;

pub(crate) const ID: &str = "picjumbo";

const BASE_URL: &str = "https://www.picjumbo.com/";
const PAGE_URL: &str = "https://picjumbo.com/page/{}/";
const THUMBNAIL_QUERY: &str = "?&h=500";

pub struct Picjumbo {
    info: SiteInfo,
    item: FieldSelector,
    button: FieldSelector,
    image: FieldSelector,
    tags: FieldSelector,
}

impl Picjumbo {
    pub fn new() -> ConfigResult<Self> {
        let base_url = Url::parse(BASE_URL)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", BASE_URL, e)))?;

        Ok(Self {
            info: SiteInfo {
                id: ID.to_string(),
                short_name: "PJ".to_string(),
                long_name: "PicJumbo".to_string(),
                base_url,
                page_url_template: PAGE_URL.to_string(),
                first_page_url: None,
            },
            item: FieldSelector::parse("div.item_wrap")?,
            button: FieldSelector::parse("a.button")?,
            image: FieldSelector::parse("img.image")?,
            tags: FieldSelector::parse("div.browse_more")?,
        })
    }

    /// Full-size location: the image's own src over plain http, query removed
    fn full_size_url(&self, doc: &Html) -> ExtractionResult<String> {
        let img = self.image.first(doc, "source url")?;
        let src = attribute(img, "src", "source url")?;
        let src = src.split('?').next().unwrap_or_default();

        match src.strip_prefix("//") {
            Some(rest) if !rest.is_empty() => Ok(format!("http://{}", rest)),
            Some(_) => Err(ExtractionError::InvalidUrl {
                field: "source url",
                value: src.to_string(),
            }),
            None => absolute_url(&self.info.base_url, src, "source url"),
        }
    }
}

impl SiteAdapter for Picjumbo {
    fn info(&self) -> &SiteInfo {
        &self.info
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            image_containers: true,
            image_page_url: true,
            ..Capabilities::default()
        }
    }

    fn image_containers(&self, page: &Html) -> Vec<ImageContainer> {
        self.item.all(page).map(ImageContainer::from_element).collect()
    }

    fn image_page_url(&self, container: &Html) -> ExtractionResult<String> {
        let button = self.button.first(container, "page url")?;
        absolute_url(&self.info.base_url, &attribute(button, "href", "page url")?, "page url")
    }

    fn image_source_url(&self, doc: &Html) -> ExtractionResult<String> {
        self.full_size_url(doc)
    }

    fn image_thumbnail_url(&self, doc: &Html) -> ExtractionResult<String> {
        Ok(format!("{}{}", self.full_size_url(doc)?, THUMBNAIL_QUERY))
    }

    fn tags_container<'a>(&self, doc: &'a Html) -> ExtractionResult<Option<ElementRef<'a>>> {
        Ok(self.tags.all(doc).next())
    }
}
