//! Site variant driven entirely by `[[site]]` configuration entries

use super::{
    absolute_url, attribute, Capabilities, FieldSelector, ImageContainer, SiteAdapter, SiteInfo,
};
use crate::config::{validate_site, SiteEntry};
use crate::{ConfigError, ConfigResult, ExtractionResult};
use scraper::{ElementRef, Html};
use url::Url;

/// A selector plus the attribute holding the URL it points at
struct UrlField {
    selector: FieldSelector,
    attribute: String,
    name: &'static str,
}

impl UrlField {
    fn new(selector: &str, attribute: &str, name: &'static str) -> ConfigResult<Self> {
        Ok(Self {
            selector: FieldSelector::parse(selector)?,
            attribute: attribute.to_string(),
            name,
        })
    }

    fn extract(&self, base: &Url, doc: &Html) -> ExtractionResult<String> {
        let element = self.selector.first(doc, self.name)?;
        let value = attribute(element, &self.attribute, self.name)?;
        absolute_url(base, &value, self.name)
    }
}

/// Listing strategy of a configured site
enum Listing {
    Containers {
        container: FieldSelector,
        page_url: UrlField,
    },
    PageLinks {
        link: FieldSelector,
    },
}

pub struct SelectorSite {
    info: SiteInfo,
    listing: Listing,
    source_url: UrlField,
    thumbnail_url: UrlField,
    tags: Option<FieldSelector>,
}

impl SelectorSite {
    /// Builds an adapter from a config entry, validating it first
    pub fn from_entry(entry: &SiteEntry) -> ConfigResult<Self> {
        validate_site(entry)?;

        let base_url = Url::parse(&entry.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", entry.base_url, e)))?;

        let listing = match (&entry.container_selector, &entry.page_link_selector) {
            (Some(container), _) => {
                let page_url = entry.page_url_selector.as_deref().ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "site '{}' uses containers and must set page-url-selector",
                        entry.id
                    ))
                })?;
                Listing::Containers {
                    container: FieldSelector::parse(container)?,
                    page_url: UrlField::new(page_url, &entry.page_url_attribute, "page url")?,
                }
            }
            (None, Some(link)) => Listing::PageLinks {
                link: FieldSelector::parse(link)?,
            },
            (None, None) => {
                return Err(ConfigError::Validation(format!(
                    "site '{}' must set container-selector or page-link-selector",
                    entry.id
                )))
            }
        };

        Ok(Self {
            info: SiteInfo {
                id: entry.id.clone(),
                short_name: entry.short_name.clone(),
                long_name: entry.long_name.clone(),
                base_url,
                page_url_template: entry.page_url.clone(),
                first_page_url: entry.first_page_url.clone(),
            },
            listing,
            source_url: UrlField::new(
                &entry.source_url_selector,
                &entry.source_url_attribute,
                "source url",
            )?,
            thumbnail_url: UrlField::new(
                &entry.thumbnail_url_selector,
                &entry.thumbnail_url_attribute,
                "thumbnail url",
            )?,
            tags: entry
                .tags_selector
                .as_deref()
                .map(FieldSelector::parse)
                .transpose()?,
        })
    }
}

impl SiteAdapter for SelectorSite {
    fn info(&self) -> &SiteInfo {
        &self.info
    }

    fn capabilities(&self) -> Capabilities {
        match self.listing {
            Listing::Containers { .. } => Capabilities {
                image_containers: true,
                image_page_url: true,
                ..Capabilities::default()
            },
            Listing::PageLinks { .. } => Capabilities {
                image_page_links: true,
                ..Capabilities::default()
            },
        }
    }

    fn image_containers(&self, page: &Html) -> Vec<ImageContainer> {
        match &self.listing {
            Listing::Containers { container, .. } => {
                container.all(page).map(ImageContainer::from_element).collect()
            }
            Listing::PageLinks { .. } => Vec::new(),
        }
    }

    fn image_page_links(&self, page: &Html) -> Vec<String> {
        match &self.listing {
            Listing::PageLinks { link } => link
                .all(page)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string)
                .collect(),
            Listing::Containers { .. } => Vec::new(),
        }
    }

    fn image_page_url(&self, container: &Html) -> ExtractionResult<String> {
        match &self.listing {
            Listing::Containers { page_url, .. } => page_url.extract(&self.info.base_url, container),
            Listing::PageLinks { .. } => Err(crate::ExtractionError::Unsupported {
                operation: "image_page_url",
            }),
        }
    }

    fn image_source_url(&self, doc: &Html) -> ExtractionResult<String> {
        self.source_url.extract(&self.info.base_url, doc)
    }

    fn image_thumbnail_url(&self, doc: &Html) -> ExtractionResult<String> {
        self.thumbnail_url.extract(&self.info.base_url, doc)
    }

    fn tags_container<'a>(&self, doc: &'a Html) -> ExtractionResult<Option<ElementRef<'a>>> {
        Ok(self.tags.as_ref().and_then(|tags| tags.all(doc).next()))
    }
}
