//! Site adapters
//!
//! A site adapter knows where one site keeps its images on a listing page and
//! on an image page. Sites come in two shapes:
//! - container sites list every image's metadata inline on the listing page
//! - link sites only link to a detail page per image
//!
//! Every adapter implements [`SiteAdapter`]; the optional operations have
//! defaults that report "nothing here", and [`Capabilities`] declares which
//! ones a variant actually provides so the registry can reject an incomplete
//! adapter before a crawl starts.

mod extract;
mod pexels;
mod picjumbo;
mod registry;
mod selector;

pub use extract::{absolute_url, attribute, tag_names, FieldSelector};
pub use pexels::Pexels;
pub use picjumbo::Picjumbo;
pub use registry::{validate_adapter, SiteRegistry};
pub use selector::SelectorSite;

use crate::url::page_url;
use crate::{ExtractionError, ExtractionResult};
use scraper::{ElementRef, Html};
use std::collections::BTreeSet;
use url::Url;

/// Identifiers of the sites compiled into the crate
pub const BUILTIN_SITE_IDS: &[&str] = &[pexels::ID, picjumbo::ID];

/// Static description of a site
#[derive(Debug, Clone)]
pub struct SiteInfo {
    /// Identifier used on the command line
    pub id: String,
    /// Short code stored with every source, e.g. "PX"
    pub short_name: String,
    /// Human readable name, e.g. "Pexels.com"
    pub long_name: String,
    /// Base that relative links are resolved against
    pub base_url: Url,
    /// Listing page template with a `{}` page placeholder
    pub page_url_template: String,
    /// Replaces the template for page 1 when set
    pub first_page_url: Option<String>,
}

impl SiteInfo {
    /// URL of the given listing page
    pub fn listing_url(&self, page: u32) -> String {
        match &self.first_page_url {
            Some(first) if page == 1 => first.clone(),
            _ => page_url(&self.page_url_template, page),
        }
    }
}

/// Which optional operations a site implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub image_containers: bool,
    pub image_page_links: bool,
    pub image_page_url: bool,
}

/// One image's metadata cut out of a listing page
///
/// Holds the container's outer HTML so it can outlive the page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContainer {
    html: String,
}

impl ImageContainer {
    pub fn from_element(element: ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
        }
    }

    /// Parses the container into a document the extraction operations accept
    ///
    /// Table parts are re-parsed inside a table, otherwise the parser would
    /// drop their `tr`/`td` tags.
    pub fn document(&self) -> Html {
        match leading_tag(&self.html).as_deref().and_then(table_context) {
            Some((open, close)) => {
                Html::parse_fragment(&format!("{}{}{}", open, self.html, close))
            }
            None => Html::parse_fragment(&self.html),
        }
    }
}

fn leading_tag(html: &str) -> Option<String> {
    let rest = html.trim_start().strip_prefix('<')?;
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

fn table_context(tag: &str) -> Option<(&'static str, &'static str)> {
    match tag {
        "tr" => Some(("<table><tbody>", "</tbody></table>")),
        "td" | "th" => Some(("<table><tbody><tr>", "</tr></tbody></table>")),
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => Some(("<table>", "</table>")),
        _ => None,
    }
}

/// Capability interface every site variant implements
pub trait SiteAdapter: Send + Sync {
    fn info(&self) -> &SiteInfo;

    fn capabilities(&self) -> Capabilities;

    /// Per-image containers on a listing page
    fn image_containers(&self, _page: &Html) -> Vec<ImageContainer> {
        Vec::new()
    }

    /// Raw hrefs of image detail pages on a listing page
    fn image_page_links(&self, _page: &Html) -> Vec<String> {
        Vec::new()
    }

    /// Canonical URL of the image a container describes
    fn image_page_url(&self, _container: &Html) -> ExtractionResult<String> {
        Err(ExtractionError::Unsupported {
            operation: "image_page_url",
        })
    }

    /// Full-resolution image URL
    fn image_source_url(&self, doc: &Html) -> ExtractionResult<String>;

    /// Preview image URL used for fingerprinting
    fn image_thumbnail_url(&self, doc: &Html) -> ExtractionResult<String>;

    /// Element holding the tag links, Ok(None) when the page has none
    fn tags_container<'a>(&self, _doc: &'a Html) -> ExtractionResult<Option<ElementRef<'a>>> {
        Ok(None)
    }

    /// Tag strings of the image
    fn tags(&self, doc: &Html) -> ExtractionResult<BTreeSet<String>> {
        Ok(self.tags_container(doc)?.map(tag_names).unwrap_or_default())
    }
}
