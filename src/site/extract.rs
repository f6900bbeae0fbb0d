//! Shared extraction helpers for site adapters

use crate::config::parse_selector;
use crate::url::resolve_link;
use crate::{ConfigResult, ExtractionError, ExtractionResult};
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// A parsed selector that remembers its source text for error messages
#[derive(Debug, Clone)]
pub struct FieldSelector {
    text: String,
    selector: Selector,
}

impl FieldSelector {
    pub fn parse(text: &str) -> ConfigResult<Self> {
        Ok(Self {
            text: text.to_string(),
            selector: parse_selector(text)?,
        })
    }

    /// All matches in document order
    pub fn all<'a, 'b>(&'b self, doc: &'a Html) -> Select<'a, 'b> {
        doc.select(&self.selector)
    }

    /// First match in the document
    pub fn first<'a>(&self, doc: &'a Html, field: &'static str) -> ExtractionResult<ElementRef<'a>> {
        doc.select(&self.selector)
            .next()
            .ok_or_else(|| self.missing(field))
    }

    /// First match below `element`
    pub fn first_in<'a>(
        &self,
        element: ElementRef<'a>,
        field: &'static str,
    ) -> ExtractionResult<ElementRef<'a>> {
        element
            .select(&self.selector)
            .next()
            .ok_or_else(|| self.missing(field))
    }

    fn missing(&self, field: &'static str) -> ExtractionError {
        ExtractionError::Missing {
            field,
            selector: self.text.clone(),
        }
    }
}

/// Reads an attribute, failing when it is absent or blank
pub fn attribute(element: ElementRef<'_>, name: &str, field: &'static str) -> ExtractionResult<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::MissingAttribute {
            field,
            attribute: name.to_string(),
        })
}

/// Resolves an extracted link against the site's base URL
pub fn absolute_url(base: &Url, value: &str, field: &'static str) -> ExtractionResult<String> {
    resolve_link(base, value)
        .map(String::from)
        .ok_or_else(|| ExtractionError::InvalidUrl {
            field,
            value: value.to_string(),
        })
}

/// Default tag extraction: the text of every link below the tags container
///
/// A leading `#` is removed and empty names are dropped.
pub fn tag_names(container: ElementRef<'_>) -> BTreeSet<String> {
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|link| {
            let text = link.text().collect::<String>();
            let text = text.trim();
            let name = text.strip_prefix('#').unwrap_or(text).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
