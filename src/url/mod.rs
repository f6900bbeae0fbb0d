//! URL helpers for listing pages and extracted links
//!
//! Listing pages are addressed by a template with a `{}` page placeholder.
//! Links pulled out of documents are resolved against the site's base URL,
//! and thumbnails are named after the last path segment of their URL.

use url::Url;

/// Placeholder replaced by the page number in listing templates
pub const PAGE_PLACEHOLDER: &str = "{}";

/// Builds the URL of a listing page from its template
///
/// # Examples
///
/// ```
/// use librestock::url::page_url;
///
/// assert_eq!(page_url("https://site.test/?page={}", 3), "https://site.test/?page=3");
/// ```
pub fn page_url(template: &str, page: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - anything that does not resolve to http or https
///
/// Protocol-relative hrefs (`//cdn.example.com/a.jpg`) take the base's scheme.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Derives a thumbnail file stem from the URL it was downloaded from
///
/// The last path segment is used with any query string and extension
/// dropped. Returns None when the URL has no usable segment (e.g. a bare
/// domain).
pub fn thumbnail_stem(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let name = without_query.rsplit('/').next()?.trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    };

    if stem.is_empty() || stem == "." {
        None
    } else {
        Some(stem.to_string())
    }
}
