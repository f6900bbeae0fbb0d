//! Maps site identifiers to constructed adapters

use super::{pexels, picjumbo, Pexels, Picjumbo, SelectorSite, SiteAdapter, BUILTIN_SITE_IDS};
use crate::config::{Config, SiteEntry};
use crate::url::PAGE_PLACEHOLDER;
use crate::{ConfigError, ConfigResult};

/// Built-in sites plus the selector-driven ones from the configuration
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    configured: Vec<SiteEntry>,
}

impl SiteRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            configured: config.sites.clone(),
        }
    }

    /// Every known site id, built-ins first
    pub fn ids(&self) -> Vec<String> {
        BUILTIN_SITE_IDS
            .iter()
            .map(|id| id.to_string())
            .chain(self.configured.iter().map(|entry| entry.id.clone()))
            .collect()
    }

    /// Constructs and validates the adapter for `id`
    pub fn build(&self, id: &str) -> ConfigResult<Box<dyn SiteAdapter>> {
        let adapter: Box<dyn SiteAdapter> = match id {
            pexels::ID => Box::new(Pexels::new()?),
            picjumbo::ID => Box::new(Picjumbo::new()?),
            _ => {
                let entry = self
                    .configured
                    .iter()
                    .find(|entry| entry.id == id)
                    .ok_or_else(|| ConfigError::UnknownSite(id.to_string()))?;
                Box::new(SelectorSite::from_entry(entry)?)
            }
        };

        validate_adapter(adapter.as_ref())?;
        Ok(adapter)
    }
}

/// Rejects adapters that cannot drive a crawl
///
/// A site must list images one way or the other, and container sites must be
/// able to name the page each container describes.
pub fn validate_adapter(adapter: &dyn SiteAdapter) -> ConfigResult<()> {
    let info = adapter.info();
    let caps = adapter.capabilities();

    if !caps.image_containers && !caps.image_page_links {
        return Err(ConfigError::Validation(format!(
            "site '{}' provides neither image containers nor image page links",
            info.id
        )));
    }

    if caps.image_containers && !caps.image_page_url {
        return Err(ConfigError::Validation(format!(
            "site '{}' provides image containers but no image page url",
            info.id
        )));
    }

    if !info.page_url_template.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "site '{}' page url template has no '{}' placeholder",
            info.id, PAGE_PLACEHOLDER
        )));
    }

    Ok(())
}
