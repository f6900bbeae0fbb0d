use crate::config::types::{Config, CrawlerConfig, FingerprintConfig, SiteEntry, StorageConfig};
use crate::site::BUILTIN_SITE_IDS;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_fingerprint_config(&config.fingerprint)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Parses a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.thumbnail_dir.is_empty() {
        return Err(ConfigError::Validation(
            "thumbnail_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_fingerprint_config(config: &FingerprintConfig) -> Result<(), ConfigError> {
    // Four bands of whole bytes need a grid edge that is a multiple of 4
    if !(4..=32).contains(&config.hash_bits) || config.hash_bits % 4 != 0 {
        return Err(ConfigError::Validation(format!(
            "hash_bits must be a multiple of 4 between 4 and 32, got {}",
            config.hash_bits
        )));
    }

    if config.thumbnail_size < config.hash_bits {
        return Err(ConfigError::Validation(format!(
            "thumbnail_size must be >= hash_bits ({}), got {}",
            config.hash_bits, config.thumbnail_size
        )));
    }

    if config.duplicate_threshold < 1 {
        return Err(ConfigError::Validation(
            "duplicate_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for site in sites {
        if site.id.is_empty() {
            return Err(ConfigError::Validation("site id cannot be empty".to_string()));
        }

        if BUILTIN_SITE_IDS.contains(&site.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "site id '{}' is reserved by a built-in site",
                site.id
            )));
        }

        if !seen.insert(site.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site id '{}'",
                site.id
            )));
        }

        validate_site(site)?;
    }

    Ok(())
}

/// Validates one selector-driven site entry
pub(crate) fn validate_site(site: &SiteEntry) -> Result<(), ConfigError> {
    if site.short_name.is_empty() || site.long_name.is_empty() {
        return Err(ConfigError::Validation(format!(
            "site '{}' needs both short-name and long-name",
            site.id
        )));
    }

    Url::parse(&site.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url for '{}': {}", site.id, e))
    })?;

    validate_page_template(&site.id, &site.page_url)?;

    if let Some(first) = &site.first_page_url {
        Url::parse(first).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid first-page-url for '{}': {}", site.id, e))
        })?;
    }

    match (&site.container_selector, &site.page_link_selector) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::Validation(format!(
                "site '{}' must set only one of container-selector and page-link-selector",
                site.id
            )));
        }
        (None, None) => {
            return Err(ConfigError::Validation(format!(
                "site '{}' must set container-selector or page-link-selector",
                site.id
            )));
        }
        (Some(_), None) if site.page_url_selector.is_none() => {
            return Err(ConfigError::Validation(format!(
                "site '{}' uses containers and must set page-url-selector",
                site.id
            )));
        }
        _ => {}
    }

    let selectors = [
        site.container_selector.as_deref(),
        site.page_link_selector.as_deref(),
        site.page_url_selector.as_deref(),
        Some(site.source_url_selector.as_str()),
        Some(site.thumbnail_url_selector.as_str()),
        site.tags_selector.as_deref(),
    ];
    for selector in selectors.into_iter().flatten() {
        parse_selector(selector)?;
    }

    Ok(())
}

/// Validates a listing page template: it must parse once the page number is in
fn validate_page_template(site_id: &str, template: &str) -> Result<(), ConfigError> {
    if !template.contains("{}") {
        return Err(ConfigError::Validation(format!(
            "page-url for '{}' must contain a '{{}}' page placeholder",
            site_id
        )));
    }

    Url::parse(&template.replace("{}", "1")).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid page-url for '{}': {}", site_id, e))
    })?;

    Ok(())
}
