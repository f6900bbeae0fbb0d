//! Librestock main entry point
//!
//! This is the command-line interface for the Librestock photo crawler.

use anyhow::{bail, Context};
use clap::Parser;
use librestock::config::{load_config_with_hash, Config};
use librestock::crawler::crawl;
use librestock::output::{load_statistics, print_report, print_statistics};
use librestock::storage::SqliteStorage;
use librestock::SiteRegistry;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Librestock: a stock-photo crawler with near-duplicate detection
///
/// Librestock walks the listing pages of one photo site, fingerprints every
/// image it finds and merges visually identical images from different
/// sites into a single corpus record.
#[derive(Parser, Debug)]
#[command(name = "librestock")]
#[command(version)]
#[command(about = "A stock-photo crawler with near-duplicate detection", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Site to crawl (see --list-sites)
    #[arg(short, long, value_name = "ID")]
    site: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Override the configured start page
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    start_page: Option<u32>,

    /// Stop at the first image already in the corpus
    #[arg(long)]
    stop_at_known: bool,

    /// List the available sites and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    list_sites: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["list_sites", "dry_run"])]
    stats: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["list_sites", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.debug, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(start_page) = cli.start_page {
        config.crawler.start_page = start_page;
    }
    if cli.stop_at_known {
        config.crawler.full_crawl = false;
    }

    if cli.list_sites {
        handle_list_sites(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.dry_run {
        handle_dry_run(&config, cli.site.as_deref())
    } else {
        match cli.site.as_deref() {
            Some(site) => handle_crawl(&config, site).await,
            None => bail!("No site given; pass --site ID (see --list-sites)"),
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, debug: bool, quiet: bool) {
    let level = if debug { verbose.max(1) } else { verbose };

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match level {
            0 => EnvFilter::new("librestock=info,warn"),
            1 => EnvFilter::new("librestock=debug,info"),
            2 => EnvFilter::new("librestock=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --list-sites: prints every site the registry can build
fn handle_list_sites(config: &Config) -> anyhow::Result<()> {
    let registry = SiteRegistry::new(config);

    println!("Available sites:");
    for id in registry.ids() {
        let site = registry.build(&id)?;
        let info = site.info();
        println!("  {:<12} {} ({})", id, info.long_name, info.short_name);
    }

    Ok(())
}

/// Handles --stats: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, site_id: Option<&str>) -> anyhow::Result<()> {
    println!("=== Librestock Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start page: {}", config.crawler.start_page);
    println!("  Full crawl: {}", config.crawler.full_crawl);
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nFingerprint:");
    println!(
        "  Thumbnail: {}x{}",
        config.fingerprint.thumbnail_size, config.fingerprint.thumbnail_size
    );
    println!(
        "  Hash: {} bits, duplicate below distance {}",
        config.fingerprint.hash_bits * config.fingerprint.hash_bits,
        config.fingerprint.duplicate_threshold
    );

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Thumbnails: {}", config.storage.thumbnail_dir);

    let registry = SiteRegistry::new(config);
    let ids = match site_id {
        Some(id) => vec![id.to_string()],
        None => registry.ids(),
    };

    println!("\nSites ({}):", ids.len());
    for id in &ids {
        let site = registry.build(id)?;
        let info = site.info();
        let caps = site.capabilities();
        let mode = if caps.image_containers {
            "image containers"
        } else {
            "image page links"
        };
        println!("  - {} ({}, {})", id, info.long_name, mode);
        println!("    * first page: {}", info.listing_url(config.crawler.start_page));
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, site_id: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    // Ctrl-C only flags the crawl; the controller stops at its next checkpoint
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current image");
            signal_token.cancel();
        }
    });

    match crawl(config, site_id, cancel).await {
        Ok(report) => {
            print_report(site_id, &report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
