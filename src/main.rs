//! Listing Harvester main entry point
//!
//! This is the command-line interface for the Listing Harvester aggregator.

use anyhow::{bail, Context};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config, SiteDefinition};
use listing_harvester::output::{
    load_statistics, print_statistics, result_to_json, session_to_json, write_markdown_summary,
};
use listing_harvester::session::{
    build_orchestrator, resolve_sites, selected_sources, ScrapingSession,
};
use listing_harvester::storage::{open_storage, PersistenceGateway};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing Harvester: a business-for-sale listing aggregator
///
/// Listing Harvester fetches listing pages from marketplace websites,
/// extracts and normalizes each listing, and stores the results in a
/// single deduplicated SQLite database.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "0.1.0")]
#[command(about = "A business-for-sale listing aggregator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Run only the named source (repeatable)
    #[arg(short, long = "source", value_name = "NAME")]
    sources: Vec<String>,

    /// Print the session (or single-source result) as JSON
    #[arg(long)]
    json: bool,

    /// Skip writing listings and the session record to the database
    #[arg(long)]
    no_persist: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching
    #[arg(long, conflicts_with_all = ["stats", "list_sources"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_sources"])]
    stats: bool,

    /// List the known sources and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list_sources: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let sites = resolve_sites(&config).context("failed to load the site catalog")?;

    // Handle different modes
    if cli.list_sources {
        handle_list_sources(&config, &sites);
    } else if cli.dry_run {
        handle_dry_run(&config, &sites, &cli.sources);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.sources.len() == 1 {
        handle_single_source(&config, &sites, &cli.sources[0]).await?;
    } else {
        handle_session(&config, &sites, &cli, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --list-sources mode: prints the site catalog
fn handle_list_sources(config: &Config, sites: &[SiteDefinition]) {
    println!("=== Known Sources ({}) ===\n", sites.len());
    for site in sites {
        let enabled = config.enabled_sources.is_empty() || config.enabled_sources.contains(&site.name);
        println!(
            "  {} [{}]{}",
            site.name,
            site.source_label,
            if enabled { "" } else { " (disabled)" }
        );
        println!("    Start URL: {}", site.start_url);
        println!(
            "    Fetch: {}",
            if site.use_proxy { "rendering proxy" } else { "direct" }
        );
    }
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config, sites: &[SiteDefinition], requested: &[String]) {
    println!("=== Listing Harvester Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Max pages per source: {}", config.scraper.max_pages);
    println!("  Page delay: {}ms", config.scraper.page_delay_ms);
    println!("  Source delay: {}ms", config.scraper.source_delay_ms);
    println!("  Highlight limit: {}", config.scraper.highlight_limit);
    println!("  User agent: {}", config.scraper.user_agent);

    println!("\nRendering Proxy:");
    println!("  Endpoint: {}", config.proxy.endpoint);
    println!("  Render JS: {}", config.proxy.render_js);
    println!("  Timeout: {}s", config.proxy.timeout_secs);
    println!(
        "  Credential: {}",
        if config.proxy.api_key.is_some() {
            "inline".to_string()
        } else {
            format!("${}", config.proxy.api_key_env)
        }
    );

    println!("\nRate Limit:");
    println!("  Requests per minute: {}", config.rate_limit.requests_per_minute);
    println!("  Burst: {}", config.rate_limit.burst);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }
    println!("  Batch size: {}", config.output.batch_size);
    println!("  Conflict key: {}", config.output.conflict_key.columns());

    let selected = selected_sources(config, sites, requested);
    println!("\nSelected Sources ({}):", selected.len());
    for name in &selected {
        match sites.iter().find(|s| &s.name == name) {
            Some(site) => println!(
                "  - {} ({} container selectors, max {} pages)",
                site.name,
                site.container_selectors.len(),
                site.max_pages.unwrap_or(config.scraper.max_pages)
            ),
            None => println!("  - {} (unknown source)", name),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would scrape {} sources", selected.len());
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(
        Path::new(&config.output.database_path),
        config.output.conflict_key,
    )?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles a single `--source` run: prints one result
async fn handle_single_source(
    config: &Config,
    sites: &[SiteDefinition],
    name: &str,
) -> anyhow::Result<()> {
    if !sites.iter().any(|s| s.name == name) {
        bail!("unknown source: {}", name);
    }

    let orchestrator = build_orchestrator(config, sites, &[name.to_string()])?;
    let result = orchestrator.run_one(name).await?;

    println!("{}", result_to_json(&result)?);
    Ok(())
}

/// Handles the main scraping session
async fn handle_session(
    config: &Config,
    sites: &[SiteDefinition],
    cli: &Cli,
    config_hash: String,
) -> anyhow::Result<()> {
    let selected = selected_sources(config, sites, &cli.sources);
    tracing::info!("Scraping {} sources: {}", selected.len(), selected.join(", "));

    let orchestrator = build_orchestrator(config, sites, &selected)?.with_config_hash(config_hash);

    let session = if cli.no_persist {
        orchestrator.run_subset(&selected).await
    } else {
        let storage = open_storage(
            Path::new(&config.output.database_path),
            config.output.conflict_key,
        )?;
        let mut gateway = PersistenceGateway::new(storage, config.output.batch_size);
        orchestrator
            .run_and_persist(Some(selected.as_slice()), &mut gateway)
            .await
    };

    if let Some(summary_path) = &config.output.summary_path {
        write_markdown_summary(&session, Path::new(summary_path))?;
        tracing::info!("Summary written to: {}", summary_path);
    }

    if cli.json {
        println!("{}", session_to_json(&session)?);
    } else {
        print_session(&session);
    }

    Ok(())
}

fn print_session(session: &ScrapingSession) {
    println!("=== Session {} ===\n", session.id());
    println!(
        "Status: {} ({})",
        session.status().to_db_string(),
        session
            .outcome()
            .map(|o| o.to_db_string())
            .unwrap_or("running")
    );
    println!("Total listings: {}", session.total_listings());

    println!("\nSources:");
    for name in session.sources() {
        if let Some(result) = session.results().get(name) {
            println!(
                "  {}: {} listings from {} containers{}",
                name,
                result.total_scraped(),
                result.total_found(),
                if result.success() { "" } else { " (failed)" }
            );
        }
    }

    if let Some(report) = session.persisted() {
        println!(
            "\nPersisted: {} written, {} duplicates dropped, {} failed batches",
            report.written, report.duplicates_dropped, report.failed_batches
        );
    }

    if !session.errors().is_empty() {
        println!("\nErrors ({}):", session.errors().len());
        for error in session.errors() {
            println!("  - {}", error);
        }
    }
}
