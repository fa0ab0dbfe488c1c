//! Sumi-Sweep main entry point
//!
//! This is the command-line interface for the Sumi-Sweep site sweeper.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_sweep::config::{load_config_with_hash, Config};
use sumi_sweep::crawler::{CrawlEngine, HttpFetcher};
use sumi_sweep::output::{print_statistics, write_markdown_summary, CrawlReport, ReportStatistics};
use sumi_sweep::storage::{Storage, SqliteStorage};
use tracing_subscriber::EnvFilter;

/// Sumi-Sweep: a bounded breadth-first site sweeper
///
/// Sumi-Sweep crawls one website from a seed URL within allow/deny
/// filters and request/time budgets, extracts prose and the link graph,
/// and writes a report of everything it found.
#[derive(Parser, Debug)]
#[command(name = "sumi-sweep")]
#[command(version)]
#[command(about = "A bounded breadth-first site sweeper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL the crawl starts from
    #[arg(value_name = "URL")]
    url: String,

    /// Additional start URL, absolute or relative to the seed's site (repeatable)
    #[arg(long = "extra-url", value_name = "URL")]
    extra_urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.url, &cli.extra_urls);
        return Ok(());
    }

    let report = handle_crawl(&config, &cli.url, &cli.extra_urls).await?;
    write_outputs(&config, &report, &cli.url, &config_hash)?;

    if !cli.quiet {
        print_statistics(&ReportStatistics::from_report(&report));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sweep=info,warn"),
            1 => EnvFilter::new("sumi_sweep=debug,info"),
            2 => EnvFilter::new("sumi_sweep=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, seed: &str, extra: &[String]) {
    let crawler = &config.crawler;

    println!("=== Sumi-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Follow external links: {}", crawler.follow_external_links);
    println!("  Sleep between requests: {}ms", crawler.sleep_between_requests_ms);
    println!("  Max requests: {}", crawler.max_requests);
    println!("  Max crawl time: {}s", crawler.max_crawl_seconds);
    println!("  Concurrent requests: {}", crawler.max_concurrent_requests);
    println!("  Fetch robots.txt: {}", crawler.fetch_robots_txt);
    println!("  Probe alternate scheme: {}", crawler.probe_alternate_scheme);
    match crawler.domain_depth {
        Some(depth) => println!("  Domain depth: {}", depth),
        None => println!("  Domain depth: seed host"),
    }

    println!("\nAllowed URL Patterns ({}):", crawler.allowed_url_patterns.len());
    for pattern in &crawler.allowed_url_patterns {
        println!("  - {}", pattern);
    }

    println!("\nForbidden URL Patterns ({}):", crawler.forbidden_url_patterns.len());
    for pattern in &crawler.forbidden_url_patterns {
        println!("  - {}", pattern);
    }

    println!("\nUser Agent: {}", config.user_agent.user_agent());

    println!("\nOutput:");
    print_destination("JSON report", &config.output.json_path);
    print_destination("Database", &config.output.database_path);
    print_destination("Summary", &config.output.summary_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling at {} with {} extra start URLs",
        seed,
        extra.len()
    );
}

fn print_destination(label: &str, path: &Option<String>) {
    if let Some(path) = path {
        println!("  {}: {}", label, path);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: &str, extra: &[String]) -> Result<CrawlReport> {
    let fetcher =
        HttpFetcher::new(&config.user_agent).context("Failed to build the HTTP client")?;
    let mut engine =
        CrawlEngine::new(config.crawler.clone(), fetcher).context("Invalid crawl configuration")?;

    tracing::info!("Starting crawl at {} ({} extra start URLs)", seed, extra.len());
    let report = engine.crawl_with_urls(seed, extra).await;

    if !report.errors.is_empty() {
        tracing::warn!("{} URLs failed during the crawl", report.errors.len());
    }

    Ok(report)
}

/// Writes the report to every configured destination
fn write_outputs(config: &Config, report: &CrawlReport, seed: &str, config_hash: &str) -> Result<()> {
    if let Some(path) = &config.output.json_path {
        report
            .write_json(Path::new(path))
            .with_context(|| format!("Failed to write JSON report to {}", path))?;
    }

    if let Some(path) = &config.output.database_path {
        let mut storage = SqliteStorage::new(Path::new(path))
            .with_context(|| format!("Failed to open database {}", path))?;
        let run_id = storage
            .save_report(report, seed, config_hash)
            .context("Failed to store the crawl report")?;
        tracing::info!("Stored crawl as run {} in {}", run_id, path);
    }

    if let Some(path) = &config.output.summary_path {
        write_markdown_summary(report, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
    }

    Ok(())
}
