//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk crawler.

use anyhow::Context;
use clap::Parser;
use sitewalk::config::{load_config_with_hash, validate, Config, VisitedPolicy};
use sitewalk::crawler::crawl;
use sitewalk::output::{generate_markdown_summary, print_summary};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a bounded, same-origin web crawler
///
/// Visits every page reachable from URL that lives under the same origin,
/// exactly once, and prints the visited links.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A bounded, same-origin web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of parallel workers (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Which pages count as visited: claimed or processed
    #[arg(long, value_name = "POLICY")]
    visited: Option<VisitedPolicy>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Only print counts, not every visited link
    #[arg(long)]
    no_links: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            on_interrupt.cancel();
        }
    });

    let report = match crawl(&cli.url, &config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_summary(&report, !cli.no_links);
    }

    if let Some(path) = summary_path(&cli, &config) {
        generate_markdown_summary(&report, &path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.fetch_timeout = timeout;
    }
    if let Some(visited) = cli.visited {
        config.crawler.visited = visited;
    }

    validate(&config)?;
    Ok(config)
}

fn summary_path(cli: &Cli, config: &Config) -> Option<PathBuf> {
    cli.summary
        .clone()
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from))
}
