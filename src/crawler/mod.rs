//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and anchor extraction
//! - Termination detection for the worker pool
//! - Overall crawl coordination

mod engine;
mod fetcher;
mod parser;
mod termination;

pub use crate::config::VisitedPolicy;
pub use engine::{CrawlPhase, CrawlReport, Engine};
pub use fetcher::{
    build_http_client, is_success_status, FetchError, FetchedPage, HttpSource, LinkSource,
    RetryPolicy, RETRY_WAIT_MIN,
};
pub use parser::{extract_hrefs, parse_html, ParsedPage};
pub use termination::{WorkCounter, WorkTicket};

use crate::config::Config;
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL and worker count
/// 2. Build the HTTP client
/// 3. Crawl every in-scope page reachable from the seed
///
/// # Arguments
///
/// * `seed` - The URL to start crawling from
/// * `config` - The crawler configuration
/// * `cancel` - Token that stops the crawl early when cancelled
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::Config;
/// use sitewalk::crawler::crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), sitewalk::CrawlError> {
/// let report = crawl("https://example.com/", &Config::default(), CancellationToken::new()).await?;
/// println!("{} pages", report.visited.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed: &str,
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    let engine = Engine::from_config(seed, config)?;
    engine.crawl_until(cancel).await
}
