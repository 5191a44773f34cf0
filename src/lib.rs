//! Sitewalk: a bounded, same-origin web crawler
//!
//! Given a seed URL, this crate visits every page reachable under that origin
//! exactly once, using a fixed pool of concurrent workers and a shared
//! counter to detect when the crawl has run out of work.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewalk operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Crawl already started; an engine runs a single crawl")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("workers must be greater than 0, got {0}")]
    InvalidWorkers(usize),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL has no scheme: {0}")]
    MissingScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

// Re-export commonly used types
pub use crate::url::{normalize_link, Scope};
pub use config::Config;
pub use crawler::{CrawlPhase, CrawlReport, Engine, LinkSource, VisitedPolicy};
pub use state::{FrontierStore, PageState};
