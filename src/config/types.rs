use serde::Deserialize;

/// Main configuration structure for Sitewalk
///
/// Every section is optional; missing sections and keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which claimed pages count as "visited" in the crawl result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitedPolicy {
    /// Every claimed URL, including pages whose fetch failed
    #[default]
    Claimed,
    /// Only pages that were fetched and parsed successfully
    Processed,
}

impl std::str::FromStr for VisitedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claimed" => Ok(Self::Claimed),
            "processed" => Ok(Self::Processed),
            other => Err(format!(
                "unknown visited policy '{}', expected 'claimed' or 'processed'",
                other
            )),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of parallel workers
    pub workers: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout")]
    pub fetch_timeout: u64,

    /// Number of retries after the first failed attempt
    #[serde(rename = "retry-max")]
    pub retry_max: u32,

    /// Upper bound for the exponential backoff between retries (seconds)
    #[serde(rename = "retry-wait-max")]
    pub retry_wait_max: u64,

    /// Which pages are reported as visited
    pub visited: VisitedPolicy,

    /// Accept TLS certificates that fail verification
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            fetch_timeout: 60,
            retry_max: 3,
            retry_wait_max: 60,
            visited: VisitedPolicy::Claimed,
            accept_invalid_certs: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value (`name/version`)
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file, if one should be written
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
