//! Crawl engine - worker pool, task dispatch and termination
//!
//! A crawl moves through four phases:
//!
//! ```text
//! Idle --crawl()--> Running --counter hits 0--> Draining --workers exit--> Stopped
//! ```
//!
//! The seed is claimed and handed to a fixed pool of workers over a shared
//! hand-off channel of capacity one. A worker fetches its page, resolves
//! every href, keeps the in-scope ones and claims them in the frontier. Each
//! newly claimed URL gets a work ticket and is submitted from its own spawned
//! task, so a worker never waits for another worker to become free before it
//! can finish the page it holds. When the last ticket is released the stop
//! token fires and every worker exits.

use crate::config::{validate_workers, Config, VisitedPolicy};
use crate::crawler::fetcher::{HttpSource, LinkSource};
use crate::crawler::termination::{WorkCounter, WorkTicket};
use crate::state::{FrontierStore, PageState};
use crate::url::{normalize_link, parse_seed, Scope};
use crate::CrawlError;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Lifecycle phase of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Not started
    Idle,
    /// Workers active, outstanding work >= 1
    Running,
    /// No more tasks will be produced; workers are being stopped
    Draining,
    /// All workers have exited
    Stopped,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The canonical seed URL
    pub seed: String,

    /// Visited URLs according to the engine's [`VisitedPolicy`], sorted
    pub visited: Vec<String>,

    /// Pages fetched and parsed successfully
    pub pages_processed: usize,

    /// Pages that failed (transport error or failure status)
    pub pages_failed: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// False if the crawl was cancelled before running out of work
    pub completed: bool,
}

/// A page awaiting fetch, together with the work it accounts for
struct Task {
    url: String,
    ticket: WorkTicket,
}

/// Bounded, same-origin crawl engine
///
/// An engine runs a single crawl. Build it, call [`Engine::crawl`], then read
/// the result from the returned report or [`Engine::visited_links`].
///
/// # Example
///
/// ```no_run
/// use sitewalk::Engine;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), sitewalk::CrawlError> {
/// let engine = Engine::new("https://example.com/", 8, Duration::from_secs(30))?;
/// let report = engine.crawl().await?;
/// println!("visited {} pages", report.visited.len());
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    seed: Url,
    scope: Scope,
    workers: usize,
    source: Arc<dyn LinkSource>,
    frontier: Arc<FrontierStore>,
    visited_policy: VisitedPolicy,
    phase: Mutex<CrawlPhase>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("seed", &self.seed.as_str())
            .field("workers", &self.workers)
            .field("visited_policy", &self.visited_policy)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine that fetches over HTTP with default settings
    ///
    /// # Errors
    ///
    /// * `CrawlError::Url` - The seed is not an absolute URL with scheme and host
    /// * `CrawlError::Config` - `workers` is zero or above the allowed maximum
    /// * `CrawlError::HttpClient` - The HTTP client could not be built
    pub fn new(seed: &str, workers: usize, fetch_timeout: Duration) -> Result<Self, CrawlError> {
        let (seed, workers) = validate_inputs(seed, workers)?;
        let source = HttpSource::with_timeout(fetch_timeout)?;
        Ok(Self::assemble(seed, workers, Arc::new(source)))
    }

    /// Creates an engine from a loaded configuration
    pub fn from_config(seed: &str, config: &Config) -> Result<Self, CrawlError> {
        let (seed, workers) = validate_inputs(seed, config.crawler.workers)?;
        let source = HttpSource::from_config(config)?;
        Ok(Self::assemble(seed, workers, Arc::new(source))
            .with_visited_policy(config.crawler.visited))
    }

    /// Creates an engine that fetches through the given link source
    pub fn with_source(
        seed: &str,
        workers: usize,
        source: Arc<dyn LinkSource>,
    ) -> Result<Self, CrawlError> {
        let (seed, workers) = validate_inputs(seed, workers)?;
        Ok(Self::assemble(seed, workers, source))
    }

    fn assemble(seed: Url, workers: usize, source: Arc<dyn LinkSource>) -> Self {
        Self {
            scope: Scope::new(&seed),
            seed,
            workers,
            source,
            frontier: Arc::new(FrontierStore::new()),
            visited_policy: VisitedPolicy::default(),
            phase: Mutex::new(CrawlPhase::Idle),
        }
    }

    /// Selects which claimed pages are reported as visited
    pub fn with_visited_policy(mut self, policy: VisitedPolicy) -> Self {
        self.visited_policy = policy;
        self
    }

    /// Uses the given frontier store instead of a fresh one
    pub fn with_frontier(mut self, frontier: Arc<FrontierStore>) -> Self {
        self.frontier = frontier;
        self
    }

    /// The canonical seed URL
    pub fn seed(&self) -> &str {
        self.seed.as_str()
    }

    /// The in-scope predicate derived from the seed
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Size of the worker pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The frontier store this engine claims URLs in
    pub fn frontier(&self) -> &Arc<FrontierStore> {
        &self.frontier
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Visited URLs, sorted, according to the engine's [`VisitedPolicy`]
    ///
    /// Only meaningful once [`Engine::crawl`] has returned.
    pub fn visited_links(&self) -> Vec<String> {
        match self.visited_policy {
            VisitedPolicy::Claimed => self.frontier.snapshot(),
            VisitedPolicy::Processed => self.frontier.snapshot_where(|state| state.is_success()),
        }
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures never surface here; they are logged and recorded in
    /// the frontier. The only error is calling this on an engine that has
    /// already crawled.
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        self.crawl_until(CancellationToken::new()).await
    }

    /// Runs the crawl until it completes or `cancel` fires
    ///
    /// Cancellation is observed while workers wait for a task and while a page
    /// is being fetched. Pages abandoned this way stay in the `Claimed` state.
    pub async fn crawl_until(&self, cancel: CancellationToken) -> Result<CrawlReport, CrawlError> {
        self.begin()?;

        tracing::info!(seed = %self.seed, scope = %self.scope().origin(), "Starting crawl...");
        tracing::info!("Spawning {} workers", self.workers());
        let start = Instant::now();

        let stop = cancel.child_token();
        let counter = WorkCounter::new(stop.clone());
        let (tasks, receiver) = mpsc::channel::<Task>(1);
        let receiver = Arc::new(AsyncMutex::new(receiver));

        let seed = self.seed.to_string();
        if !self.frontier.try_claim(&seed) {
            tracing::debug!(url = %seed, "seed already present in supplied frontier");
        }
        let seed_task = Task {
            url: seed,
            ticket: counter.issue(),
        };

        let context = Arc::new(WorkerContext {
            scope: self.scope.clone(),
            frontier: Arc::clone(&self.frontier),
            source: Arc::clone(&self.source),
            counter: Arc::clone(&counter),
            tasks,
            stop: stop.clone(),
        });

        let mut pool = JoinSet::new();
        for id in 0..self.workers {
            pool.spawn(run_worker(id, Arc::clone(&context), Arc::clone(&receiver)));
        }

        context.dispatch(seed_task);
        drop(context);

        stop.cancelled().await;
        self.set_phase(CrawlPhase::Draining);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "worker task failed");
            }
        }
        // Closing the channel releases the tickets of any hand-offs still pending
        drop(receiver);
        self.set_phase(CrawlPhase::Stopped);

        let completed = counter.is_drained();
        let elapsed = start.elapsed();
        let visited = self.visited_links();
        let pages_processed = self.frontier.count_by_state(PageState::Processed);
        let pages_failed = PageState::all_states()
            .into_iter()
            .filter(PageState::is_error)
            .map(|state| self.frontier.count_by_state(state))
            .sum::<usize>();

        if completed {
            tracing::info!("Crawling finished in {:?}", elapsed);
        } else {
            let unfinished = self
                .frontier
                .snapshot_where(|state| !state.is_terminal())
                .len();
            tracing::warn!(
                "Crawl cancelled after {:?}, {} claimed pages left unfetched",
                elapsed,
                unfinished
            );
        }
        tracing::info!("Found {} links", visited.len());

        Ok(CrawlReport {
            seed: self.seed.to_string(),
            visited,
            pages_processed,
            pages_failed,
            elapsed,
            completed,
        })
    }

    fn begin(&self) -> Result<(), CrawlError> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != CrawlPhase::Idle {
            return Err(CrawlError::AlreadyStarted);
        }
        *phase = CrawlPhase::Running;
        tracing::debug!("crawl phase: idle -> running");
        Ok(())
    }

    fn set_phase(&self, next: CrawlPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("crawl phase: {} -> {}", *phase, next);
        *phase = next;
    }
}

fn validate_inputs(seed: &str, workers: usize) -> Result<(Url, usize), CrawlError> {
    let seed = parse_seed(seed)?;
    validate_workers(workers)?;
    Ok((seed, workers))
}

/// State shared by all workers of one crawl
struct WorkerContext {
    scope: Scope,
    frontier: Arc<FrontierStore>,
    source: Arc<dyn LinkSource>,
    counter: Arc<WorkCounter>,
    tasks: mpsc::Sender<Task>,
    stop: CancellationToken,
}

impl WorkerContext {
    /// Fetches one page and enqueues its new in-scope links
    async fn process(&self, task: Task) {
        // Held until every discovered link has been considered
        let Task { url, ticket: _ticket } = task;

        tracing::debug!(url = %url, "Extracting content");

        let fetched = tokio::select! {
            biased;
            _ = self.stop.cancelled() => {
                tracing::trace!(url = %url, "crawl stopping, abandoning page");
                return;
            }
            fetched = self.source.fetch(&url) => fetched,
        };

        match fetched {
            Ok(page) if page.is_success() => {
                self.frontier.mark(&url, PageState::Processed);
                for href in &page.hrefs {
                    self.consider(&url, href);
                }
            }
            Ok(page) => {
                tracing::warn!(url = %url, status = page.status_code, "request failed");
                self.frontier
                    .mark(&url, PageState::from_status(page.status_code));
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to get response");
                self.frontier.mark(&url, e.page_state());
            }
        }
    }

    /// Normalizes, scope-checks and claims one href found on `page_url`
    fn consider(&self, page_url: &str, href: &str) {
        let Some(link) = normalize_link(page_url, href) else {
            tracing::trace!(href, "discarding unparseable link");
            return;
        };

        if !self.scope.contains(&link) {
            tracing::trace!(link = %link, "skipping out-of-scope link");
            return;
        }

        if !self.frontier.try_claim(&link) {
            return;
        }

        let ticket = self.counter.issue();
        self.dispatch(Task { url: link, ticket });
    }

    /// Hands a task to the pool without waiting for a worker to pick it up
    fn dispatch(&self, task: Task) {
        let tasks = self.tasks.clone();
        tokio::spawn(async move {
            if let Err(unsent) = tasks.send(task).await {
                tracing::debug!(url = %unsent.0.url, "task channel closed before hand-off");
            }
        });
    }
}

async fn run_worker(
    id: usize,
    context: Arc<WorkerContext>,
    tasks: Arc<AsyncMutex<mpsc::Receiver<Task>>>,
) {
    tracing::trace!(worker = id, "worker started");

    loop {
        let next = tokio::select! {
            biased;
            _ = context.stop.cancelled() => break,
            task = async { tasks.lock().await.recv().await } => task,
        };

        match next {
            Some(task) => context.process(task).await,
            None => {
                tracing::debug!(worker = id, "tasks channel closed");
                break;
            }
        }
    }

    tracing::trace!(worker = id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::{FetchError, FetchedPage};
    use crate::ConfigError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory site: URL -> (status, hrefs). Unknown URLs return 404.
    #[derive(Default)]
    struct StaticSource {
        pages: HashMap<String, (u16, Vec<String>)>,
    }

    impl StaticSource {
        fn page(mut self, url: &str, hrefs: &[&str]) -> Self {
            self.pages.insert(
                url.to_string(),
                (200, hrefs.iter().map(|h| h.to_string()).collect()),
            );
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), (status, Vec::new()));
            self
        }
    }

    #[async_trait]
    impl LinkSource for StaticSource {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            tokio::task::yield_now().await;
            let (status_code, hrefs) = self
                .pages
                .get(url)
                .cloned()
                .unwrap_or((404, Vec::new()));
            Ok(FetchedPage { status_code, hrefs })
        }
    }

    struct UnreachableSource;

    #[async_trait]
    impl LinkSource for UnreachableSource {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            Err(FetchError::Connect("connection refused".to_string()))
        }
    }

    struct StalledSource;

    #[async_trait]
    impl LinkSource for StalledSource {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(FetchedPage {
                status_code: 200,
                hrefs: Vec::new(),
            })
        }
    }

    fn engine(source: StaticSource, workers: usize) -> Engine {
        Engine::with_source("http://x.test/", workers, Arc::new(source)).unwrap()
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Engine::with_source("http://x.test/", 0, Arc::new(StaticSource::default()));
        assert!(matches!(
            result,
            Err(CrawlError::Config(ConfigError::InvalidWorkers(0)))
        ));
    }

    #[test]
    fn test_invalid_seed_rejected() {
        for seed in ["", "x.test", "/relative", "mailto:someone@x.test"] {
            let result = Engine::with_source(seed, 4, Arc::new(StaticSource::default()));
            assert!(
                matches!(result, Err(CrawlError::Url(_))),
                "seed {:?} should be rejected",
                seed
            );
        }
    }

    #[test]
    fn test_seed_is_canonicalized() {
        let engine = Engine::with_source("http://x.test", 1, Arc::new(StaticSource::default()))
            .unwrap();
        assert_eq!(engine.seed(), "http://x.test/");
        assert_eq!(engine.scope().origin(), "http://x.test/");
        assert_eq!(engine.phase(), CrawlPhase::Idle);
    }

    #[tokio::test]
    async fn test_crawl_follows_in_scope_links_once() {
        let source = StaticSource::default()
            .page("http://x.test/", &["/a"])
            .page(
                "http://x.test/a",
                &["/b", "http://x.test/a", "http://other.test/"],
            )
            .page("http://x.test/b", &[]);

        let engine = engine(source, 4);
        let report = engine.crawl().await.unwrap();

        let expected = vec!["http://x.test/", "http://x.test/a", "http://x.test/b"];
        assert_eq!(report.visited, expected);
        assert_eq!(engine.visited_links(), expected);
        assert_eq!(report.pages_processed, 3);
        assert_eq!(report.pages_failed, 0);
        assert!(report.completed);
        assert_eq!(engine.phase(), CrawlPhase::Stopped);
    }

    #[tokio::test]
    async fn test_seed_failure_still_claims_seed() {
        let source = StaticSource::default().status("http://x.test/", 404);

        let engine = engine(source, 2);
        let report = engine.crawl().await.unwrap();

        assert_eq!(report.visited, vec!["http://x.test/"]);
        assert_eq!(report.pages_failed, 1);
        assert!(report.completed);
        assert_eq!(
            engine.frontier().state_of("http://x.test/"),
            Some(PageState::DeadLink)
        );
    }

    #[tokio::test]
    async fn test_processed_policy_excludes_failures() {
        let source = StaticSource::default()
            .page("http://x.test/", &["/ok", "/gone", "/broken"])
            .page("http://x.test/ok", &[])
            .status("http://x.test/broken", 500);

        let engine = engine(source, 3).with_visited_policy(VisitedPolicy::Processed);
        let report = engine.crawl().await.unwrap();

        assert_eq!(report.visited, vec!["http://x.test/", "http://x.test/ok"]);
        assert_eq!(report.pages_processed, 2);
        assert_eq!(report.pages_failed, 2);
        assert_eq!(
            engine.frontier().state_of("http://x.test/broken"),
            Some(PageState::Failed)
        );
    }

    #[tokio::test]
    async fn test_transport_error_abandons_page() {
        let engine = Engine::with_source("http://x.test/", 2, Arc::new(UnreachableSource)).unwrap();
        let report = engine.crawl().await.unwrap();

        assert_eq!(report.visited, vec!["http://x.test/"]);
        assert!(report.completed);
        assert_eq!(
            engine.frontier().state_of("http://x.test/"),
            Some(PageState::Unreachable)
        );
    }

    #[tokio::test]
    async fn test_self_link_and_cycle_terminate() {
        let source = StaticSource::default()
            .page("http://x.test/", &["/", "/a", "#top"])
            .page("http://x.test/a", &["/b", "/a"])
            .page("http://x.test/b", &["/a", "http://x.test/"]);

        let report = engine(source, 2).crawl().await.unwrap();

        assert_eq!(
            report.visited,
            vec![
                "http://x.test/",
                "http://x.test/#top",
                "http://x.test/a",
                "http://x.test/b"
            ]
        );
        assert!(report.completed);
    }

    #[tokio::test]
    async fn test_unparseable_and_foreign_links_are_discarded() {
        let source = StaticSource::default().page(
            "http://x.test/",
            &[
                "http://[::1",
                "mailto:someone@x.test",
                "javascript:void(0)",
                "https://x.test/other-scheme",
                "//other.test/page",
            ],
        );

        let report = engine(source, 1).crawl().await.unwrap();
        assert_eq!(report.visited, vec!["http://x.test/"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_visited_set_independent_of_worker_count() {
        fn site() -> StaticSource {
            let size = 150;
            let mut source = StaticSource::default();
            for i in 0..size {
                let url = if i == 0 {
                    "http://x.test/".to_string()
                } else {
                    format!("http://x.test/p/{}", i)
                };
                let hrefs = vec![
                    format!("/p/{}", (i * 7 + 1) % size),
                    format!("/p/{}", (i + 1) % size),
                    format!("../p/{}", (i * 3) % size),
                    "http://other.test/".to_string(),
                ];
                source.pages.insert(url, (200, hrefs));
            }
            source
        }

        let mut results = Vec::new();
        for workers in [1, 5, 50] {
            let report = engine(site(), workers).crawl().await.unwrap();
            assert!(report.completed);
            results.push(report.visited);
        }

        assert!(results[0].len() > 100);
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }

    #[tokio::test]
    async fn test_engine_runs_single_crawl() {
        let engine = engine(StaticSource::default().page("http://x.test/", &[]), 1);
        engine.crawl().await.unwrap();
        assert!(matches!(
            engine.crawl().await,
            Err(CrawlError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_engines_do_not_share_frontier() {
        let first = engine(StaticSource::default().page("http://x.test/", &["/a"]), 2);
        let second = engine(StaticSource::default().page("http://x.test/", &["/b"]), 2);

        let (a, b) = tokio::join!(first.crawl(), second.crawl());

        assert_eq!(a.unwrap().visited, vec!["http://x.test/", "http://x.test/a"]);
        assert_eq!(b.unwrap().visited, vec!["http://x.test/", "http://x.test/b"]);
    }

    #[tokio::test]
    async fn test_supplied_frontier_receives_claims() {
        let frontier = Arc::new(FrontierStore::new());
        let engine = engine(StaticSource::default().page("http://x.test/", &["/a"]), 2)
            .with_frontier(Arc::clone(&frontier));

        engine.crawl().await.unwrap();

        assert_eq!(frontier.snapshot(), vec!["http://x.test/", "http://x.test/a"]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_stalled_crawl() {
        let engine = Engine::with_source("http://x.test/", 3, Arc::new(StalledSource)).unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(Duration::from_secs(5), engine.crawl_until(cancel))
            .await
            .expect("crawl should stop after cancellation")
            .unwrap();

        assert!(!report.completed);
        assert_eq!(report.visited, vec!["http://x.test/"]);
        assert_eq!(
            engine.frontier().state_of("http://x.test/"),
            Some(PageState::Claimed)
        );
        assert_eq!(engine.phase(), CrawlPhase::Stopped);
    }
}
