//! Crawler coordinator - the traversal engine
//!
//! This module decides what to fetch next and bounds the traversal:
//! - Claiming successor URLs in the shared visited set (at most one fetch each)
//! - Threading the depth budget through pagination and content links
//! - Running branches on a bounded pool with per-host politeness
//! - Merging records from concurrent branches
//! - Joining every branch before the run completes, or stopping early on
//!   cancellation or deadline
//!
//! A branch is one URL: fetch it, extract its records, expand its successors.
//! The seed branch's fetch failure fails the run; every other branch failure
//! is logged and contained.

use crate::config::Config;
use crate::crawler::extractor::{Extractor, ParsedPage, Record};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::scheduler::{arm_deadline, HostLimiter};
use crate::output::{CrawlStatistics, RunCounters};
use crate::state::{BranchId, BranchState, BranchTree, Claim, ResultCollection, VisitedSet};
use crate::url::{parse_seed_url, same_host, visit_key};
use crate::HarvestError;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every record collected; order carries no meaning
    pub records: Vec<Record>,

    pub stats: CrawlStatistics,
}

/// One unit of traversal work
#[derive(Debug)]
struct BranchTask {
    id: BranchId,
    url: Url,
    depth: u32,
}

/// A claimed successor, not yet registered in the branch tree
#[derive(Debug)]
struct Successor {
    url: Url,
    depth: u32,
}

/// What a finished branch task hands back to the coordinator loop
#[derive(Debug)]
struct BranchReport {
    id: BranchId,
    url: Url,
    outcome: Result<Vec<Successor>, HarvestError>,
}

/// Everything a branch task needs, shared across the run
struct BranchContext<F: ?Sized> {
    fetcher: Arc<F>,
    extractor: Arc<Extractor>,
    limiter: Arc<HostLimiter>,
    visited: Arc<VisitedSet>,
    results: Arc<ResultCollection>,
    counters: Arc<RunCounters>,
    cancel: CancellationToken,
    seed_url: Arc<Url>,
    pagination_consumes_depth: bool,
    follow_external: bool,
}

// Derived Clone would require F: Clone
impl<F: ?Sized> Clone for BranchContext<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            limiter: Arc::clone(&self.limiter),
            visited: Arc::clone(&self.visited),
            results: Arc::clone(&self.results),
            counters: Arc::clone(&self.counters),
            cancel: self.cancel.clone(),
            seed_url: Arc::clone(&self.seed_url),
            pagination_consumes_depth: self.pagination_consumes_depth,
            follow_external: self.follow_external,
        }
    }
}

impl<F: PageFetcher + ?Sized> BranchContext<F> {
    /// Runs one branch from `Pending` to `Expanding` (or `Failed`)
    async fn run_branch(self, task: BranchTask) -> BranchReport {
        let mut state = BranchState::Pending;
        let outcome = self.process_branch(&task, &mut state).await;

        match &outcome {
            Err(HarvestError::Cancelled { .. }) => self.counters.page_cancelled(),
            Err(e) if e.is_fetch_failure() => self.counters.page_failed(),
            _ => {}
        }

        BranchReport {
            id: task.id,
            url: task.url,
            outcome,
        }
    }

    async fn process_branch(
        &self,
        task: &BranchTask,
        state: &mut BranchState,
    ) -> Result<Vec<Successor>, HarvestError> {
        *state = state.transition(BranchState::Fetching)?;
        let body = self.fetch(&task.url).await?;
        self.counters.page_fetched();

        *state = state.transition(BranchState::Extracting)?;
        let ParsedPage {
            records,
            pagination,
            links,
        } = self.extractor.parse_page(&body, &task.url);
        tracing::debug!(
            "{}: {} records, {} pagination links, {} content links",
            task.url,
            records.len(),
            pagination.len(),
            links.len()
        );
        self.results.extend(records);

        *state = state.transition(BranchState::Expanding)?;
        Ok(self.expand(task, pagination, links))
    }

    /// Fetches under the host limiter, aborting if the run is cancelled
    async fn fetch(&self, url: &Url) -> Result<String, HarvestError> {
        let cancelled = || HarvestError::Cancelled {
            url: url.to_string(),
        };

        let permit = self.limiter.acquire(url).await.ok_or_else(cancelled)?;
        tracing::trace!("Fetching {} (host {})", url, permit.host());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(cancelled()),
            body = self.fetcher.fetch(url) => body,
        }
    }

    /// Claims the successors this branch may spawn
    ///
    /// Nothing is expanded once the depth budget is spent. Pagination
    /// children keep the parent's budget unless pagination is configured to
    /// consume depth; content children always get one less.
    fn expand(&self, task: &BranchTask, pagination: Vec<Url>, links: Vec<Url>) -> Vec<Successor> {
        if task.depth == 0 {
            if !pagination.is_empty() || !links.is_empty() {
                self.counters.depth_cut();
            }
            return Vec::new();
        }

        let pagination_depth = if self.pagination_consumes_depth {
            task.depth - 1
        } else {
            task.depth
        };

        let mut successors = Vec::new();

        for url in pagination {
            self.claim(url, pagination_depth, &mut successors);
        }

        for url in links {
            if !self.follow_external && !same_host(&url, &self.seed_url) {
                tracing::trace!("Not following off-site link {}", url);
                continue;
            }
            self.claim(url, task.depth - 1, &mut successors);
        }

        successors
    }

    fn claim(&self, mut url: Url, depth: u32, successors: &mut Vec<Successor>) {
        match self.visited.claim(&visit_key(&url)) {
            Claim::New => {
                url.set_fragment(None);
                successors.push(Successor { url, depth });
            }
            Claim::Seen => self.counters.duplicate_skipped(),
            Claim::BudgetExhausted => {
                tracing::debug!("Page budget spent, dropping {}", url);
                self.counters.budget_skipped();
            }
        }
    }
}

/// Main traversal engine
///
/// A coordinator can run several crawls one after another; every run gets a
/// fresh visited set, result collection and host limiter. Cancelling the
/// coordinator's token stops the current run and every later one.
pub struct Coordinator<F: ?Sized = HttpFetcher> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    extractor: Arc<Extractor>,
    cancel: CancellationToken,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Client built and selectors compiled
    /// * `Err(HarvestError)` - The HTTP client or a selector failed to build
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::new(config, fetcher)
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator around the given fetcher
    pub fn new(config: Config, fetcher: F) -> Result<Self, HarvestError> {
        Self::with_shared_fetcher(config, Arc::new(fetcher))
    }
}

impl<F: PageFetcher + ?Sized + 'static> Coordinator<F> {
    /// Creates a coordinator around a fetcher the caller keeps a handle to
    pub fn with_shared_fetcher(config: Config, fetcher: Arc<F>) -> Result<Self, HarvestError> {
        let extractor = Extractor::new(&config.extract)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor: Arc::new(extractor),
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the crawl when cancelled
    ///
    /// Once cancelled, no new branches are spawned, waiting and in-flight
    /// fetches are abandoned, and `run` returns what was collected so far.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs a crawl from `seed`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The seed was fetched; records from every branch
    ///   that succeeded
    /// * `Err(HarvestError::Argument)` - The seed is not an HTTP(S) URL
    /// * `Err(HarvestError)` - The seed fetch failed (transport, status, read
    ///   or cancellation)
    pub async fn run(&self, seed: &str) -> Result<CrawlOutcome, HarvestError> {
        let seed_url = parse_seed_url(seed).map_err(HarvestError::Argument)?;
        let crawler = &self.config.crawler;
        let started_at = Utc::now();

        let run_cancel = self.cancel.child_token();
        // Ends the deadline timer once this run returns
        let _run_guard = run_cancel.clone().drop_guard();
        arm_deadline(&run_cancel, crawler.crawl_timeout_secs);

        let ctx = BranchContext {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            limiter: Arc::new(HostLimiter::new(&self.config.rate_limit, run_cancel.clone())),
            visited: Arc::new(VisitedSet::new(crawler.max_pages as usize)),
            results: Arc::new(ResultCollection::new()),
            counters: Arc::new(RunCounters::new()),
            cancel: run_cancel.clone(),
            seed_url: Arc::new(seed_url.clone()),
            pagination_consumes_depth: crawler.pagination_consumes_depth,
            follow_external: crawler.follow_external,
        };

        tracing::info!(
            "Crawling {} (max depth {}, max pages {})",
            seed_url,
            crawler.max_depth,
            crawler.max_pages
        );

        let mut tree = BranchTree::new();
        let mut pending = VecDeque::new();

        ctx.visited.claim(&visit_key(&seed_url));
        let root = tree.add_root(seed_url.as_str(), crawler.max_depth);
        tree.set_state(root, BranchState::Fetching)?;

        let seed_report = ctx
            .clone()
            .run_branch(BranchTask {
                id: root,
                url: seed_url,
                depth: crawler.max_depth,
            })
            .await;
        if let Err(e) = &seed_report.outcome {
            tracing::error!("Seed {} failed: {}", seed_report.url, e);
        }
        let seed_successors = seed_report.outcome?;
        apply_success(&mut tree, root, seed_successors, &mut pending)?;
        let completed = tree.finish_work(root)?;
        log_completed(&tree, completed);

        let mut join_set = JoinSet::new();
        let max_in_flight = crawler.max_concurrent_branches.max(1) as usize;
        let mut stopping = run_cancel.is_cancelled();

        loop {
            if !stopping {
                while join_set.len() < max_in_flight {
                    let Some(task) = pending.pop_front() else {
                        break;
                    };
                    tree.set_state(task.id, BranchState::Fetching)?;
                    join_set.spawn(ctx.clone().run_branch(task));
                }
            }

            if join_set.is_empty() {
                break;
            }

            tokio::select! {
                _ = run_cancel.cancelled(), if !stopping => {
                    stopping = true;
                    tracing::warn!(
                        "Crawl cancelled; abandoning {} queued branches, draining {} in flight",
                        pending.len(),
                        join_set.len()
                    );
                }
                joined = join_set.join_next() => match joined {
                    Some(Ok(report)) => handle_report(&mut tree, report, &mut pending)?,
                    Some(Err(e)) => tracing::error!("Branch task aborted: {}", e),
                    None => break,
                },
            }
        }

        if tree.is_complete(root) {
            tracing::debug!("All {} branches joined", tree.len());
        } else {
            tracing::warn!(
                "{} of {} branches never ran",
                tree.count_in_state(BranchState::Pending),
                tree.len()
            );
        }
        tracing::debug!("{} URLs claimed", ctx.visited.len());

        let records = ctx.results.take();
        let stats = ctx
            .counters
            .snapshot(records.len(), started_at, Utc::now(), stopping);

        tracing::info!(
            "Crawl finished: {} records from {} pages ({} failed) in {:.1}s",
            records.len(),
            stats.pages_fetched,
            stats.pages_failed,
            stats.duration_seconds()
        );

        Ok(CrawlOutcome { records, stats })
    }
}

/// Applies a non-seed branch's report to the tree
///
/// A failed branch is logged and contributes nothing further; its siblings
/// and ancestors are unaffected.
fn handle_report(
    tree: &mut BranchTree,
    report: BranchReport,
    pending: &mut VecDeque<BranchTask>,
) -> Result<(), HarvestError> {
    match report.outcome {
        Ok(successors) => apply_success(tree, report.id, successors, pending)?,
        Err(e) => {
            match &e {
                HarvestError::Cancelled { .. } => {
                    tracing::debug!("Branch {} abandoned: {}", report.url, e)
                }
                _ => tracing::warn!("Branch {} failed: {}", report.url, e),
            }
            if !e.is_fetch_failure() && !matches!(e, HarvestError::Cancelled { .. }) {
                tree.set_state(report.id, BranchState::Extracting)?;
            }
            tree.set_state(report.id, BranchState::Failed)?;
        }
    }

    let completed = tree.finish_work(report.id)?;
    log_completed(tree, completed);
    Ok(())
}

/// Records a successful branch and queues its claimed successors
fn apply_success(
    tree: &mut BranchTree,
    id: BranchId,
    successors: Vec<Successor>,
    pending: &mut VecDeque<BranchTask>,
) -> Result<(), HarvestError> {
    tree.set_state(id, BranchState::Extracting)?;
    tree.set_state(id, BranchState::Expanding)?;

    for successor in successors {
        let child = tree.add_child(id, successor.url.as_str(), successor.depth);
        pending.push_back(BranchTask {
            id: child,
            url: successor.url,
            depth: successor.depth,
        });
    }

    Ok(())
}

fn log_completed(tree: &BranchTree, completed: Vec<BranchId>) {
    for id in completed {
        tracing::trace!(
            "Branch {} (depth {}) {}",
            tree.url(id),
            tree.depth(id),
            tree.state(id)
        );
    }
}

/// Crawls from `seed_url` over HTTP with default settings and `max_depth`
///
/// # Example
///
/// ```no_run
/// use article_harvester::crawl;
///
/// # async fn example() -> Result<(), article_harvester::HarvestError> {
/// let records = crawl("https://news.example.com/", 2).await?;
/// println!("{} articles", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed_url: &str, max_depth: u32) -> Result<Vec<Record>, HarvestError> {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;

    let coordinator = Coordinator::from_config(config)?;
    Ok(coordinator.run(seed_url).await?.records)
}
