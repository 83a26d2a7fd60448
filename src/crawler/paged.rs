//! Fixed-page-count crawl
//!
//! Fetches `seed?page=1..N` in order with the fetcher and extractor, honoring
//! the same per-host limiter and deadline as the engine. No links are
//! followed.

use crate::config::Config;
use crate::crawler::coordinator::CrawlOutcome;
use crate::crawler::extractor::{Extractor, Record};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::scheduler::{arm_deadline, HostLimiter};
use crate::output::RunCounters;
use crate::url::{paged_url, parse_seed_url};
use crate::HarvestError;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches and extracts pages 1 through `pages` of a paginated listing
///
/// # Arguments
///
/// * `fetcher` - Page source
/// * `extractor` - Record extractor
/// * `limiter` - Per-host limiter; once its token is cancelled the current
///   fetch is abandoned and no further page is requested
/// * `seed` - Listing URL; its `page` parameter is replaced for every page
/// * `pages` - Number of pages to fetch
/// * `counters` - Run counters to update
///
/// # Returns
///
/// * `Ok(Vec<Record>)` - Records from every page that was fetched
/// * `Err(HarvestError)` - Page 1 could not be fetched
pub async fn crawl_pages<F: PageFetcher + ?Sized>(
    fetcher: &F,
    extractor: &Extractor,
    limiter: &HostLimiter,
    seed: &Url,
    pages: u32,
    counters: &RunCounters,
) -> Result<Vec<Record>, HarvestError> {
    let mut records = Vec::new();

    for page in 1..=pages {
        let url = paged_url(seed, page);

        let fetched = match limiter.acquire(&url).await {
            Some(_permit) => tokio::select! {
                biased;
                _ = limiter.cancellation_token().cancelled() => None,
                body = fetcher.fetch(&url) => Some(body),
            },
            None => None,
        };

        let Some(fetched) = fetched else {
            if page == 1 {
                return Err(HarvestError::Cancelled {
                    url: url.to_string(),
                });
            }
            tracing::warn!("Cancelled at page {} of {}", page, pages);
            break;
        };

        let body = match fetched {
            Ok(body) => body,
            Err(e) if page == 1 => {
                counters.page_failed();
                return Err(e);
            }
            Err(e) => {
                counters.page_failed();
                tracing::warn!("Skipping page {}: {}", page, e);
                continue;
            }
        };
        counters.page_fetched();

        let found = extractor.extract(&body, &url);
        tracing::info!("Page {}: {} articles", page, found.len());
        records.extend(found);
    }

    Ok(records)
}

/// Runs a fixed-page-count crawl over HTTP
///
/// # Arguments
///
/// * `config` - Fetch, rate-limit and extraction settings
/// * `seed` - Listing URL
/// * `pages` - Number of pages to fetch
/// * `cancel` - Stops the run; `crawler.crawl-timeout-secs` cancels it too
pub async fn run_paged(
    config: &Config,
    seed: &str,
    pages: u32,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, HarvestError> {
    let seed_url = parse_seed_url(seed).map_err(HarvestError::Argument)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let extractor = Extractor::new(&config.extract)?;
    let run_cancel = cancel.child_token();
    // Ends the deadline timer once this run returns
    let _run_guard = run_cancel.clone().drop_guard();
    arm_deadline(&run_cancel, config.crawler.crawl_timeout_secs);

    let limiter = HostLimiter::new(&config.rate_limit, run_cancel.clone());
    let counters = RunCounters::new();
    let started_at = Utc::now();

    tracing::info!("Fetching {} pages of {}", pages, seed_url);

    let records = crawl_pages(&fetcher, &extractor, &limiter, &seed_url, pages, &counters).await?;
    let stats = counters.snapshot(
        records.len(),
        started_at,
        Utc::now(),
        run_cancel.is_cancelled(),
    );

    Ok(CrawlOutcome { records, stats })
}
