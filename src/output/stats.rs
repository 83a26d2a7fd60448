//! Run statistics
//!
//! Branch tasks bump lock-free counters while they run; the coordinator turns
//! them into a [`CrawlStatistics`] snapshot once every branch has joined.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by every branch of one run
#[derive(Debug, Default)]
pub struct RunCounters {
    pages_fetched: AtomicUsize,
    pages_failed: AtomicUsize,
    pages_cancelled: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    budget_skipped: AtomicUsize,
    depth_cut: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A branch was abandoned because the run was cancelled
    pub fn page_cancelled(&self) {
        self.pages_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn budget_skipped(&self) {
        self.budget_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A branch had successors but no depth budget left to follow them
    pub fn depth_cut(&self) {
        self.depth_cut.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a statistics snapshot
    pub fn snapshot(
        &self,
        records: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        cancelled: bool,
    ) -> CrawlStatistics {
        CrawlStatistics {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            pages_cancelled: self.pages_cancelled.load(Ordering::Relaxed),
            records,
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            budget_skipped: self.budget_skipped.load(Ordering::Relaxed),
            depth_cut: self.depth_cut.load(Ordering::Relaxed),
            started_at,
            finished_at,
            cancelled,
        }
    }
}

/// Statistics for one finished run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages fetched successfully
    pub pages_fetched: usize,

    /// Pages whose fetch failed
    pub pages_failed: usize,

    /// Branches abandoned by cancellation or deadline; not counted as failed
    pub pages_cancelled: usize,

    /// Records collected across all branches
    pub records: usize,

    /// Candidate URLs skipped because another branch already claimed them
    pub duplicates_skipped: usize,

    /// Candidate URLs dropped because the page budget was spent
    pub budget_skipped: usize,

    /// Branches whose successors were not followed for lack of depth
    pub depth_cut: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Whether the run stopped early on cancellation or deadline
    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Percentage of attempted pages that were fetched successfully
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.pages_failed;
        if attempted == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints crawl statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Duration: {:.1}s", stats.duration_seconds());
    println!("  Records collected: {}", stats.records);
    println!();

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    if stats.budget_skipped > 0 {
        println!("  Dropped by page budget: {}", stats.budget_skipped);
    }
    if stats.depth_cut > 0 {
        println!("  Branches stopped at max depth: {}", stats.depth_cut);
    }
    println!();

    if stats.cancelled {
        println!("Run was cancelled before the frontier was exhausted");
        println!("  Branches abandoned: {}", stats.pages_cancelled);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_fetched + stats.pages_failed
    );
}
