//! Crawler module for fetching pages and harvesting articles
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - Article and link extraction
//! - Per-host politeness limiting
//! - The traversal engine and the fixed-page-count variant

mod coordinator;
mod extractor;
mod fetcher;
mod paged;
mod scheduler;

pub use coordinator::{crawl, Coordinator, CrawlOutcome};
pub use extractor::{Extractor, ParsedPage, Record};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use paged::{crawl_pages, run_paged};
pub use scheduler::{arm_deadline, HostLimiter, HostPermit};
