//! Output module for end-of-run reporting
//!
//! This module handles recording run statistics and printing the final report.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, RunCounters};
