//! Article Harvester: a bounded, polite article crawler
//!
//! This crate fetches pages starting from a seed URL, extracts article records
//! (title, link, date), follows pagination and in-site links up to a bounded
//! depth, and saves the collected records as a JSON document.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Article Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {code} for {url}")]
    HttpStatus { url: String, code: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Read { url: String, source: reqwest::Error },

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Crawl cancelled before {url} was fetched")]
    Cancelled { url: String },

    #[error("Invalid branch state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::BranchState,
        to: state::BranchState,
    },
}

impl HarvestError {
    /// Returns true for failures raised while fetching a page
    ///
    /// Fetch failures are local to a branch everywhere except at the seed.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Read { .. }
        )
    }
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

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Article Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlOutcome, Extractor, HttpFetcher, PageFetcher, Record};
pub use state::BranchState;
pub use storage::{JsonFileStore, RecordStore};
