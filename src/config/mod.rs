//! Configuration module for Article Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the crawler runs without any file.
//!
//! # Example
//!
//! ```no_run
//! use article_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractConfig, ExtractStrategy, FetchConfig, OutputConfig,
    RateLimitConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_selector};
