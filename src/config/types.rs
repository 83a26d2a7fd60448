use serde::{Deserialize, Serialize};

/// Main configuration structure for Article Harvester
///
/// Every section and key has a default, so an empty file (or no file at all)
/// yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub rate_limit: RateLimitConfig,
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Depth budget given to the seed branch
    pub max_depth: u32,

    /// Maximum number of distinct URLs dispatched in one run
    pub max_pages: u32,

    /// Maximum number of branches in flight at once
    pub max_concurrent_branches: u32,

    /// Whether following a pagination link spends one unit of depth
    pub pagination_consumes_depth: bool,

    /// Whether content links on other hosts are followed
    pub follow_external: bool,

    /// Overall deadline for a run in seconds (0 disables it)
    pub crawl_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 500,
            max_concurrent_branches: 8,
            pagination_consumes_depth: false,
            follow_external: false,
            crawl_timeout_secs: 0,
        }
    }
}

/// Per-host politeness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Maximum number of in-flight fetches against one host
    pub per_host_concurrency: u32,

    /// Minimum time between request starts against one host (milliseconds)
    pub request_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_host_concurrency: 2,
            request_delay_ms: 1000,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Which extraction strategy runs over each fetched page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractStrategy {
    /// Structural article containers with title/link/date sub-elements
    #[default]
    Articles,
    /// Every anchor on the page, for sites without article containers
    Anchors,
}

/// Extraction configuration
///
/// All selectors use the CSS dialect understood by the `scraper` crate.
/// The title, link and date selectors are evaluated inside each article
/// container; the pagination selector is evaluated over the whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractConfig {
    pub strategy: ExtractStrategy,
    pub article_selector: String,
    pub title_selector: String,
    pub link_selector: String,
    pub date_selector: String,
    pub pagination_selector: String,

    /// Anchors whose href or text contains this keyword are treated as
    /// pagination links (case-insensitive; empty disables keyword matching)
    pub pagination_keyword: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractStrategy::Articles,
            article_selector: ".article".to_string(),
            title_selector: "h2".to_string(),
            link_selector: "a".to_string(),
            date_selector: ".date".to_string(),
            pagination_selector: r#"a[rel~="next"], link[rel~="next"]"#.to_string(),
            pagination_keyword: "next".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON document the records are written to
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "news.json".to_string(),
        }
    }
}
