use crate::config::types::{
    Config, CrawlerConfig, ExtractConfig, FetchConfig, OutputConfig, RateLimitConfig,
};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_fetch_config(&config.fetch)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth of 0 is valid: only the seed is fetched

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.max_concurrent_branches < 1 || config.max_concurrent_branches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_branches must be between 1 and 100, got {}",
            config.max_concurrent_branches
        )));
    }

    Ok(())
}

/// Validates per-host politeness configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.per_host_concurrency < 1 || config.per_host_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "per_host_concurrency must be between 1 and 16, got {}",
            config.per_host_concurrency
        )));
    }

    if config.request_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "request_delay_ms must be <= 60000ms, got {}ms",
            config.request_delay_ms
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every configured selector compiles
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("article_selector", &config.article_selector),
        ("title_selector", &config.title_selector),
        ("link_selector", &config.link_selector),
        ("date_selector", &config.date_selector),
        ("pagination_selector", &config.pagination_selector),
    ];

    for (name, selector) in selectors {
        validate_selector(name, selector)?;
    }

    Ok(())
}

/// Checks a single selector string against the scraper CSS dialect
pub fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!("{} is empty", name)));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e)))
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
