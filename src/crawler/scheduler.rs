//! Per-host politeness limiter
//!
//! This module handles:
//! - Capping in-flight fetches per host via one semaphore per host
//! - Spacing request starts per host by a minimum delay
//! - Giving up promptly once the run is cancelled
//! - Cancelling a run once its deadline passes
//!
//! The limiter is built from [`RateLimitConfig`] and handed to the engine; it
//! carries no global state.

use crate::config::RateLimitConfig;
use crate::state::HostState;
use crate::url::host_key;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use url::Url;

struct HostEntry {
    semaphore: Arc<Semaphore>,
    state: HostState,
}

/// Permission to send one request to one host
///
/// Holding it counts against the host's concurrency cap; dropping it frees
/// the slot.
pub struct HostPermit {
    host: String,
    _permit: OwnedSemaphorePermit,
}

impl HostPermit {
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Per-host concurrency and pacing limiter
pub struct HostLimiter {
    per_host_concurrency: usize,
    delay: Duration,
    hosts: Mutex<HashMap<String, HostEntry>>,
    cancel: CancellationToken,
}

impl HostLimiter {
    /// Creates a limiter from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Per-host concurrency cap and request delay
    /// * `cancel` - Once cancelled, pending and future acquisitions give up
    pub fn new(config: &RateLimitConfig, cancel: CancellationToken) -> Self {
        Self {
            per_host_concurrency: config.per_host_concurrency.max(1) as usize,
            delay: Duration::from_millis(config.request_delay_ms),
            hosts: Mutex::new(HashMap::new()),
            cancel,
        }
    }

    /// Waits until a request to the URL's host may start
    ///
    /// This method:
    /// 1. Waits for one of the host's concurrency slots
    /// 2. Reserves the host's next start time
    /// 3. Sleeps until that start time
    ///
    /// # Returns
    ///
    /// * `Some(HostPermit)` - The request may be sent now
    /// * `None` - The run was cancelled while waiting
    pub async fn acquire(&self, url: &Url) -> Option<HostPermit> {
        let host = host_key(url).unwrap_or_default();

        let semaphore = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            hosts
                .entry(host.clone())
                .or_insert_with(|| HostEntry {
                    semaphore: Arc::new(Semaphore::new(self.per_host_concurrency)),
                    state: HostState::new(),
                })
                .semaphore
                .clone()
        };

        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            permit = semaphore.acquire_owned() => permit.ok()?,
        };

        let (wait, count) = {
            let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
            hosts
                .get_mut(&host)
                .map(|entry| {
                    let wait = entry.state.reserve_slot(self.delay, Instant::now());
                    (wait, entry.state.request_count)
                })
                .unwrap_or((Duration::ZERO, 0))
        };

        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before request {} to {}", wait, count, host);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        Some(HostPermit {
            host,
            _permit: permit,
        })
    }

    /// Token this limiter gives up on
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Cancels `cancel` once `secs` seconds have passed
///
/// Zero means no deadline. The timer stops early if the token is cancelled
/// by anything else.
pub fn arm_deadline(cancel: &CancellationToken, secs: u64) {
    if secs == 0 {
        return;
    }

    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                tracing::warn!("Crawl deadline of {}s reached", secs);
                cancel.cancel();
            }
        }
    });
}
