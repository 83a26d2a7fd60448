use std::time::{Duration, Instant};

/// Tracks request pacing for one host during a run
///
/// Start times are reserved rather than observed: each caller is handed the
/// earliest instant that is at least `delay` after the previously reserved
/// start, so concurrent callers are spaced out even before any of them has
/// actually sent its request.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests started (or reserved) against this host
    pub request_count: u32,

    /// Start time of the most recently reserved request
    pub last_request_time: Option<Instant>,
}

impl HostState {
    /// Creates a new HostState with no requests recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request can start
    ///
    /// Returns None if a request can start now.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + delay;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Reserves the next request slot and returns how long to wait for it
    pub fn reserve_slot(&mut self, delay: Duration, now: Instant) -> Duration {
        let wait = self
            .time_until_next_request(delay, now)
            .unwrap_or(Duration::ZERO);

        self.request_count += 1;
        self.last_request_time = Some(now + wait);
        wait
    }
}
