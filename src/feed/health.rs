use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Load bookkeeping for the supervised feed
#[derive(Debug, Clone)]
pub struct FeedHealth {
    /// Monotonic time of the last successful load
    last_success: Option<Instant>,
    /// Wall-clock time of the same load, for reporting
    last_success_at: Option<DateTime<Utc>>,
    /// Failures since the last successful load, capped at `max_failures`
    consecutive_failures: u32,
    max_failures: u32,
}

impl FeedHealth {
    pub fn new(max_failures: u32) -> Self {
        Self {
            last_success: None,
            last_success_at: None,
            consecutive_failures: 0,
            max_failures,
        }
    }

    /// Record a successful load; returns whether it followed failures
    pub fn record_success(&mut self) -> bool {
        let recovered = self.consecutive_failures > 0;
        self.last_success = Some(Instant::now());
        self.last_success_at = Some(Utc::now());
        self.consecutive_failures = 0;
        recovered
    }

    /// Record a failed load
    ///
    /// Returns the new failure count, or `None` once the budget is already
    /// spent; the count itself never exceeds `max_failures`.
    pub fn record_failure(&mut self) -> Option<u32> {
        if self.consecutive_failures >= self.max_failures {
            return None;
        }
        self.consecutive_failures += 1;
        Some(self.consecutive_failures)
    }

    /// Forget failures, e.g. before a manual reconnect
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    /// True when no load has succeeded within the last `window`
    ///
    /// Before the first success, `started` stands in for the last success.
    pub fn is_stale(&self, window: Duration, started: Instant) -> bool {
        self.last_success.unwrap_or(started).elapsed() >= window
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.last_success_at
    }

    pub fn secs_since_success(&self) -> Option<u64> {
        self.last_success.map(|t| t.elapsed().as_secs())
    }
}

/// Point-in-time view of the feed monitor, for status output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub consecutive_failures: u32,
    pub max_retries: u32,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_success_secs_ago: Option<u64>,
    pub retry_pending: bool,
    pub lost: bool,
    pub disposed: bool,
    pub refreshes: u64,
}
