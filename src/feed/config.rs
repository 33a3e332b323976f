use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for feed supervision
///
/// Defaults keep a healthy feed refreshed roughly every 10-15 seconds and give
/// a broken one about 30 seconds of retries before declaring it lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed path on the service, cache buster appended per refresh
    pub path: String,
    /// How often staleness is checked
    pub check_interval_ms: u64,
    /// A feed without a successful load for this long is stale
    pub stale_after_ms: u64,
    /// Delay between a failed load and its retry
    pub retry_delay_ms: u64,
    /// Consecutive failures tolerated before the feed is declared lost
    pub max_retries: u32,
    /// How long a load may take to deliver its first frame
    pub load_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "/video_feed".to_string(),
            check_interval_ms: 5_000,
            stale_after_ms: 10_000,
            retry_delay_ms: 3_000,
            max_retries: 10,
            load_timeout_ms: 5_000,
        }
    }
}

impl FeedConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}
