//! Feed health supervision
//!
//! The continuous visual feed is loaded through a [`FeedTransport`] and watched
//! by the [`FeedMonitor`], which refreshes it when stale and retries failed
//! loads within a fixed budget.

mod config;
mod health;
mod monitor;
mod transport;

pub use config::FeedConfig;
pub use health::{FeedHealth, FeedSnapshot};
pub use monitor::FeedMonitor;
pub use transport::{FeedTransport, HttpFeedTransport};
