//! Recording session management
//!
//! This module provides the `SessionController` that manages:
//! - The Idle/Active session state confirmed by the remote service
//! - The capture device lifecycle on the display surface
//! - Prediction polling while a session is active
//! - Session summaries and statistics

mod config;
mod controller;
mod poller;
mod stats;

pub use config::SessionConfig;
pub use controller::{CommandOutcome, SessionController};
pub use poller::PredictionPoller;
pub use stats::{select_summary, SessionState, SessionStats, SummarySource, NO_SIGNS_DETECTED};
