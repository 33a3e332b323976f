//! Sign playback
//!
//! Converts text or speech into sign artifacts through the gateway and reveals
//! them one per cadence tick on the display surface.

mod config;
mod scheduler;

pub use config::{validate_text, PlaybackConfig};
pub use scheduler::PlaybackScheduler;
