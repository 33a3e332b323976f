//! Collaborators the controllers write into
//!
//! The display surface renders status text, predictions and artifacts; the
//! notifier shows transient conditions. Neither is implemented by the core,
//! apart from the console rendition in [`crate::console`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gateway::Artifact;

/// Feed condition reported to the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatusKind {
    /// A retry is scheduled
    Reconnecting,
    /// Retry budget exhausted; needs manual action
    Lost,
    /// Feed loaded again after one or more failures
    Recovered,
}

impl FeedStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStatusKind::Reconnecting => "reconnecting",
            FeedStatusKind::Lost => "lost",
            FeedStatusKind::Recovered => "recovered",
        }
    }
}

impl fmt::Display for FeedStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a notifier message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Playback progress, `position` items revealed out of `total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.position * 100) / self.total) as u8
    }
}

/// Rendering side of the application
///
/// Calls arrive from controller tasks and must not block.
///
/// `on_artifact_revealed` and `on_playback_complete` run while the playback
/// scheduler holds its state lock. Implementations must not call back into the
/// scheduler from them (`install`, `cancel`, `cursor`, ...), or they deadlock.
pub trait DisplaySurface: Send + Sync {
    /// Acquire the camera for a live session
    fn acquire_capture(&self) -> anyhow::Result<()>;

    /// Release the camera; safe to call when nothing is held
    fn release_capture(&self);

    fn on_session_started(&self);

    fn on_session_stopped(&self, summary: &str);

    fn on_prediction_tick(&self, text: &str);

    /// Text recognized from speech before its artifacts play back
    fn on_recognized_text(&self, text: &str);

    fn on_artifact_revealed(&self, artifact: &Artifact, progress: Progress);

    fn on_playback_complete(&self);

    fn on_feed_status(&self, kind: FeedStatusKind, detail: &str);
}

/// Transient message sink (toasts, status line)
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}
