//! Terminal rendition of the display surface and notifier

use std::io::Write;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::gateway::Artifact;
use crate::surface::{DisplaySurface, FeedStatusKind, NoticeLevel, Notifier, Progress};

/// Writes status to stdout and transient notices to the log
#[derive(Default)]
pub struct ConsoleSurface {
    playback_done: Notify,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves after the next `on_playback_complete`
    pub async fn playback_finished(&self) {
        self.playback_done.notified().await;
    }
}

impl DisplaySurface for ConsoleSurface {
    fn acquire_capture(&self) -> anyhow::Result<()> {
        // The camera sits with the service; nothing to open locally
        info!("Capture running on the service camera");
        Ok(())
    }

    fn release_capture(&self) {
        info!("Capture released");
    }

    fn on_session_started(&self) {
        println!("Recording... (signs appear below)");
    }

    fn on_session_stopped(&self, summary: &str) {
        println!("\n{}", summary);
    }

    fn on_prediction_tick(&self, text: &str) {
        print!("\r{:<20}", text);
        std::io::stdout().flush().ok();
    }

    fn on_recognized_text(&self, text: &str) {
        println!("Recognized: {}", text);
    }

    fn on_artifact_revealed(&self, artifact: &Artifact, progress: Progress) {
        match &artifact.payload {
            Some(bytes) => println!(
                "[{}/{}] {} ({} bytes)",
                progress.position,
                progress.total,
                artifact.label,
                bytes.len()
            ),
            None => println!("[{}/{}] (space)", progress.position, progress.total),
        }
    }

    fn on_playback_complete(&self) {
        println!("Done.");
        self.playback_done.notify_one();
    }

    fn on_feed_status(&self, kind: FeedStatusKind, detail: &str) {
        println!("feed {}: {}", kind, detail);
    }
}

impl Notifier for ConsoleSurface {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => info!("{}", message),
            NoticeLevel::Warning => warn!("{}", message),
            NoticeLevel::Error => error!("{}", message),
        }
    }
}
