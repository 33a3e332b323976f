use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::config::{validate_text, PlaybackConfig};
use crate::error::GatewayError;
use crate::gateway::{ArtifactSequence, SessionService};
use crate::schedule::{spawn_recurring, PollSlot};
use crate::session::CommandOutcome;
use crate::surface::{DisplaySurface, NoticeLevel, Notifier, Progress};

#[derive(Debug, Default)]
struct PlaybackState {
    sequence: ArtifactSequence,
    /// Always within `0..=sequence.len()`
    cursor: usize,
    /// Identifies the installed sequence; ticks from older ones stop on sight
    generation: u64,
    completed: bool,
    ticker: PollSlot,
}

/// Reveals converted sign artifacts one at a time on a fixed cadence
pub struct PlaybackScheduler {
    service: Arc<dyn SessionService>,
    surface: Arc<dyn DisplaySurface>,
    notifier: Arc<dyn Notifier>,
    config: PlaybackConfig,
    state: Arc<Mutex<PlaybackState>>,
    /// Latest conversion request; older responses are discarded
    requests: AtomicU64,
}

impl PlaybackScheduler {
    pub fn new(
        service: Arc<dyn SessionService>,
        surface: Arc<dyn DisplaySurface>,
        notifier: Arc<dyn Notifier>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            service,
            surface,
            notifier,
            config,
            state: Arc::new(Mutex::new(PlaybackState::default())),
            requests: AtomicU64::new(0),
        }
    }

    /// Validate `text`, convert it remotely and play back the result
    pub async fn convert_text(&self, text: &str) -> CommandOutcome {
        let text = match validate_text(text, self.config.max_text_len) {
            Ok(text) => text,
            Err(e) => {
                warn!("Conversion input rejected: {}", e);
                self.notifier.notify(NoticeLevel::Warning, e.user_message());
                return CommandOutcome::Failed(e);
            }
        };

        let request = self.begin_request();
        info!("Converting text ({} chars)", text.chars().count());

        match self.service.convert_text(&text).await {
            Ok(sequence) => self.finish_request(request, sequence),
            Err(e) => self.fail_request(request, "convert text", e),
        }
    }

    /// Convert speech captured by the service and play back the result
    pub async fn convert_speech(&self) -> CommandOutcome {
        let request = self.begin_request();
        info!("Converting speech");

        match self.service.convert_speech().await {
            Ok(conversion) => {
                if !self.is_current(request) {
                    debug!("Discarding superseded speech conversion");
                    return CommandOutcome::Ignored;
                }
                info!("Recognized speech: {}", conversion.text);
                self.surface.on_recognized_text(&conversion.text);
                self.finish_request(request, conversion.artifacts)
            }
            Err(e) => self.fail_request(request, "convert speech", e),
        }
    }

    /// Replace whatever is playing with `sequence`
    ///
    /// Also supersedes conversions still in flight, so their results are dropped.
    /// An empty sequence reports "nothing to convert" and schedules nothing.
    pub fn install(&self, sequence: ArtifactSequence) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.install_sequence(None, sequence);
    }

    /// Install `sequence` unless `request` has been superseded meanwhile
    fn install_sequence(&self, request: Option<u64>, sequence: ArtifactSequence) -> bool {
        let mut state = self.state.lock();
        if request.is_some_and(|request| !self.is_current(request)) {
            return false;
        }
        state.ticker.cancel();
        state.generation += 1;
        state.cursor = 0;
        state.completed = false;
        state.sequence = sequence.clone();

        if sequence.is_empty() {
            drop(state);
            info!("Nothing to convert");
            self.notifier.notify(NoticeLevel::Info, "Nothing to convert");
            return true;
        }

        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let surface = Arc::clone(&self.surface);

        state.ticker.restart(|| {
            spawn_recurring("sign-playback", self.config.reveal_interval(), move || {
                std::future::ready(Self::tick(&shared, generation, surface.as_ref()))
            })
        });

        info!("Playing back {} artifacts", sequence.len());
        true
    }

    /// Stop the current playback, if any
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock();
        state.generation += 1;
        let cancelled = state.ticker.cancel();
        if cancelled {
            info!("Playback cancelled at {}/{}", state.cursor, state.sequence.len());
        }
        cancelled
    }

    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    pub fn progress(&self) -> Progress {
        let state = self.state.lock();
        Progress {
            position: state.cursor,
            total: state.sequence.len(),
        }
    }

    pub fn is_playing(&self) -> bool {
        let state = self.state.lock();
        state.ticker.is_active() && !state.completed
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().completed
    }

    pub fn dispose(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.cancel();
        debug!("Playback scheduler disposed");
    }

    /// Runs inside the lock so a superseding `install` can never interleave with a reveal
    fn tick(
        shared: &Mutex<PlaybackState>,
        generation: u64,
        surface: &dyn DisplaySurface,
    ) -> ControlFlow<()> {
        let mut state = shared.lock();
        if state.generation != generation {
            return ControlFlow::Break(());
        }

        let total = state.sequence.len();
        if state.cursor < total {
            let artifact = state.sequence[state.cursor].clone();
            state.cursor += 1;
            let progress = Progress {
                position: state.cursor,
                total,
            };
            debug!("Revealing '{}' ({}/{})", artifact.label, progress.position, total);
            surface.on_artifact_revealed(&artifact, progress);
            ControlFlow::Continue(())
        } else {
            state.ticker.release();
            state.completed = true;
            info!("Playback complete ({} artifacts)", total);
            surface.on_playback_complete();
            ControlFlow::Break(())
        }
    }

    /// A new conversion supersedes in-flight playback immediately
    fn begin_request(&self) -> u64 {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel();
        request
    }

    fn is_current(&self, request: u64) -> bool {
        self.requests.load(Ordering::SeqCst) == request
    }

    fn finish_request(&self, request: u64, sequence: ArtifactSequence) -> CommandOutcome {
        if !self.install_sequence(Some(request), sequence) {
            debug!("Discarding superseded conversion result");
            return CommandOutcome::Ignored;
        }
        CommandOutcome::Applied
    }

    fn fail_request(&self, request: u64, what: &str, e: GatewayError) -> CommandOutcome {
        if !self.is_current(request) {
            debug!("Discarding superseded {} failure: {}", what, e);
            return CommandOutcome::Ignored;
        }

        error!("Failed to {}: {}", what, e);
        let level = match e {
            GatewayError::Rejected(_) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        self.notifier.notify(level, e.user_message());
        CommandOutcome::Failed(e)
    }
}
