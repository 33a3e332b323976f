use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::SessionConfig;
use super::poller::PredictionPoller;
use super::stats::{select_summary, SessionState, SessionStats, SummarySource};
use crate::error::GatewayError;
use crate::gateway::SessionService;
use crate::surface::{DisplaySurface, NoticeLevel, Notifier};

/// What a user command ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command took effect
    Applied,
    /// Not valid in the current state; reported as informational
    Ignored,
    /// The service rejected it or could not be reached
    Failed(GatewayError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Starting,
    Stopping,
}

#[derive(Debug, Default)]
struct ControllerState {
    state: SessionState,
    /// A start or stop request is awaiting the service
    transition: Option<Transition>,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    sessions_completed: usize,
    last_summary: Option<String>,
    /// Set once by `dispose`; late acknowledgments are torn down instead of applied
    disposed: bool,
}

/// Brackets a live capture session against the remote service
///
/// Owns the session state, the capture device lifecycle and the prediction
/// poller. State changes happen inside one lock scope that never spans a
/// request, so overlapping commands observe either the old or the new state.
pub struct SessionController {
    service: Arc<dyn SessionService>,
    surface: Arc<dyn DisplaySurface>,
    notifier: Arc<dyn Notifier>,
    poller: PredictionPoller,
    inner: Mutex<ControllerState>,
}

impl SessionController {
    pub fn new(
        service: Arc<dyn SessionService>,
        surface: Arc<dyn DisplaySurface>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        let poller = PredictionPoller::new(
            Arc::clone(&service),
            Arc::clone(&surface),
            config.poll_interval(),
        );

        Self {
            service,
            surface,
            notifier,
            poller,
            inner: Mutex::new(ControllerState::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Start a recording session (valid only from Idle)
    pub async fn start(&self) -> CommandOutcome {
        {
            let mut inner = self.inner.lock();
            if inner.disposed {
                debug!("Start ignored: controller disposed");
                return CommandOutcome::Ignored;
            }
            if inner.transition.is_some() {
                drop(inner);
                info!("Start ignored: previous command still pending");
                self.notifier.notify(
                    NoticeLevel::Info,
                    "Please wait for the previous command to finish",
                );
                return CommandOutcome::Ignored;
            }
            if inner.state == SessionState::Active {
                drop(inner);
                info!("Start ignored: recording already in progress");
                self.notifier
                    .notify(NoticeLevel::Info, "Recording is already in progress");
                return CommandOutcome::Ignored;
            }
            inner.transition = Some(Transition::Starting);
        }

        info!("Requesting session start");
        let result = self.service.start_session().await;

        let session_id = {
            let mut inner = self.inner.lock();
            inner.transition = None;

            if let Err(e) = result {
                drop(inner);
                error!("Failed to start recording: {}", e);
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Failed to start recording: {}", e.user_message()),
                );
                return CommandOutcome::Failed(e);
            }

            if inner.disposed {
                None
            } else {
                let session_id = Uuid::new_v4();
                inner.state = SessionState::Active;
                inner.session_id = Some(session_id);
                inner.started_at = Some(Utc::now());
                self.poller.start();
                Some(session_id)
            }
        };

        let Some(session_id) = session_id else {
            // Nobody owns the capture any more; end the session the service just opened
            warn!("Start acknowledged after dispose, stopping the service session");
            if let Err(e) = self.service.stop_session().await {
                warn!("Failed to stop orphaned session: {}", e);
            }
            return CommandOutcome::Ignored;
        };

        if let Err(e) = self.surface.acquire_capture() {
            // The session is live on the service side; keep it and let the user stop it
            warn!("Failed to acquire capture device: {:#}", e);
            self.notifier.notify(
                NoticeLevel::Warning,
                &format!("Could not access the camera: {}", e),
            );
        }

        info!("Recording session {} started", session_id);
        self.surface.on_session_started();
        self.notifier.notify(NoticeLevel::Success, "Recording started");

        CommandOutcome::Applied
    }

    /// Stop the recording session (valid only from Active)
    ///
    /// Local state leaves Active before the service is contacted.
    pub async fn stop(&self) -> CommandOutcome {
        let session_id = {
            let mut inner = self.inner.lock();
            if inner.disposed {
                debug!("Stop ignored: controller disposed");
                return CommandOutcome::Ignored;
            }
            if inner.state != SessionState::Active || inner.transition.is_some() {
                drop(inner);
                info!("Stop ignored: no recording in progress");
                self.notifier
                    .notify(NoticeLevel::Info, "No recording in progress");
                return CommandOutcome::Ignored;
            }

            inner.state = SessionState::Idle;
            inner.transition = Some(Transition::Stopping);
            inner.started_at = None;
            self.poller.stop();
            inner.session_id.take()
        };

        self.surface.release_capture();

        info!(
            "Requesting session stop{}",
            session_id.map(|id| format!(" for {}", id)).unwrap_or_default()
        );
        let result = self.service.stop_session().await;

        let mut inner = self.inner.lock();
        inner.transition = None;

        match result {
            Ok(summary) => {
                let (source, text) = select_summary(&summary);
                inner.sessions_completed += 1;
                inner.last_summary = Some(text.clone());
                drop(inner);

                info!("Recording stopped: {:?} summary '{}'", source, text);
                self.surface.on_session_stopped(&text);

                match source {
                    SummarySource::Sentence => self
                        .notifier
                        .notify(NoticeLevel::Success, "Recording stopped"),
                    SummarySource::RawText => self.notifier.notify(
                        NoticeLevel::Info,
                        "Showing the raw detected letters; no refined sentence was produced",
                    ),
                    SummarySource::Nothing => self
                        .notifier
                        .notify(NoticeLevel::Info, "No signs were detected during recording"),
                }

                CommandOutcome::Applied
            }
            Err(e) => {
                drop(inner);
                error!("Failed to stop recording: {}", e);
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Failed to stop recording: {}", e.user_message()),
                );
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Ask the service to speak the last sentence
    pub async fn speak(&self) -> CommandOutcome {
        match self.service.speak().await {
            Ok(()) => {
                info!("Speech synthesis finished");
                self.notifier
                    .notify(NoticeLevel::Success, "Audio played successfully");
                CommandOutcome::Applied
            }
            Err(e @ GatewayError::Rejected(_)) => {
                warn!("Speak rejected: {}", e);
                self.notifier.notify(NoticeLevel::Warning, e.user_message());
                CommandOutcome::Failed(e)
            }
            Err(e) => {
                error!("Speak failed: {}", e);
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Failed to play audio: {}", e.user_message()),
                );
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Get current session statistics
    pub fn stats(&self) -> SessionStats {
        let inner = self.inner.lock();
        let duration_secs = inner
            .started_at
            .map(|at| Utc::now().signed_duration_since(at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStats {
            state: inner.state,
            session_id: inner.session_id,
            started_at: inner.started_at,
            duration_secs,
            prediction_ticks: self.poller.ticks(),
            failed_ticks: self.poller.failed_ticks(),
            sessions_completed: inner.sessions_completed,
            last_summary: inner.last_summary.clone(),
        }
    }

    /// Tear down local resources without contacting the service
    pub fn dispose(&self) {
        let was_active = {
            let mut inner = self.inner.lock();
            inner.disposed = true;
            let was_active = inner.state == SessionState::Active;
            inner.state = SessionState::Idle;
            inner.session_id = None;
            inner.started_at = None;
            self.poller.stop();
            was_active
        };

        if was_active {
            self.surface.release_capture();
            warn!("Session controller disposed while recording");
        } else {
            info!("Session controller disposed");
        }
    }
}
