// Shared doubles for integration tests: a scripted session service, a
// scripted feed transport and a display surface that records every call.

#![allow(dead_code)]

use anyhow::anyhow;
use parking_lot::Mutex;
use signbridge::{
    Artifact, ArtifactSequence, DisplaySurface, FeedStatusKind, FeedTransport, GatewayError,
    GatewayResult, NoticeLevel, Notifier, Progress, ServiceHealth, SessionService,
    SpeechConversion, StopSummary,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CaptureAcquired,
    CaptureReleased,
    SessionStarted,
    SessionStopped(String),
    Prediction(String),
    Recognized(String),
    Revealed {
        label: String,
        position: usize,
        total: usize,
    },
    PlaybackComplete,
    Feed(FeedStatusKind, String),
}

/// Records everything written to the display surface and notifier
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<Event>>,
    notices: Mutex<Vec<(NoticeLevel, String)>>,
    fail_capture: Mutex<bool>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().clone()
    }

    pub fn fail_capture(&self) {
        *self.fail_capture.lock() = true;
    }

    pub fn reveals(&self) -> Vec<(String, usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Revealed {
                    label,
                    position,
                    total,
                } => Some((label, position, total)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn feed_statuses(&self) -> Vec<(FeedStatusKind, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Feed(kind, detail) => Some((kind, detail)),
                _ => None,
            })
            .collect()
    }

    pub fn predictions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Prediction(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn has_notice(&self, level: NoticeLevel, fragment: &str) -> bool {
        self.notices()
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(fragment))
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl DisplaySurface for RecordingSurface {
    fn acquire_capture(&self) -> anyhow::Result<()> {
        if *self.fail_capture.lock() {
            return Err(anyhow!("camera busy"));
        }
        self.push(Event::CaptureAcquired);
        Ok(())
    }

    fn release_capture(&self) {
        self.push(Event::CaptureReleased);
    }

    fn on_session_started(&self) {
        self.push(Event::SessionStarted);
    }

    fn on_session_stopped(&self, summary: &str) {
        self.push(Event::SessionStopped(summary.to_string()));
    }

    fn on_prediction_tick(&self, text: &str) {
        self.push(Event::Prediction(text.to_string()));
    }

    fn on_recognized_text(&self, text: &str) {
        self.push(Event::Recognized(text.to_string()));
    }

    fn on_artifact_revealed(&self, artifact: &Artifact, progress: Progress) {
        self.push(Event::Revealed {
            label: artifact.label.clone(),
            position: progress.position,
            total: progress.total,
        });
    }

    fn on_playback_complete(&self) {
        self.push(Event::PlaybackComplete);
    }

    fn on_feed_status(&self, kind: FeedStatusKind, detail: &str) {
        self.push(Event::Feed(kind, detail.to_string()));
    }
}

impl Notifier for RecordingSurface {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push((level, message.to_string()));
    }
}

/// Session service answering from per-operation scripts
///
/// An empty script falls back to a success answer.
#[derive(Default)]
pub struct ScriptedService {
    pub start: Mutex<VecDeque<GatewayResult<()>>>,
    pub stop: Mutex<VecDeque<GatewayResult<StopSummary>>>,
    pub predictions: Mutex<VecDeque<GatewayResult<String>>>,
    pub conversions: Mutex<VecDeque<GatewayResult<ArtifactSequence>>>,
    pub speech: Mutex<VecDeque<GatewayResult<SpeechConversion>>>,
    pub speak: Mutex<VecDeque<GatewayResult<()>>>,
    /// Artificial latency for every call
    pub latency: Mutex<Duration>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        let service = Self::default();
        *service.latency.lock() = latency;
        Arc::new(service)
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    async fn enter(&self, name: &'static str) {
        self.calls.lock().push(name);
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl SessionService for ScriptedService {
    async fn start_session(&self) -> GatewayResult<()> {
        self.enter("start").await;
        self.start.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn stop_session(&self) -> GatewayResult<StopSummary> {
        self.enter("stop").await;
        self.stop
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(StopSummary::default()))
    }

    async fn current_prediction(&self) -> GatewayResult<String> {
        self.enter("prediction").await;
        self.predictions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("A".to_string()))
    }

    async fn convert_text(&self, text: &str) -> GatewayResult<ArtifactSequence> {
        self.enter("convert_text").await;
        self.conversions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(spell(text)))
    }

    async fn convert_speech(&self) -> GatewayResult<SpeechConversion> {
        self.enter("convert_speech").await;
        self.speech.lock().pop_front().unwrap_or_else(|| {
            Ok(SpeechConversion {
                text: "hi".to_string(),
                artifacts: spell("HI"),
            })
        })
    }

    async fn speak(&self) -> GatewayResult<()> {
        self.enter("speak").await;
        self.speak.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn health(&self) -> GatewayResult<ServiceHealth> {
        self.enter("health").await;
        Ok(ServiceHealth {
            healthy: true,
            model_loaded: true,
            rate_limiting: false,
        })
    }
}

/// One artifact per character, spaces as separators
pub fn spell(text: &str) -> ArtifactSequence {
    ArtifactSequence::new(
        text.chars()
            .map(|c| {
                if c.is_whitespace() {
                    Artifact::separator()
                } else {
                    Artifact::image(c.to_ascii_uppercase().to_string(), vec![c as u8; 4])
                }
            })
            .collect(),
    )
}

pub fn transport_error() -> GatewayError {
    GatewayError::Transport("connection refused".to_string())
}

/// Feed transport answering from a script of load outcomes
#[derive(Default)]
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<(), String>>>,
    /// Outcome once the script runs out
    fallback_ok: Mutex<bool>,
    busters: Mutex<Vec<String>>,
}

impl ScriptedFeed {
    /// Every load succeeds
    pub fn healthy() -> Arc<Self> {
        let feed = Self::default();
        *feed.fallback_ok.lock() = true;
        Arc::new(feed)
    }

    /// Every load fails
    pub fn broken() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, outcome: Result<(), &str>) {
        self.script
            .lock()
            .push_back(outcome.map_err(str::to_string));
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.fallback_ok.lock() = healthy;
    }

    pub fn loads(&self) -> usize {
        self.busters.lock().len()
    }

    pub fn busters(&self) -> Vec<String> {
        self.busters.lock().clone()
    }
}

#[async_trait::async_trait]
impl FeedTransport for ScriptedFeed {
    async fn load(&self, cache_buster: &str) -> anyhow::Result<()> {
        self.busters.lock().push(cache_buster.to_string());
        let outcome = self.script.lock().pop_front();
        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None if *self.fallback_ok.lock() => Ok(()),
            None => Err(anyhow!("feed unavailable")),
        }
    }
}
