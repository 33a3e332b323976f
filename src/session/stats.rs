use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::StopSummary;

/// Shown when a session ends without any detected letters
pub const NO_SIGNS_DETECTED: &str = "No signs detected";

/// Capture state of the recording session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Active,
}

/// Statistics about the current or last recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub state: SessionState,

    /// Local id of the active session, for log correlation
    pub session_id: Option<uuid::Uuid>,

    /// When the active session was acknowledged
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since `started_at`, zero when idle
    pub duration_secs: f64,

    /// Prediction ticks rendered in the active session
    pub prediction_ticks: usize,

    /// Prediction ticks whose fetch failed
    pub failed_ticks: usize,

    /// Sessions whose stop was acknowledged by the service
    pub sessions_completed: usize,

    /// Summary text of the last stopped session
    pub last_summary: Option<String>,
}

/// Which field of the stop response ended up on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    /// Refined sentence
    Sentence,
    /// Raw detected letters; the refinement was empty
    RawText,
    /// Neither field carried text
    Nothing,
}

/// Pick the text to show: refined sentence, then raw text, then the fallback.
pub fn select_summary(summary: &StopSummary) -> (SummarySource, String) {
    let non_empty = |field: &Option<String>| {
        field
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    if let Some(sentence) = non_empty(&summary.meaningful_sentence) {
        (SummarySource::Sentence, sentence)
    } else if let Some(raw) = non_empty(&summary.raw_text) {
        (SummarySource::RawText, raw)
    } else {
        (SummarySource::Nothing, NO_SIGNS_DETECTED.to_string())
    }
}
