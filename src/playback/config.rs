use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

/// Configuration for sign playback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Time each artifact stays on screen
    /// Default: 1000 ms
    pub reveal_interval_ms: u64,

    /// Longest text accepted for conversion, in characters
    pub max_text_len: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: 1000,
            max_text_len: 500,
        }
    }
}

impl PlaybackConfig {
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

/// Trim `text` and reject it if empty or longer than `max_len` characters.
pub fn validate_text(text: &str, max_len: usize) -> GatewayResult<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(GatewayError::InvalidInput(
            "No text provided. Please enter some text to convert.".to_string(),
        ));
    }

    if text.chars().count() > max_len {
        return Err(GatewayError::InvalidInput(format!(
            "Text too long. Maximum {} characters allowed.",
            max_len
        )));
    }

    Ok(text.to_string())
}
