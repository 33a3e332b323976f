use serde::{Deserialize, Serialize};

/// `status` value the service uses for an accepted request
pub const STATUS_SUCCESS: &str = "success";

/// Generic `{status, message?}` envelope (start, speak, error bodies)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to `POST /stop_recording`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopMessage {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub meaningful_sentence: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// Response to `GET /get_current_prediction`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionMessage {
    #[serde(default)]
    pub prediction: String,
}

/// Body of `POST /convert_text`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertTextRequest {
    pub text: String,
}

/// One item of an `images` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMessage {
    pub character: String,
    /// Base64-encoded PNG, absent for whitespace
    #[serde(default)]
    pub image: Option<String>,
}

/// Response to both conversion endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertMessage {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Recognized text, only set by speech conversion
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageMessage>,
}

/// Response to `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMessage {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub rate_limiting: bool,
}
