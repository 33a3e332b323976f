use serde::{Deserialize, Serialize};

use super::artifact::ArtifactSequence;
use crate::error::GatewayResult;

/// Summary returned when a session ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopSummary {
    /// Sentence refined from the detected letters
    pub meaningful_sentence: Option<String>,
    /// Letters as detected, space separated
    pub raw_text: Option<String>,
}

/// Result of converting captured speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechConversion {
    pub text: String,
    pub artifacts: ArtifactSequence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub healthy: bool,
    pub model_loaded: bool,
    pub rate_limiting: bool,
}

/// Operations offered by the remote session service
///
/// Implementations:
/// - [`super::HttpGateway`]: JSON over HTTP
/// - scripted doubles in the integration tests
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Begin a capture session
    async fn start_session(&self) -> GatewayResult<()>;

    /// End the capture session and collect its summary
    async fn stop_session(&self) -> GatewayResult<StopSummary>;

    /// Current incremental prediction
    async fn current_prediction(&self) -> GatewayResult<String>;

    /// Convert already validated text into sign artifacts
    async fn convert_text(&self, text: &str) -> GatewayResult<ArtifactSequence>;

    /// Record speech server-side and convert it into sign artifacts
    async fn convert_speech(&self) -> GatewayResult<SpeechConversion>;

    /// Speak the last session's sentence
    async fn speak(&self) -> GatewayResult<()>;

    async fn health(&self) -> GatewayResult<ServiceHealth>;
}
