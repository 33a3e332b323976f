use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::artifact::ArtifactSequence;
use super::messages::{
    ConvertMessage, ConvertTextRequest, HealthMessage, PredictionMessage, StatusMessage,
    StopMessage, STATUS_SUCCESS,
};
use super::service::{ServiceHealth, SessionService, SpeechConversion, StopSummary};
use crate::config::ServiceConfig;
use crate::error::{GatewayError, GatewayResult};

/// Bodies that carry a `{status, message?}` envelope
trait Envelope {
    fn status(&self) -> &str;
    fn message(&self) -> Option<&str>;
}

macro_rules! envelope {
    ($($ty:ty),*) => {
        $(impl Envelope for $ty {
            fn status(&self) -> &str {
                &self.status
            }

            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        })*
    };
}

envelope!(StatusMessage, StopMessage, ConvertMessage);

/// Reject envelopes whose status is anything but `"success"`
fn accept<T: Envelope>(body: T) -> GatewayResult<T> {
    if body.status() == STATUS_SUCCESS {
        Ok(body)
    } else {
        let message = body
            .message()
            .unwrap_or("request was declined")
            .to_string();
        Err(GatewayError::Rejected(message))
    }
}

/// Gateway to the remote session service over JSON/HTTP
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {}", e)))?;

        info!("Session service gateway targeting {}", base_url);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> GatewayResult<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its JSON body, mapping non-2xx to errors
    async fn call<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> GatewayResult<T> {
        debug!("Calling {}", path);

        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", path, e);
            GatewayError::from(e)
        })?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> GatewayResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // Error bodies usually still carry {status:"error", message}
            return match serde_json::from_slice::<StatusMessage>(&bytes) {
                Ok(StatusMessage {
                    message: Some(message),
                    ..
                }) => Err(GatewayError::Rejected(message)),
                _ => Err(GatewayError::Transport(format!("{} returned HTTP {}", path, status))),
            };
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::Malformed(format!("{}: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl SessionService for HttpGateway {
    async fn start_session(&self) -> GatewayResult<()> {
        let body: StatusMessage = self
            .call("/start_recording", self.client.post(self.url("/start_recording")))
            .await?;
        accept(body)?;
        Ok(())
    }

    async fn stop_session(&self) -> GatewayResult<StopSummary> {
        let body: StopMessage = self
            .call("/stop_recording", self.client.post(self.url("/stop_recording")))
            .await?;
        let body = accept(body)?;

        Ok(StopSummary {
            meaningful_sentence: body.meaningful_sentence,
            raw_text: body.raw_text,
        })
    }

    async fn current_prediction(&self) -> GatewayResult<String> {
        let body: PredictionMessage = self
            .call(
                "/get_current_prediction",
                self.client.get(self.url("/get_current_prediction")),
            )
            .await?;
        Ok(body.prediction)
    }

    async fn convert_text(&self, text: &str) -> GatewayResult<ArtifactSequence> {
        let request = ConvertTextRequest {
            text: text.to_string(),
        };
        let body: ConvertMessage = self
            .call(
                "/convert_text",
                self.client.post(self.url("/convert_text")).json(&request),
            )
            .await?;
        let body = accept(body)?;

        ArtifactSequence::from_messages(body.images)
    }

    async fn convert_speech(&self) -> GatewayResult<SpeechConversion> {
        let body: ConvertMessage = self
            .call(
                "/convert_speech_to_sign",
                self.client.post(self.url("/convert_speech_to_sign")),
            )
            .await?;
        let body = accept(body)?;

        Ok(SpeechConversion {
            text: body.text.unwrap_or_default(),
            artifacts: ArtifactSequence::from_messages(body.images)?,
        })
    }

    async fn speak(&self) -> GatewayResult<()> {
        let body: StatusMessage = self
            .call("/speak_text", self.client.post(self.url("/speak_text")))
            .await?;
        accept(body)?;
        Ok(())
    }

    async fn health(&self) -> GatewayResult<ServiceHealth> {
        let body: HealthMessage = self
            .call("/health", self.client.get(self.url("/health")))
            .await?;

        Ok(ServiceHealth {
            healthy: body.status == "healthy",
            model_loaded: body.model_loaded,
            rate_limiting: body.rate_limiting,
        })
    }
}
