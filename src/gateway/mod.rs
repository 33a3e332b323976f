//! Request gateway to the remote session service
//!
//! - `POST /start_recording`, `POST /stop_recording` - session lifecycle
//! - `GET /get_current_prediction` - incremental prediction
//! - `POST /convert_text`, `POST /convert_speech_to_sign` - sign artifacts
//! - `POST /speak_text` - speech synthesis
//! - `GET /health` - service health

pub mod artifact;
pub mod client;
pub mod messages;
pub mod service;

pub use artifact::{Artifact, ArtifactSequence};
pub use client::HttpGateway;
pub use service::{ServiceHealth, SessionService, SpeechConversion, StopSummary};
