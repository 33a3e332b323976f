//! Error types for calls into the remote session service
//!
//! Every gateway operation resolves to a [`GatewayResult`], so callers handle
//! service rejections, transport failures and bad local input uniformly.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request completed but the service declined it
    #[error("rejected by service: {0}")]
    Rejected(String),

    /// The request did not complete (connect, timeout, non-2xx without a body)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with something we could not interpret
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Rejected locally before any request was issued
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    /// Message suitable for the notifier, without the category prefix
    pub fn user_message(&self) -> &str {
        match self {
            GatewayError::Rejected(msg)
            | GatewayError::Transport(msg)
            | GatewayError::Malformed(msg)
            | GatewayError::InvalidInput(msg) => msg,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            GatewayError::Malformed(error.to_string())
        } else {
            GatewayError::Transport(error.to_string())
        }
    }
}

/// Result type alias using GatewayError
pub type GatewayResult<T> = Result<T, GatewayError>;
