//! Transport error type

use thiserror::Error;

/// Any failure to complete a request against the chat service.
///
/// The session treats every variant of failure the same way, so this is not
/// subdivided beyond the HTTP status kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(format!("Network error: {}", message.into()))
    }

    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("Chat service returned HTTP {status}")
        } else {
            format!("Chat service returned HTTP {status}: {body}")
        };
        Self {
            message,
            status: Some(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(format!("Malformed response: {}", message.into()))
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(format!("Invalid service URL: {}", message.into()))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("Request timed out: {err}")
        } else if err.is_decode() {
            format!("Malformed response: {err}")
        } else {
            format!("Network error: {err}")
        };
        Self { message, status }
    }
}
