//! Transport error types

use reqwest::StatusCode;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors raised while carrying a ceremony request to the server
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint path could not be resolved against the base URL
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP client could not be configured
    #[error("HTTP client configuration error: {0}")]
    Client(String),

    /// Connection, TLS, or timeout failure
    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: StatusCode },

    /// Body could not be converted to or from its wire format
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl TransportError {
    /// HTTP status of the failed exchange, if the server answered
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a codec failure rather than a transport failure
    #[must_use]
    pub fn is_codec(&self) -> bool {
        matches!(self, TransportError::Codec(_))
    }

    pub(crate) fn network(url: &str, error: &reqwest::Error) -> Self {
        TransportError::Network {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
