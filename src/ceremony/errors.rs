//! Ceremony error types
//!
//! `CeremonyError` is the normalized value handed to failure callbacks: it
//! always has a message and carries the HTTP status when the server answered.

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Rejection from the platform credential capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// User cancelled, or the platform timed out the prompt
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// No authenticator supports the requested options
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Authenticator already holds a matching credential
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The challenge options could not be understood
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Any other platform failure
    #[error("Credential error: {0}")]
    Other(String),
}

/// Normalized ceremony failure
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// Begin or complete exchange failed
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Platform credential capability rejected
    #[error("Credential capability failure: {0}")]
    Credential(#[from] CredentialError),
}

impl CeremonyError {
    /// HTTP status of the failed exchange, if any
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CeremonyError::Transport(error) => error.status(),
            CeremonyError::Credential(_) => None,
        }
    }

    /// Human readable description
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Codec failures bypass the failure callback
    #[must_use]
    pub fn is_codec(&self) -> bool {
        matches!(self, CeremonyError::Transport(error) if error.is_codec())
    }
}
