//! Platform credential capability
//!
//! The seam to whatever actually talks to the authenticator: a browser
//! bridge, a CTAP2 stack, or a test double.

use async_trait::async_trait;
use ciborium::value::Value;

use super::errors::CredentialError;
use super::types::{Assertion, Attestation};

/// Source of platform credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Create a new credential from registration challenge options
    ///
    /// # Errors
    ///
    /// Returns an error if the user cancels, no authenticator supports the
    /// options, or the platform otherwise refuses.
    async fn create(&self, options: Value) -> Result<Attestation, CredentialError>;

    /// Produce an assertion from authentication challenge options
    ///
    /// # Errors
    ///
    /// Returns an error if the user cancels, no credential matches, or the
    /// platform otherwise refuses.
    async fn get(&self, options: Value) -> Result<Assertion, CredentialError>;
}
