//! WebAuthn ceremonies
//!
//! A ceremony posts a payload to a begin-endpoint, feeds the returned
//! challenge to the platform credential provider, and posts the payload plus
//! the resulting credential to a complete-endpoint.

mod authentication;
mod callbacks;
mod errors;
mod orchestrator;
mod provider;
mod registration;
mod types;

pub use authentication::{Authentication, LOGIN_BEGIN_URL, LOGIN_COMPLETE_URL};
pub use callbacks::{log_failure, Callbacks, FailureCallback, SuccessCallback};
pub use errors::{CeremonyError, CredentialError};
pub use orchestrator::{run_ceremony, Ceremony, CeremonyOptions, Phase};
pub use provider::CredentialProvider;
pub use registration::{Registration, REGISTER_BEGIN_URL, REGISTER_COMPLETE_URL};
pub use types::{
    Assertion, AssertionResponse, Attestation, AttestationResponse, Endpoints, FailureCode,
    FailureCodes, Payload,
};

use crate::transport::TransportResponse;

/// Register a new credential
///
/// Defaults: `/api/auth/register/begin/`, `/api/auth/register/`, the shared
/// transport, and a logging failure handler.
///
/// # Errors
///
/// Returns the error that ended the ceremony; see [`run_ceremony`].
pub async fn register_ceremony(
    payload: Payload,
    provider: &dyn CredentialProvider,
    callbacks: Callbacks,
    options: CeremonyOptions,
) -> Result<TransportResponse, CeremonyError> {
    run_ceremony(&Registration, provider, payload, callbacks, options).await
}

/// Authenticate with an existing credential
///
/// Defaults: `/api/auth/login/begin/`, `/api/auth/login/`, the shared
/// transport, and a logging failure handler.
///
/// # Errors
///
/// Returns the error that ended the ceremony; see [`run_ceremony`].
pub async fn login_ceremony(
    payload: Payload,
    provider: &dyn CredentialProvider,
    callbacks: Callbacks,
    options: CeremonyOptions,
) -> Result<TransportResponse, CeremonyError> {
    run_ceremony(&Authentication, provider, payload, callbacks, options).await
}
