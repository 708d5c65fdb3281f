//! Ceremony orchestrator
//!
//! Drives one begin → credential → complete exchange:
//!
//! 1. POST the payload to the begin-endpoint; its body is the challenge.
//! 2. Hand the challenge to the credential provider.
//! 3. Merge the credential into the payload.
//! 4. POST the merged payload to the complete-endpoint.
//!
//! Each step awaits the previous one. The first failure is terminal and is
//! reported once through the failure callback with the phase's code.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ciborium::value::Value;
use uuid::Uuid;

use super::callbacks::Callbacks;
use super::errors::{CeremonyError, CredentialError};
use super::provider::CredentialProvider;
use super::types::{Endpoints, FailureCode, FailureCodes, Payload};
use crate::transport::{shared_transport, Transport, TransportResponse};
use crate::utils::logging::LoggingHelper;

/// One kind of ceremony: which credential to request and how to report it
#[async_trait]
pub trait Ceremony: Send + Sync {
    /// Credential the provider returns for this ceremony
    type Credential: Send;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Default begin/complete endpoints
    fn endpoints(&self) -> Endpoints;

    /// Codes reported when a phase fails
    fn failure_codes(&self) -> FailureCodes;

    /// Ask the provider for a credential answering `options`
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection unchanged.
    async fn request_credential(
        &self,
        provider: &dyn CredentialProvider,
        options: Value,
    ) -> Result<Self::Credential, CredentialError>;

    /// Build the complete-endpoint payload from the original payload and the credential
    fn complete_payload(&self, payload: Payload, credential: Self::Credential) -> Payload;
}

/// Per-invocation overrides
///
/// Every field falls back to a documented default:
/// - `begin_url` / `complete_url`: the ceremony's [`Ceremony::endpoints`]
/// - `transport`: [`shared_transport`]
#[derive(Clone, Default)]
pub struct CeremonyOptions {
    pub begin_url: Option<String>,
    pub complete_url: Option<String>,
    pub transport: Option<Arc<dyn Transport>>,
}

impl CeremonyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn begin_url(mut self, url: impl Into<String>) -> Self {
        self.begin_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn complete_url(mut self, url: impl Into<String>) -> Self {
        self.complete_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for CeremonyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CeremonyOptions")
            .field("begin_url", &self.begin_url)
            .field("complete_url", &self.complete_url)
            .field("transport", &self.transport.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Phase of a running ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    Credential,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Begin => f.write_str("begin"),
            Phase::Credential => f.write_str("credential"),
            Phase::Complete => f.write_str("complete"),
        }
    }
}

/// Run a ceremony to completion
///
/// Exactly one callback fires for every outcome except a codec failure,
/// which is only returned.
///
/// # Errors
///
/// Returns the error that ended the ceremony, after the failure callback has
/// run for it.
pub async fn run_ceremony<C: Ceremony + ?Sized>(
    ceremony: &C,
    provider: &dyn CredentialProvider,
    payload: Payload,
    callbacks: Callbacks,
    options: CeremonyOptions,
) -> Result<TransportResponse, CeremonyError> {
    let id = Uuid::new_v4();
    let codes = ceremony.failure_codes();
    let defaults = ceremony.endpoints();
    let begin_url = options.begin_url.unwrap_or(defaults.begin_url);
    let complete_url = options.complete_url.unwrap_or(defaults.complete_url);

    LoggingHelper::log_ceremony_start(ceremony.name(), &id, &begin_url, &complete_url);

    let transport = match options.transport {
        Some(transport) => transport,
        None => match shared_transport() {
            Ok(transport) => transport,
            Err(error) => {
                return Err(dispatch_failure(callbacks, &id, Phase::Begin, codes.begin, error.into()));
            }
        },
    };

    LoggingHelper::log_phase(&id, Phase::Begin);
    let challenge = match transport.post(&begin_url, payload.clone().into_value()).await {
        Ok(response) => response.body,
        Err(error) => {
            return Err(dispatch_failure(callbacks, &id, Phase::Begin, codes.begin, error.into()));
        }
    };

    LoggingHelper::log_phase(&id, Phase::Credential);
    let credential = match ceremony.request_credential(provider, challenge).await {
        Ok(credential) => credential,
        Err(error) => {
            return Err(dispatch_failure(
                callbacks,
                &id,
                Phase::Credential,
                codes.credential,
                error.into(),
            ));
        }
    };

    LoggingHelper::log_phase(&id, Phase::Complete);
    let complete = ceremony.complete_payload(payload, credential);
    match transport.post(&complete_url, complete.into_value()).await {
        Ok(response) => {
            LoggingHelper::log_ceremony_success(ceremony.name(), &id, response.status);
            callbacks.succeed(&response);
            Ok(response)
        }
        Err(error) => Err(dispatch_failure(
            callbacks,
            &id,
            Phase::Complete,
            codes.complete,
            error.into(),
        )),
    }
}

fn dispatch_failure(
    callbacks: Callbacks,
    id: &Uuid,
    phase: Phase,
    code: FailureCode,
    error: CeremonyError,
) -> CeremonyError {
    if error.is_codec() {
        LoggingHelper::log_codec_failure(id, phase, &error);
        return error;
    }

    LoggingHelper::log_phase_failure(id, phase, code, &error);
    callbacks.fail(&error, code);
    error
}
