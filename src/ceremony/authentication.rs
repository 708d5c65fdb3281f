//! Authentication ceremony
//!
//! Asserts an existing credential and sends the assertion to the server.

use async_trait::async_trait;
use ciborium::value::Value;

use super::errors::CredentialError;
use super::orchestrator::Ceremony;
use super::provider::CredentialProvider;
use super::types::{Assertion, Endpoints, FailureCode, FailureCodes, Payload};

/// Default login begin-endpoint
pub const LOGIN_BEGIN_URL: &str = "/api/auth/login/begin/";

/// Default login complete-endpoint
pub const LOGIN_COMPLETE_URL: &str = "/api/auth/login/";

/// Credential assertion ceremony
#[derive(Debug, Clone, Copy, Default)]
pub struct Authentication;

#[async_trait]
impl Ceremony for Authentication {
    type Credential = Assertion;

    fn name(&self) -> &'static str {
        "authentication"
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints {
            begin_url: LOGIN_BEGIN_URL.to_string(),
            complete_url: LOGIN_COMPLETE_URL.to_string(),
        }
    }

    fn failure_codes(&self) -> FailureCodes {
        FailureCodes {
            begin: FailureCode::LoginFailBegin,
            credential: FailureCode::LoginFailCredential,
            complete: FailureCode::LoginFailComplete,
        }
    }

    async fn request_credential(
        &self,
        provider: &dyn CredentialProvider,
        options: Value,
    ) -> Result<Assertion, CredentialError> {
        provider.get(options).await
    }

    // The user handle is not forwarded; servers look the user up by credential id.
    fn complete_payload(&self, payload: Payload, credential: Assertion) -> Payload {
        let response = credential.response;
        payload.merge([
            ("credentialId", Value::Bytes(credential.raw_id)),
            ("authenticatorData", Value::Bytes(response.authenticator_data)),
            ("clientDataJSON", Value::Bytes(response.client_data_json)),
            ("signature", Value::Bytes(response.signature)),
        ])
    }
}
