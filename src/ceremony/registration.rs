//! Registration ceremony
//!
//! Creates a new credential and sends its attestation to the server.

use async_trait::async_trait;
use ciborium::value::Value;

use super::errors::CredentialError;
use super::orchestrator::Ceremony;
use super::provider::CredentialProvider;
use super::types::{Attestation, Endpoints, FailureCode, FailureCodes, Payload};

/// Default registration begin-endpoint
pub const REGISTER_BEGIN_URL: &str = "/api/auth/register/begin/";

/// Default registration complete-endpoint
pub const REGISTER_COMPLETE_URL: &str = "/api/auth/register/";

/// Credential creation ceremony
#[derive(Debug, Clone, Copy, Default)]
pub struct Registration;

#[async_trait]
impl Ceremony for Registration {
    type Credential = Attestation;

    fn name(&self) -> &'static str {
        "registration"
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints {
            begin_url: REGISTER_BEGIN_URL.to_string(),
            complete_url: REGISTER_COMPLETE_URL.to_string(),
        }
    }

    fn failure_codes(&self) -> FailureCodes {
        FailureCodes {
            begin: FailureCode::RegisterFailBegin,
            credential: FailureCode::RegisterFailCredential,
            complete: FailureCode::RegisterFailComplete,
        }
    }

    async fn request_credential(
        &self,
        provider: &dyn CredentialProvider,
        options: Value,
    ) -> Result<Attestation, CredentialError> {
        provider.create(options).await
    }

    fn complete_payload(&self, payload: Payload, credential: Attestation) -> Payload {
        let response = credential.response;
        payload.merge([
            ("attestationObject", Value::Bytes(response.attestation_object)),
            ("clientDataJSON", Value::Bytes(response.client_data_json)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ceremony::types::AttestationResponse;

    #[test]
    fn test_complete_payload_adds_exactly_attestation_fields() {
        let payload = Payload::new().with("username", "alice").with("displayName", "Alice");
        let attestation = Attestation {
            id: "cred-1".to_string(),
            raw_id: vec![9, 9, 9],
            response: AttestationResponse {
                attestation_object: vec![0xa3, 0x01],
                client_data_json: b"{\"type\":\"webauthn.create\"}".to_vec(),
            },
        };

        let complete = Registration.complete_payload(payload, attestation);

        assert_eq!(
            complete.keys().collect::<Vec<_>>(),
            vec!["attestationObject", "clientDataJSON", "displayName", "username"]
        );
        assert_eq!(complete.get("attestationObject"), Some(&Value::Bytes(vec![0xa3, 0x01])));
        assert_eq!(
            complete.get("clientDataJSON"),
            Some(&Value::Bytes(b"{\"type\":\"webauthn.create\"}".to_vec()))
        );
        assert_eq!(complete.get("username"), Some(&Value::Text("alice".into())));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Registration.endpoints().begin_url, "/api/auth/register/begin/");
        assert_eq!(Registration.endpoints().complete_url, "/api/auth/register/");
        assert_eq!(Registration.failure_codes().begin, FailureCode::RegisterFailBegin);
        assert_eq!(Registration.failure_codes().complete, FailureCode::RegisterFailComplete);
    }
}
