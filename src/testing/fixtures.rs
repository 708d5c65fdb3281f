//! Test fixtures providing pre-built ceremony data
//!
//! Challenge options follow the shape python-fido2 style servers send:
//! a `publicKey` map with byte-string challenges and ids.

use ciborium::value::Value;

use super::constants::{TEST_CHALLENGE, TEST_CREDENTIAL_ID, TEST_RP_ID};
use crate::ceremony::{Assertion, AssertionResponse, Attestation, AttestationResponse, Payload};

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(entries.into_iter().map(|(k, v)| (text(k), v)).collect())
}

/// Central fixture provider for ceremony test data
pub struct TestFixtures;

impl TestFixtures {
    /// Payload carrying only a username
    #[must_use]
    pub fn payload(username: &str) -> Payload {
        Payload::new().with("username", username)
    }

    /// Registration challenge options as a begin-endpoint returns them
    #[must_use]
    pub fn registration_options() -> Value {
        map(vec![(
            "publicKey",
            map(vec![
                ("challenge", Value::Bytes(TEST_CHALLENGE.to_vec())),
                ("rp", map(vec![("id", text(TEST_RP_ID)), ("name", text("Test RP"))])),
                (
                    "user",
                    map(vec![
                        ("id", Value::Bytes(b"user-1".to_vec())),
                        ("name", text("alice")),
                        ("displayName", text("Alice")),
                    ]),
                ),
                (
                    "pubKeyCredParams",
                    Value::Array(vec![map(vec![
                        ("type", text("public-key")),
                        ("alg", Value::Integer((-7).into())),
                    ])]),
                ),
                ("timeout", Value::Integer(60_000.into())),
            ]),
        )])
    }

    /// Authentication challenge options as a begin-endpoint returns them
    #[must_use]
    pub fn authentication_options() -> Value {
        map(vec![(
            "publicKey",
            map(vec![
                ("challenge", Value::Bytes(TEST_CHALLENGE.to_vec())),
                ("rpId", text(TEST_RP_ID)),
                (
                    "allowCredentials",
                    Value::Array(vec![map(vec![
                        ("type", text("public-key")),
                        ("id", Value::Bytes(TEST_CREDENTIAL_ID.to_vec())),
                    ])]),
                ),
                ("userVerification", text("preferred")),
            ]),
        )])
    }

    /// Attestation a platform would return for [`TestFixtures::registration_options`]
    #[must_use]
    pub fn attestation() -> Attestation {
        Attestation {
            id: "dGVzdF9jcmVkZW50aWFsXzEyMw".to_string(),
            raw_id: TEST_CREDENTIAL_ID.to_vec(),
            response: AttestationResponse {
                attestation_object: vec![0xa3, 0x63, 0x66, 0x6d, 0x74, 0x64, 0x6e, 0x6f, 0x6e, 0x65],
                client_data_json: br#"{"type":"webauthn.create","origin":"http://localhost:8000"}"#
                    .to_vec(),
            },
        }
    }

    /// Assertion a platform would return for [`TestFixtures::authentication_options`]
    #[must_use]
    pub fn assertion() -> Assertion {
        Assertion {
            id: "dGVzdF9jcmVkZW50aWFsXzEyMw".to_string(),
            raw_id: TEST_CREDENTIAL_ID.to_vec(),
            response: AssertionResponse {
                authenticator_data: [vec![0x49; 32], vec![0x05, 0, 0, 0, 1]].concat(),
                client_data_json: br#"{"type":"webauthn.get","origin":"http://localhost:8000"}"#
                    .to_vec(),
                signature: vec![0x30, 0x44, 0x02, 0x20],
                user_handle: Some(b"user-1".to_vec()),
            },
        }
    }

    /// Complete-endpoint success body
    #[must_use]
    pub fn ok_body() -> Value {
        map(vec![("status", text("OK"))])
    }
}
