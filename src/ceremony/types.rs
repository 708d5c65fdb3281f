//! Ceremony data types
//!
//! Payloads are open maps the orchestrator never inspects; credentials are
//! the byte buffers the platform authenticator hands back.

use std::collections::BTreeMap;
use std::fmt;

use ciborium::value::Value;
use serde::Serialize;

use crate::codec::CodecError;

/// Caller-supplied identity context sent to the begin-endpoint
///
/// Keys are text; values are arbitrary CBOR values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    /// Create an empty payload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from any value serializing to a map with text keys
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the value cannot be serialized or is
    /// not a map with text keys.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        let value = Value::serialized(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Self::try_from(value)
    }

    /// Add or replace a field
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a field in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: incoming fields replace existing ones with the same key
    #[must_use]
    pub fn merge<K: Into<String>>(mut self, fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        for (key, value) in fields {
            self.0.insert(key.into(), value);
        }
        self
    }

    /// Convert into a CBOR map
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(
            self.0
                .into_iter()
                .map(|(key, value)| (Value::Text(key), value))
                .collect(),
        )
    }
}

impl TryFrom<Value> for Payload {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Map(entries) = value else {
            return Err(CodecError::Encode(
                "Payload must serialize to a map".to_string(),
            ));
        };

        entries
            .into_iter()
            .map(|(key, value)| match key {
                Value::Text(key) => Ok((key, value)),
                other => Err(CodecError::Encode(format!(
                    "Payload keys must be text, found {other:?}"
                ))),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        payload.into_value()
    }
}

/// Which phase of which ceremony failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    RegisterFailBegin,
    RegisterFailCredential,
    RegisterFailComplete,
    LoginFailBegin,
    LoginFailCredential,
    LoginFailComplete,
}

impl FailureCode {
    /// Stable identifier for logs and UIs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCode::RegisterFailBegin => "REGISTER_FAIL_BEGIN",
            FailureCode::RegisterFailCredential => "REGISTER_FAIL_CREDENTIAL",
            FailureCode::RegisterFailComplete => "REGISTER_FAIL_COMPLETE",
            FailureCode::LoginFailBegin => "LOGIN_FAIL_BEGIN",
            FailureCode::LoginFailCredential => "LOGIN_FAIL_CREDENTIAL",
            FailureCode::LoginFailComplete => "LOGIN_FAIL_COMPLETE",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure codes reported for each phase of one ceremony
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCodes {
    pub begin: FailureCode,
    pub credential: FailureCode,
    pub complete: FailureCode,
}

/// Begin/complete endpoint pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub begin_url: String,
    pub complete_url: String,
}

/// Credential created by the platform during registration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attestation {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AttestationResponse,
}

/// Authenticator response inside an [`Attestation`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttestationResponse {
    pub attestation_object: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

/// Assertion produced by the platform during authentication
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assertion {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AssertionResponse,
}

/// Authenticator response inside an [`Assertion`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertionResponse {
    pub authenticator_data: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Login<'a> {
        username: &'a str,
        remember: bool,
    }

    #[test]
    fn test_payload_from_struct() {
        let payload = Payload::from_serialize(&Login {
            username: "alice",
            remember: true,
        })
        .unwrap();

        assert_eq!(payload.get("username"), Some(&Value::Text("alice".into())));
        assert_eq!(payload.get("remember"), Some(&Value::Bool(true)));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_payload_rejects_non_map() {
        assert!(Payload::from_serialize(&"just a string").is_err());
        assert!(Payload::try_from(Value::Map(vec![(
            Value::Integer(1.into()),
            Value::Null
        )]))
        .is_err());
    }

    #[test]
    fn test_merge_is_shallow_and_overrides() {
        let payload = Payload::new()
            .with("username", "alice")
            .with("clientDataJSON", "stale");

        let merged = payload.merge([("clientDataJSON", Value::Bytes(vec![1, 2, 3]))]);

        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["clientDataJSON", "username"]);
        assert_eq!(merged.get("clientDataJSON"), Some(&Value::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn test_failure_code_names() {
        assert_eq!(FailureCode::RegisterFailBegin.to_string(), "REGISTER_FAIL_BEGIN");
        assert_eq!(FailureCode::LoginFailComplete.as_str(), "LOGIN_FAIL_COMPLETE");
    }
}
