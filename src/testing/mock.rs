//! Mock objects and fake implementations for testing
//!
//! `MockTransport` answers from a per-URL script and records every call.
//! With the wire codec enabled, payloads and bodies travel through the real
//! [`CborBridge`] so tests see exactly what a CBOR server would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ciborium::value::Value;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use url::Url;

use super::fixtures::TestFixtures;
use crate::ceremony::{Assertion, Attestation, CredentialError, CredentialProvider};
use crate::codec::{decode_first, encode, CborBridge, CBOR_CONTENT_TYPE};
use crate::transport::{
    Body, InboundResponse, OutboundRequest, ResponseType, Transport, TransportError,
    TransportResponse,
};

#[derive(Debug, Clone)]
enum Scripted {
    Body(Value),
    RawCbor(Vec<u8>),
    Status(StatusCode),
}

fn cbor_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CBOR_CONTENT_TYPE));
    headers
}

fn mock_url(url: &str) -> Result<Url, TransportError> {
    Url::parse("http://mock.invalid/")
        .and_then(|base| base.join(url))
        .map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// Scripted transport recording every call
#[derive(Debug, Default)]
pub struct MockTransport {
    script: HashMap<String, Scripted>,
    wire_codec: bool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    /// Transport with an empty script; unscripted URLs answer 404
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a structured body
    #[must_use]
    pub fn respond(mut self, url: &str, body: Value) -> Self {
        self.script.insert(url.to_string(), Scripted::Body(body));
        self
    }

    /// Answer `url` with raw bytes labelled as CBOR
    #[must_use]
    pub fn respond_raw_cbor(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.script.insert(url.to_string(), Scripted::RawCbor(bytes));
        self
    }

    /// Answer `url` with an error status
    #[must_use]
    pub fn fail(mut self, url: &str, status: StatusCode) -> Self {
        self.script.insert(url.to_string(), Scripted::Status(status));
        self
    }

    /// Send payloads and bodies through the CBOR bridge
    #[must_use]
    pub fn with_wire_codec(mut self) -> Self {
        self.wire_codec = true;
        self
    }

    /// Every `(url, payload)` pair posted so far
    ///
    /// # Panics
    ///
    /// Panics if a previous caller panicked while holding the call log.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of posts made to `url`
    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|(called, _)| called == url).count()
    }

    /// Last payload posted to `url`
    #[must_use]
    pub fn last_payload(&self, url: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|(called, _)| called == url)
            .map(|(_, payload)| payload)
    }

    fn through_wire(url: &Url, payload: Value) -> Result<Value, TransportError> {
        let request = OutboundRequest {
            method: Method::POST,
            url: url.clone(),
            headers: cbor_headers(),
            body: Body::Value(payload),
            response_type: ResponseType::Json,
        };
        let request = CborBridge::new().encode_request(request)?;
        match request.body {
            Body::Bytes(bytes) => Ok(decode_first(&bytes)?),
            other => Ok(other.into_value()),
        }
    }

    fn respond_with(url: Url, body: Body) -> Result<TransportResponse, TransportError> {
        let response = InboundResponse {
            url,
            status: StatusCode::OK,
            headers: cbor_headers(),
            body,
        };
        let response = CborBridge::new().decode_response(response)?;
        Ok(TransportResponse::from(response))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, url: &str, payload: Value) -> Result<TransportResponse, TransportError> {
        let target = mock_url(url)?;
        let payload = if self.wire_codec {
            Self::through_wire(&target, payload)?
        } else {
            payload
        };

        self.calls
            .lock()
            .map_err(|_| TransportError::Client("call log poisoned".to_string()))?
            .push((url.to_string(), payload));

        match self.script.get(url).cloned() {
            None => Err(TransportError::Status {
                url: target.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
            Some(Scripted::Status(status)) => Err(TransportError::Status {
                url: target.to_string(),
                status,
            }),
            Some(Scripted::RawCbor(bytes)) => Self::respond_with(target, Body::Bytes(bytes)),
            Some(Scripted::Body(value)) if self.wire_codec => {
                Self::respond_with(target, Body::Bytes(encode(&value)?))
            }
            Some(Scripted::Body(value)) => Self::respond_with(target, Body::Value(value)),
        }
    }
}

/// Credential provider returning fixtures or a scripted rejection
#[derive(Debug)]
pub struct MockCredentialProvider {
    attestation: Attestation,
    assertion: Assertion,
    rejection: Option<CredentialError>,
    create_calls: AtomicUsize,
    get_calls: AtomicUsize,
    last_options: Mutex<Option<Value>>,
}

impl Default for MockCredentialProvider {
    fn default() -> Self {
        Self {
            attestation: TestFixtures::attestation(),
            assertion: TestFixtures::assertion(),
            rejection: None,
            create_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }
}

impl MockCredentialProvider {
    /// Provider answering with the fixture attestation and assertion
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attestation(mut self, attestation: Attestation) -> Self {
        self.attestation = attestation;
        self
    }

    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertion = assertion;
        self
    }

    /// Reject every request with `error`
    #[must_use]
    pub fn reject_with(mut self, error: CredentialError) -> Self {
        self.rejection = Some(error);
        self
    }

    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent request
    ///
    /// # Panics
    ///
    /// Panics if a previous caller panicked while holding the options.
    #[must_use]
    pub fn last_options(&self) -> Option<Value> {
        self.last_options.lock().expect("options poisoned").clone()
    }

    fn record(&self, options: Value) -> Result<(), CredentialError> {
        if let Ok(mut last) = self.last_options.lock() {
            *last = Some(options);
        }
        match &self.rejection {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn create(&self, options: Value) -> Result<Attestation, CredentialError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.record(options)?;
        Ok(self.attestation.clone())
    }

    async fn get(&self, options: Value) -> Result<Assertion, CredentialError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.record(options)?;
        Ok(self.assertion.clone())
    }
}
