//! CBOR bridge interceptor
//!
//! Encodes structured request bodies and decodes raw response bodies when,
//! and only when, the message is labelled `application/cbor`.

use async_trait::async_trait;
use log::debug;

use super::cbor::{decode_first, encode, is_cbor_message};
use super::errors::CodecError;
use crate::transport::{Body, InboundResponse, Interceptor, OutboundRequest, ResponseType};

/// Interceptor translating between structured bodies and CBOR bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct CborBridge;

impl CborBridge {
    /// Create the bridge
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encode the request body if the request is marked as CBOR
    ///
    /// The expected response format is switched to raw bytes so the matching
    /// response can be decoded by [`CborBridge::decode_response`].
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the body cannot be serialized.
    pub fn encode_request(&self, mut request: OutboundRequest) -> Result<OutboundRequest, CodecError> {
        if !is_cbor_message(&request.headers) {
            return Ok(request);
        }

        request.body = match request.body {
            Body::Value(value) => Body::Bytes(encode(&value)?),
            Body::Text(text) => Body::Bytes(encode(&ciborium::value::Value::Text(text))?),
            other => other,
        };
        request.response_type = ResponseType::Bytes;

        debug!("CBOR-encoded request body for {}", request.url);
        Ok(request)
    }

    /// Decode the response body if the response is marked as CBOR
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` if the body is not valid CBOR.
    pub fn decode_response(&self, mut response: InboundResponse) -> Result<InboundResponse, CodecError> {
        if !is_cbor_message(&response.headers) {
            return Ok(response);
        }

        response.body = match response.body {
            Body::Bytes(bytes) => Body::Value(decode_first(&bytes)?),
            Body::Empty => Body::Value(ciborium::value::Value::Null),
            other => other,
        };

        debug!("Decoded CBOR response body from {}", response.url);
        Ok(response)
    }
}

#[async_trait]
impl Interceptor for CborBridge {
    async fn on_request(&self, request: OutboundRequest) -> Result<OutboundRequest, CodecError> {
        self.encode_request(request)
    }

    fn on_response(&self, response: InboundResponse) -> Result<InboundResponse, CodecError> {
        self.decode_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CBOR_CONTENT_TYPE;
    use ciborium::value::Value;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use reqwest::{Method, StatusCode};
    use url::Url;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    fn request(content_type: &'static str, body: Body) -> OutboundRequest {
        OutboundRequest {
            method: Method::POST,
            url: Url::parse("http://localhost:8000/api/auth/login/begin/").unwrap(),
            headers: headers_with(content_type),
            body,
            response_type: ResponseType::Json,
        }
    }

    fn response(content_type: &'static str, body: Body) -> InboundResponse {
        InboundResponse {
            url: Url::parse("http://localhost:8000/api/auth/login/begin/").unwrap(),
            status: StatusCode::OK,
            headers: headers_with(content_type),
            body,
        }
    }

    fn username(name: &str) -> Value {
        Value::Map(vec![(Value::Text("username".into()), Value::Text(name.into()))])
    }

    #[test]
    fn test_cbor_request_is_encoded() {
        let bridge = CborBridge::new();
        let encoded = bridge
            .encode_request(request(CBOR_CONTENT_TYPE, Body::Value(username("alice"))))
            .unwrap();

        assert_eq!(encoded.response_type, ResponseType::Bytes);
        let Body::Bytes(bytes) = encoded.body else {
            panic!("expected a byte body, got {:?}", encoded.body);
        };
        assert_eq!(crate::codec::decode_first(&bytes).unwrap(), username("alice"));
    }

    #[test]
    fn test_non_cbor_request_passes_through() {
        let bridge = CborBridge::new();
        let original = request("application/json", Body::Value(username("alice")));
        let passed = bridge.encode_request(original.clone()).unwrap();

        assert_eq!(passed.body, original.body);
        assert_eq!(passed.response_type, original.response_type);
        assert_eq!(passed.headers, original.headers);
        assert_eq!(passed.url, original.url);
        assert_eq!(passed.method, original.method);
    }

    #[test]
    fn test_cbor_response_is_decoded() {
        let bridge = CborBridge::new();
        let bytes = crate::codec::encode(&username("bob")).unwrap();
        let decoded = bridge
            .decode_response(response(CBOR_CONTENT_TYPE, Body::Bytes(bytes)))
            .unwrap();

        assert_eq!(decoded.body, Body::Value(username("bob")));
    }

    #[test]
    fn test_non_cbor_response_passes_through() {
        let bridge = CborBridge::new();
        let original = response("text/plain", Body::Bytes(vec![0xa1, 0x00]));
        let passed = bridge.decode_response(original.clone()).unwrap();

        assert_eq!(passed.body, original.body);
        assert_eq!(passed.status, original.status);
        assert_eq!(passed.headers, original.headers);
    }

    #[test]
    fn test_malformed_response_surfaces_decode_error() {
        let bridge = CborBridge::new();
        let result = bridge.decode_response(response(CBOR_CONTENT_TYPE, Body::Bytes(vec![0xff, 0xff])));

        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[tokio::test]
    async fn test_round_trip_through_interceptor_trait() {
        let bridge = CborBridge::new();
        let value = username("carol");

        let outbound = bridge
            .on_request(request(CBOR_CONTENT_TYPE, Body::Value(value.clone())))
            .await
            .unwrap();
        let inbound = bridge
            .on_response(response(CBOR_CONTENT_TYPE, outbound.body))
            .unwrap();

        assert_eq!(inbound.body.into_value(), value);
    }
}
