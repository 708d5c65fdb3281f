//! Request and response objects seen by interceptors

use ciborium::value::Value;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

/// Body of a request or response as it moves through the interceptor chain
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No body
    Empty,
    /// Structured value, not yet bound to a wire format
    Value(Value),
    /// Raw wire bytes
    Bytes(Vec<u8>),
    /// Text that could not be parsed as a structured value
    Text(String),
}

impl Body {
    /// Collapse the body into a structured value
    ///
    /// Raw bytes become a CBOR byte string and text becomes a text value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Value(value) => value,
            Body::Bytes(bytes) => Value::Bytes(bytes),
            Body::Text(text) => Value::Text(text),
        }
    }
}

/// How the transport should read a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Parse as JSON, falling back to text
    #[default]
    Json,
    /// Keep the raw bytes for a response interceptor to decode
    Bytes,
}

/// Outbound request handed to request interceptors
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
    pub response_type: ResponseType,
}

/// Inbound response handed to response interceptors
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}
