//! HTTP transport for ceremony traffic
//!
//! The orchestrator only ever needs `post(url, payload)`; everything about
//! headers, cookies, and wire encoding lives behind the [`Transport`] trait.

mod csrf;
mod errors;
mod http;
mod interceptor;
mod message;
mod settings;

use std::sync::Arc;

use async_trait::async_trait;
use ciborium::value::Value;
use once_cell::sync::OnceCell;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub use csrf::{apply_csrf_header, csrf_token, find_cookie, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
pub use errors::TransportError;
pub use http::HttpTransport;
pub use interceptor::Interceptor;
pub use message::{Body, InboundResponse, OutboundRequest, ResponseType};
pub use settings::TransportSettings;

/// Successful response of a transport call
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Decoded body; raw bytes no interceptor decoded are kept as a byte string
    pub body: Value,
}

impl From<InboundResponse> for TransportResponse {
    fn from(response: InboundResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body.into_value(),
        }
    }
}

/// Carrier of ceremony requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a structured payload and return the decoded response
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be built or encoded
    /// - The server cannot be reached
    /// - The server answers with a non-success status
    /// - The response body cannot be decoded
    async fn post(&self, url: &str, payload: Value) -> Result<TransportResponse, TransportError>;
}

static SHARED_TRANSPORT: OnceCell<Arc<HttpTransport>> = OnceCell::new();

/// Process-wide transport built from default settings on first use
///
/// The instance is immutable once built. Callers that need other settings
/// build their own [`HttpTransport`] and pass it through the ceremony options.
///
/// # Errors
///
/// Returns an error if the default HTTP client cannot be built.
pub fn shared_transport() -> Result<Arc<dyn Transport>, TransportError> {
    let transport = SHARED_TRANSPORT
        .get_or_try_init(|| HttpTransport::new(TransportSettings::default()).map(Arc::new))?;
    Ok(Arc::clone(transport) as Arc<dyn Transport>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_transport_is_reused() {
        let first = shared_transport().unwrap();
        let second = shared_transport().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_body_collapse() {
        assert_eq!(Body::Empty.into_value(), Value::Null);
        assert_eq!(Body::Bytes(vec![1, 2]).into_value(), Value::Bytes(vec![1, 2]));
        assert_eq!(Body::Text("ok".into()).into_value(), Value::Text("ok".into()));
    }
}
