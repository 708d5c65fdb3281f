//! `reqwest`-backed transport
//!
//! Every call is a POST carrying a structured payload. Request interceptors
//! run before the body is bound to the wire, response interceptors after a
//! successful body has been read.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ciborium::value::Value;
use log::debug;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use url::Url;

use super::csrf::apply_csrf_header;
use super::errors::TransportError;
use super::interceptor::Interceptor;
use super::message::{Body, InboundResponse, OutboundRequest, ResponseType};
use super::settings::TransportSettings;
use super::{Transport, TransportResponse};
use crate::codec::{is_cbor_message, CborBridge, CodecError};

/// HTTP transport with CSRF propagation and an interceptor chain
pub struct HttpTransport {
    client: Client,
    jar: Option<Arc<Jar>>,
    base_url: Url,
    settings: TransportSettings,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("settings", &self.settings)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport with the CBOR bridge as its only interceptor
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `base_url` is not an absolute URL
    /// - The underlying HTTP client cannot be built
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| TransportError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        HeaderValue::from_str(&settings.content_type).map_err(|_| {
            TransportError::Client(format!("Invalid content type '{}'", settings.content_type))
        })?;

        let mut builder = Client::builder().user_agent(settings.user_agent.clone());

        let jar = if settings.with_credentials {
            let jar = Arc::new(Jar::default());
            builder = builder.cookie_provider(Arc::clone(&jar));
            Some(jar)
        } else {
            None
        };

        if let Some(seconds) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            jar,
            base_url,
            settings,
            interceptors: vec![Arc::new(CborBridge::new())],
        })
    }

    /// Replace the interceptor chain
    #[must_use]
    pub fn with_interceptors(mut self, interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        self.interceptors = interceptors;
        self
    }

    /// Settings this transport was built from
    #[must_use]
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Cookie jar shared with the HTTP client, if credentials are enabled
    #[must_use]
    pub fn cookie_jar(&self) -> Option<&Arc<Jar>> {
        self.jar.as_ref()
    }

    /// Resolve an endpoint path against the base URL
    ///
    /// Absolute URLs are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidUrl` if the path cannot be joined.
    pub fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(url)
            .map_err(|e| TransportError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Build the outbound request for `payload` and run the request interceptors
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or an interceptor fails.
    pub async fn prepare(&self, url: &str, payload: Value) -> Result<OutboundRequest, TransportError> {
        let url = self.resolve_url(url)?;

        let mut headers = HeaderMap::new();
        if let Ok(content_type) = HeaderValue::from_str(&self.settings.content_type) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        if let Some(jar) = &self.jar {
            apply_csrf_header(
                &mut headers,
                jar,
                &url,
                &self.settings.csrf_cookie_name,
                &self.settings.csrf_header_name,
            );
        }

        let mut request = OutboundRequest {
            method: Method::POST,
            url,
            headers,
            body: Body::Value(payload),
            response_type: ResponseType::Json,
        };

        for interceptor in &self.interceptors {
            request = interceptor.on_request(request).await?;
        }

        Ok(request)
    }

    /// Bind an intercepted request to a `reqwest::Request`
    ///
    /// Structured bodies no interceptor claimed are sent as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized or the request is malformed.
    pub fn build_request(&self, request: OutboundRequest) -> Result<reqwest::Request, TransportError> {
        let builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        let builder = match request.body {
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes),
            Body::Text(text) => builder.body(text),
            Body::Value(value) => {
                let json = serde_json::to_vec(&value)
                    .map_err(|e| CodecError::Encode(format!("JSON body: {e}")))?;
                builder.body(json)
            }
        };

        builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))
    }

    /// JSON if it parses, else text if it is UTF-8, else the raw bytes
    fn parse_body(bytes: Vec<u8>) -> Body {
        if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
            return Body::Value(value);
        }
        match String::from_utf8(bytes) {
            Ok(text) => Body::Text(text),
            Err(e) => Body::Bytes(e.into_bytes()),
        }
    }

    /// Read a response body according to the expected response type
    ///
    /// CBOR-labelled bodies are always kept raw for the response interceptors.
    async fn read_response(
        response: reqwest::Response,
        response_type: ResponseType,
    ) -> Result<InboundResponse, TransportError> {
        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            debug!("{url} answered {status}, discarding body");
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(url.as_str(), &e))?;

        let body = if bytes.is_empty() {
            Body::Empty
        } else if response_type == ResponseType::Bytes || is_cbor_message(&headers) {
            Body::Bytes(bytes.to_vec())
        } else {
            Self::parse_body(bytes.to_vec())
        };

        Ok(InboundResponse {
            url,
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: Value) -> Result<TransportResponse, TransportError> {
        let request = self.prepare(url, payload).await?;
        let response_type = request.response_type;
        let target = request.url.to_string();

        debug!("POST {target}");
        let request = self.build_request(request)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportError::network(&target, &e))?;

        let mut inbound = Self::read_response(response, response_type).await?;
        for interceptor in &self.interceptors {
            inbound = interceptor.on_response(inbound)?;
        }

        Ok(TransportResponse::from(inbound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_first, CBOR_CONTENT_TYPE};
    use crate::transport::csrf::CSRF_HEADER_NAME;

    fn username(name: &str) -> Value {
        Value::Map(vec![(Value::Text("username".into()), Value::Text(name.into()))])
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(TransportSettings::default()).expect("default transport should build")
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        let transport = transport();
        let url = transport.resolve_url("/api/auth/register/begin/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/auth/register/begin/");

        let absolute = transport.resolve_url("https://auth.example.com/begin/").unwrap();
        assert_eq!(absolute.as_str(), "https://auth.example.com/begin/");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let settings = TransportSettings {
            base_url: "not a url".to_string(),
            ..TransportSettings::default()
        };
        assert!(matches!(
            HttpTransport::new(settings),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_default_request_is_cbor_post() {
        let transport = transport();
        let request = transport
            .prepare("/api/auth/login/begin/", username("alice"))
            .await
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.response_type, ResponseType::Bytes);
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), CBOR_CONTENT_TYPE);

        let built = transport.build_request(request).unwrap();
        let bytes = built.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(decode_first(bytes).unwrap(), username("alice"));
    }

    #[tokio::test]
    async fn test_csrf_cookie_is_echoed() {
        let transport = transport();
        let base = Url::parse("http://localhost:8000/").unwrap();
        transport
            .cookie_jar()
            .expect("credentials are enabled by default")
            .add_cookie_str("csrftoken=abc123; Path=/", &base);

        let request = transport
            .prepare("/api/auth/register/", username("alice"))
            .await
            .unwrap();

        assert_eq!(request.headers.get(CSRF_HEADER_NAME).unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_without_credentials_no_jar() {
        let settings = TransportSettings {
            with_credentials: false,
            ..TransportSettings::default()
        };
        let transport = HttpTransport::new(settings).unwrap();
        assert!(transport.cookie_jar().is_none());

        let request = transport.prepare("/x/", Value::Null).await.unwrap();
        assert!(request.headers.get(CSRF_HEADER_NAME).is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_sends_json() {
        let settings = TransportSettings {
            content_type: "application/json".to_string(),
            ..TransportSettings::default()
        };
        let transport = HttpTransport::new(settings).unwrap().with_interceptors(Vec::new());

        let request = transport.prepare("/x/", username("bob")).await.unwrap();
        assert_eq!(request.response_type, ResponseType::Json);

        let built = transport.build_request(request).unwrap();
        let bytes = built.body().and_then(reqwest::Body::as_bytes).unwrap();
        let json: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "bob" }));
    }

    #[test]
    fn test_unparsed_body_never_becomes_lossy_text() {
        assert_eq!(
            HttpTransport::parse_body(br#"{"status":"OK"}"#.to_vec()),
            Body::Value(Value::Map(vec![(
                Value::Text("status".into()),
                Value::Text("OK".into())
            )]))
        );
        assert_eq!(
            HttpTransport::parse_body(b"plain words".to_vec()),
            Body::Text("plain words".to_string())
        );
        assert_eq!(
            HttpTransport::parse_body(vec![0xa1, 0x61, 0x61, 0x41, 0xff]),
            Body::Bytes(vec![0xa1, 0x61, 0x61, 0x41, 0xff])
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let settings = TransportSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: Some(5),
            ..TransportSettings::default()
        };
        let transport = HttpTransport::new(settings).unwrap();

        let result = transport.post("/api/auth/login/begin/", username("bob")).await;
        let error = result.expect_err("nothing listens on port 1");
        assert!(matches!(error, TransportError::Network { .. }));
        assert!(error.status().is_none());
    }
}
