//! Transport settings
//!
//! Declarative configuration of the HTTP client used by the ceremonies.

use serde::{Deserialize, Serialize};

use super::csrf::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
use crate::codec::CBOR_CONTENT_TYPE;

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportSettings {
    /// Base URL relative endpoint paths are resolved against
    pub base_url: String,
    /// Cookie the CSRF token is read from
    pub csrf_cookie_name: String,
    /// Header the CSRF token is echoed in
    pub csrf_header_name: String,
    /// Default request content type
    pub content_type: String,
    /// Keep a cookie jar and send cookies with every request
    pub with_credentials: bool,
    /// Whole-request timeout; `None` leaves timing to the server and platform
    pub timeout_seconds: Option<u64>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            csrf_cookie_name: CSRF_COOKIE_NAME.to_string(),
            csrf_header_name: CSRF_HEADER_NAME.to_string(),
            content_type: CBOR_CONTENT_TYPE.to_string(),
            with_credentials: true,
            timeout_seconds: None,
            user_agent: format!("cbor-ceremony/{}", crate::VERSION),
        }
    }
}
