//! CBOR processing for ceremony traffic
//!
//! Thin wrappers around `ciborium` plus the content-type test that decides
//! whether a message belongs to the codec at all.

use super::errors::CodecError;
use super::CBOR_CONTENT_TYPE;
use ciborium::de::from_reader;
use ciborium::ser::into_writer;
use ciborium::value::Value;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

/// Encode a structured value into CBOR bytes
///
/// # Errors
///
/// Returns `CodecError::Encode` if the value cannot be written.
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    into_writer(value, &mut bytes).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decode the first CBOR item from `bytes`
///
/// Anything after the first complete item is ignored. An empty body decodes
/// to `null`.
///
/// # Errors
///
/// Returns `CodecError::Decode` if the leading bytes are not a valid item.
pub fn decode_first(bytes: &[u8]) -> Result<Value, CodecError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Check whether a content-type header value names the CBOR marker
///
/// Media type parameters and ASCII case are ignored.
#[must_use]
pub fn is_cbor_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(CBOR_CONTENT_TYPE))
}

/// Check whether a header map carries the CBOR content type
#[must_use]
pub fn is_cbor_message(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_cbor_content_type)
}
