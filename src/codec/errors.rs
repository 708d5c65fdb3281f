//! Codec error types

use thiserror::Error;

/// Errors raised while converting between structured values and CBOR bytes
#[derive(Debug, Error)]
pub enum CodecError {
    /// A structured value could not be serialized
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The bytes on the wire are not valid CBOR
    #[error("Decoding error: {0}")]
    Decode(String),
}
