//! Binary codec bridge
//!
//! Request/response interceptors that switch bodies between structured
//! values and CBOR bytes whenever the content type is `application/cbor`.
//! All other traffic passes through untouched.

mod bridge;
mod cbor;
mod errors;

pub use bridge::CborBridge;
pub use cbor::{decode_first, encode, is_cbor_content_type, is_cbor_message};
pub use errors::CodecError;

/// Content type marking a body for the binary codec
pub const CBOR_CONTENT_TYPE: &str = "application/cbor";
