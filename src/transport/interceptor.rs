//! Interceptor seam of the transport
//!
//! Interceptors see every request right before it is serialized for the wire
//! and every successful response right after its body has been read. They
//! take the message by value and hand it back, possibly transformed.

use async_trait::async_trait;

use super::message::{InboundResponse, OutboundRequest};
use crate::codec::CodecError;

/// Request/response transform installed on a transport
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Transform an outbound request
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be converted for the wire.
    async fn on_request(&self, request: OutboundRequest) -> Result<OutboundRequest, CodecError> {
        Ok(request)
    }

    /// Transform an inbound response
    ///
    /// # Errors
    ///
    /// Returns an error if the body read from the wire cannot be decoded.
    fn on_response(&self, response: InboundResponse) -> Result<InboundResponse, CodecError> {
        Ok(response)
    }
}
