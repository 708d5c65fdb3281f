#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

//! Client-side WebAuthn ceremonies against CBOR-speaking "begin"/"complete"
//! endpoint pairs.
//!
//! The crate is layered leaf-first: the [`codec`] bridge turns structured
//! bodies into CBOR at the wire boundary, the [`transport`] carries them over
//! HTTP with CSRF propagation, and the [`ceremony`] orchestrator drives the
//! begin → credential → complete exchange.

/// Version of the cbor-ceremony library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ceremony;
pub mod codec;
pub mod settings;
pub mod transport;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use ceremony::{
    login_ceremony, register_ceremony, Assertion, Attestation, Authentication, Callbacks,
    Ceremony, CeremonyError, CeremonyOptions, CredentialError, CredentialProvider, FailureCode,
    Payload, Registration,
};
pub use codec::{CborBridge, CodecError, CBOR_CONTENT_TYPE};
pub use settings::CeremonySettings;
pub use transport::{shared_transport, HttpTransport, Transport, TransportError, TransportResponse};
