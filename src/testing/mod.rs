//! Testing utilities for ceremony code
//!
//! Available to unit tests and, through the `testing` feature, to
//! integration tests and downstream crates.
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built payloads, challenge options, and credentials
//! - [`mock`] - Scripted transport and credential provider
//! - [`assertions`] - Callback recorder for checking what fired
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cbor_ceremony::testing::{CallbackRecorder, MockCredentialProvider, MockTransport, TestFixtures};
//!
//! let transport = MockTransport::new()
//!     .respond("/api/auth/login/begin/", TestFixtures::authentication_options())
//!     .respond("/api/auth/login/", TestFixtures::ok_body());
//! let provider = MockCredentialProvider::new();
//! let recorder = CallbackRecorder::new();
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use assertions::CallbackRecorder;
pub use fixtures::TestFixtures;
pub use mock::{MockCredentialProvider, MockTransport};

/// Common test constants
pub mod constants {
    /// Default test user name
    pub const TEST_USERNAME: &str = "alice";

    /// Default test relying party
    pub const TEST_RP_ID: &str = "localhost";

    /// Default challenge bytes
    pub const TEST_CHALLENGE: &[u8] = b"test_challenge_32_bytes_long____";

    /// Default credential id bytes
    pub const TEST_CREDENTIAL_ID: &[u8] = b"test_credential_123";
}
