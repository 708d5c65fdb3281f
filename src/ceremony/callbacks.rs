//! Success and failure callbacks
//!
//! Both callbacks are `FnOnce` and consumed together, so at most one of them
//! can ever run for an invocation.

use super::errors::CeremonyError;
use super::types::FailureCode;
use crate::transport::TransportResponse;
use crate::utils::logging::LoggingHelper;

pub type SuccessCallback = Box<dyn FnOnce(&TransportResponse) + Send>;
pub type FailureCallback = Box<dyn FnOnce(&CeremonyError, FailureCode) + Send>;

/// Callbacks dispatched at the end of a ceremony
pub struct Callbacks {
    on_success: SuccessCallback,
    on_failure: FailureCallback,
}

impl Callbacks {
    /// Callbacks with `on_success` and the logging failure handler
    pub fn new(on_success: impl FnOnce(&TransportResponse) + Send + 'static) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(log_failure),
        }
    }

    /// Replace the failure handler
    #[must_use]
    pub fn on_failure(
        mut self,
        on_failure: impl FnOnce(&CeremonyError, FailureCode) + Send + 'static,
    ) -> Self {
        self.on_failure = Box::new(on_failure);
        self
    }

    pub(crate) fn succeed(self, response: &TransportResponse) {
        (self.on_success)(response);
    }

    pub(crate) fn fail(self, error: &CeremonyError, code: FailureCode) {
        (self.on_failure)(error, code);
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

/// Default failure handler: log and do nothing else
pub fn log_failure(error: &CeremonyError, code: FailureCode) {
    LoggingHelper::log_unhandled_failure(code, error);
}
