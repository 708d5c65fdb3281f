//! Callback recording helpers
//!
//! `CallbackRecorder` hands out [`Callbacks`] that remember what fired, so a
//! test can assert the exactly-once contract after the ceremony resolves.

use std::sync::{Arc, Mutex};

use ciborium::value::Value;
use reqwest::StatusCode;

use crate::ceremony::{Callbacks, FailureCode};

#[derive(Debug, Default)]
struct Record {
    successes: Vec<Value>,
    failures: Vec<(FailureCode, Option<StatusCode>, String)>,
}

/// Records success and failure callback invocations
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    record: Arc<Mutex<Record>>,
}

impl CallbackRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks writing into this recorder
    #[must_use]
    pub fn callbacks(&self) -> Callbacks {
        let on_success = Arc::clone(&self.record);
        let on_failure = Arc::clone(&self.record);

        Callbacks::new(move |response| {
            if let Ok(mut record) = on_success.lock() {
                record.successes.push(response.body.clone());
            }
        })
        .on_failure(move |error, code| {
            if let Ok(mut record) = on_failure.lock() {
                record.failures.push((code, error.status(), error.message()));
            }
        })
    }

    /// Number of success callbacks
    #[must_use]
    pub fn successes(&self) -> usize {
        self.with_record(|record| record.successes.len())
    }

    /// Bodies received by success callbacks
    #[must_use]
    pub fn success_bodies(&self) -> Vec<Value> {
        self.with_record(|record| record.successes.clone())
    }

    /// Failure codes in the order they fired
    #[must_use]
    pub fn failures(&self) -> Vec<FailureCode> {
        self.with_record(|record| record.failures.iter().map(|(code, _, _)| *code).collect())
    }

    /// HTTP statuses carried by failures, in the order they fired
    #[must_use]
    pub fn failure_statuses(&self) -> Vec<Option<StatusCode>> {
        self.with_record(|record| record.failures.iter().map(|(_, status, _)| *status).collect())
    }

    /// Messages carried by failures, in the order they fired
    #[must_use]
    pub fn failure_messages(&self) -> Vec<String> {
        self.with_record(|record| {
            record
                .failures
                .iter()
                .map(|(_, _, message)| message.clone())
                .collect()
        })
    }

    fn with_record<T>(&self, read: impl FnOnce(&Record) -> T) -> T {
        match self.record.lock() {
            Ok(record) => read(&record),
            Err(poisoned) => read(&poisoned.into_inner()),
        }
    }
}
