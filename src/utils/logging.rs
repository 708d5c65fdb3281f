// Centralized logging for ceremony progress
use log::{debug, error, info, warn};
use reqwest::StatusCode;
use uuid::Uuid;

use crate::ceremony::{CeremonyError, FailureCode, Phase};
use crate::settings::LoggingSettings;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Initialize `env_logger` at the configured level
    ///
    /// `RUST_LOG` still wins when set. Repeated calls are ignored.
    pub fn init(settings: &LoggingSettings) {
        let env = env_logger::Env::default().default_filter_or(settings.level.as_str());
        if env_logger::Builder::from_env(env).try_init().is_err() {
            debug!("Logger already initialized, keeping existing configuration");
        }
    }

    /// Log the start of a ceremony
    pub fn log_ceremony_start(name: &str, id: &Uuid, begin_url: &str, complete_url: &str) {
        info!("🔐 Starting {name} ceremony {id} (begin: {begin_url}, complete: {complete_url})");
    }

    /// Log a phase transition
    pub fn log_phase(id: &Uuid, phase: Phase) {
        debug!("Ceremony {id} entering {phase} phase");
    }

    /// Log a successful ceremony
    pub fn log_ceremony_success(name: &str, id: &Uuid, status: StatusCode) {
        info!("✅ {name} ceremony {id} completed ({status})");
    }

    /// Log a failure about to be reported to the failure callback
    pub fn log_phase_failure(id: &Uuid, phase: Phase, code: FailureCode, err: &CeremonyError) {
        warn!("❌ Ceremony {id} failed in {phase} phase [{code}]: {err}");
    }

    /// Log a codec failure, which no callback is told about
    pub fn log_codec_failure(id: &Uuid, phase: Phase, err: &CeremonyError) {
        error!("Ceremony {id} aborted by codec failure in {phase} phase: {err}");
    }

    /// Log a failure nobody registered a handler for
    pub fn log_unhandled_failure(code: FailureCode, err: &CeremonyError) {
        match err.status() {
            Some(status) => error!("Ceremony failed [{code}] with HTTP {status}: {err}"),
            None => error!("Ceremony failed [{code}]: {err}"),
        }
    }

    /// Log where settings came from
    pub fn log_settings_source(source: &str) {
        info!("✓ Loaded ceremony settings from {source}");
    }
}
