use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ceremony::{
    CeremonyOptions, LOGIN_BEGIN_URL, LOGIN_COMPLETE_URL, REGISTER_BEGIN_URL,
    REGISTER_COMPLETE_URL,
};
use crate::transport::{HttpTransport, TransportError, TransportSettings};
use crate::utils::logging::LoggingHelper;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CeremonySettings {
    pub transport: TransportSettings,
    pub registration: EndpointSettings,
    pub login: EndpointSettings,
    pub logging: LoggingSettings,
}

/// Begin/complete endpoint pair of one ceremony
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointSettings {
    pub begin_url: String,
    pub complete_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl EndpointSettings {
    fn registration() -> Self {
        Self {
            begin_url: REGISTER_BEGIN_URL.to_string(),
            complete_url: REGISTER_COMPLETE_URL.to_string(),
        }
    }

    fn login() -> Self {
        Self {
            begin_url: LOGIN_BEGIN_URL.to_string(),
            complete_url: LOGIN_COMPLETE_URL.to_string(),
        }
    }

    /// Ceremony options pointing at these endpoints
    #[must_use]
    pub fn options(&self) -> CeremonyOptions {
        CeremonyOptions::new()
            .begin_url(self.begin_url.clone())
            .complete_url(self.complete_url.clone())
    }
}

impl Default for CeremonySettings {
    fn default() -> Self {
        Self {
            transport: TransportSettings::default(),
            registration: EndpointSettings::registration(),
            login: EndpointSettings::login(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CeremonySettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file cannot be read
    /// - TOML parsing fails
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_file();

        let (mut settings, sources) = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        LoggingHelper::init(&settings.logging);
        for source in &sources {
            LoggingHelper::log_settings_source(source);
        }
        Ok(settings)
    }

    /// Load settings from a single TOML file, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut settings = Self::read_settings_file(path.as_ref())?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `CEREMONY_SETTINGS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// Returns the settings and the files they were read from.
    fn load_base_settings() -> anyhow::Result<(Self, Vec<String>)> {
        let mut settings = Self::default();
        let mut sources = Vec::new();

        let default_config_path = Path::new("Settings.toml");
        if default_config_path.exists() {
            settings = Self::read_settings_file(default_config_path)?;
            sources.push(default_config_path.display().to_string());
        }

        if let Ok(settings_dir) = std::env::var("CEREMONY_SETTINGS_DIR") {
            let dir_path = Path::new(&settings_dir).join("Settings.toml");
            if dir_path.exists() {
                settings = Self::read_settings_file(&dir_path)?;
                sources.push(dir_path.display().to_string());
            } else {
                println!(
                    "ℹ CEREMONY_SETTINGS_DIR set but no Settings.toml found at: {}",
                    dir_path.display()
                );
            }
        }

        Ok((settings, sources))
    }

    fn read_settings_file(path: &Path) -> anyhow::Result<Self> {
        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        basic_toml::from_str(&toml_content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_transport_env_overrides(&mut settings.transport);
        Self::apply_endpoint_env_overrides(
            &mut settings.registration,
            "REGISTER_BEGIN_URL",
            "REGISTER_COMPLETE_URL",
        );
        Self::apply_endpoint_env_overrides(
            &mut settings.login,
            "LOGIN_BEGIN_URL",
            "LOGIN_COMPLETE_URL",
        );
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for transport settings
    pub fn apply_transport_env_overrides(transport: &mut TransportSettings) {
        if let Ok(base_url) = std::env::var("CEREMONY_BASE_URL") {
            transport.base_url = base_url;
        }
        if let Ok(cookie) = std::env::var("CEREMONY_CSRF_COOKIE") {
            transport.csrf_cookie_name = cookie;
        }
        if let Ok(header) = std::env::var("CEREMONY_CSRF_HEADER") {
            transport.csrf_header_name = header;
        }
        if let Ok(timeout_str) = std::env::var("CEREMONY_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                transport.timeout_seconds = Some(timeout);
            }
        }
        if let Ok(credentials_str) = std::env::var("CEREMONY_WITH_CREDENTIALS") {
            if let Ok(with_credentials) = credentials_str.parse::<bool>() {
                transport.with_credentials = with_credentials;
            }
        }
    }

    /// Apply environment overrides for one ceremony's endpoints
    pub fn apply_endpoint_env_overrides(
        endpoints: &mut EndpointSettings,
        begin_var: &str,
        complete_var: &str,
    ) {
        if let Ok(begin_url) = std::env::var(begin_var) {
            endpoints.begin_url = begin_url;
        }
        if let Ok(complete_url) = std::env::var(complete_var) {
            endpoints.complete_url = complete_url;
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    #[must_use]
    pub fn registration_options(&self) -> CeremonyOptions {
        self.registration.options()
    }

    #[must_use]
    pub fn login_options(&self) -> CeremonyOptions {
        self.login.options()
    }

    /// Build an HTTP transport from the transport section
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn build_transport(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::new(self.transport.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: &[&str] = &[
        "CEREMONY_SETTINGS_DIR",
        "CEREMONY_BASE_URL",
        "CEREMONY_CSRF_COOKIE",
        "CEREMONY_CSRF_HEADER",
        "CEREMONY_TIMEOUT_SECONDS",
        "CEREMONY_WITH_CREDENTIALS",
        "REGISTER_BEGIN_URL",
        "REGISTER_COMPLETE_URL",
        "LOGIN_BEGIN_URL",
        "LOGIN_COMPLETE_URL",
    ];

    fn clean_env_vars() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_match_ceremony_endpoints() {
        let settings = CeremonySettings::default();
        assert_eq!(settings.registration.begin_url, "/api/auth/register/begin/");
        assert_eq!(settings.registration.complete_url, "/api/auth/register/");
        assert_eq!(settings.login.begin_url, "/api/auth/login/begin/");
        assert_eq!(settings.login.complete_url, "/api/auth/login/");
        assert_eq!(settings.logging.level, "info");
        assert!(settings.transport.with_credentials);
    }

    #[test]
    fn test_options_carry_endpoint_urls() {
        let settings = CeremonySettings::default();
        let options = settings.login_options();
        assert_eq!(options.begin_url.as_deref(), Some(LOGIN_BEGIN_URL));
        assert_eq!(options.complete_url.as_deref(), Some(LOGIN_COMPLETE_URL));
        assert!(options.transport.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: CeremonySettings = basic_toml::from_str(
            r#"
            [transport]
            base_url = "https://example.com"
            "#,
        )
        .unwrap();

        assert_eq!(settings.transport.base_url, "https://example.com");
        assert_eq!(settings.transport.csrf_header_name, "X-CSRFToken");
        assert_eq!(settings.registration, EndpointSettings::registration());
    }

    #[test]
    #[serial]
    fn test_transport_env_overrides() {
        clean_env_vars();
        std::env::set_var("CEREMONY_BASE_URL", "https://rp.example.com");
        std::env::set_var("CEREMONY_TIMEOUT_SECONDS", "15");
        std::env::set_var("CEREMONY_WITH_CREDENTIALS", "false");
        std::env::set_var("CEREMONY_CSRF_HEADER", "X-XSRF-TOKEN");

        let mut transport = TransportSettings::default();
        CeremonySettings::apply_transport_env_overrides(&mut transport);

        assert_eq!(transport.base_url, "https://rp.example.com");
        assert_eq!(transport.timeout_seconds, Some(15));
        assert!(!transport.with_credentials);
        assert_eq!(transport.csrf_header_name, "X-XSRF-TOKEN");
        assert_eq!(transport.csrf_cookie_name, "csrftoken");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_override_is_ignored() {
        clean_env_vars();
        std::env::set_var("CEREMONY_TIMEOUT_SECONDS", "soon");

        let mut transport = TransportSettings::default();
        CeremonySettings::apply_transport_env_overrides(&mut transport);
        assert_eq!(transport.timeout_seconds, None);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_endpoint_env_overrides() {
        clean_env_vars();
        std::env::set_var("LOGIN_BEGIN_URL", "/auth/login/start/");

        let mut settings = CeremonySettings::default();
        CeremonySettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.login.begin_url, "/auth/login/start/");
        assert_eq!(settings.login.complete_url, LOGIN_COMPLETE_URL);
        assert_eq!(settings.registration, EndpointSettings::registration());

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_settings_dir_precedence() {
        clean_env_vars();
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("Settings.toml")).unwrap();
        writeln!(
            file,
            "[registration]\nbegin_url = \"/dir/begin/\"\ncomplete_url = \"/dir/complete/\""
        )
        .unwrap();
        std::env::set_var("CEREMONY_SETTINGS_DIR", dir.path());
        std::env::set_var("REGISTER_COMPLETE_URL", "/env/complete/");

        let settings = CeremonySettings::load().unwrap();

        assert_eq!(settings.registration.begin_url, "/dir/begin/");
        assert_eq!(settings.registration.complete_url, "/env/complete/");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_load_from_path_rejects_malformed_toml() {
        clean_env_vars();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transport\nbase_url = ").unwrap();

        let error = CeremonySettings::load_from_path(file.path()).unwrap_err();
        assert!(error.to_string().contains("failed to parse settings file"));
    }

    #[test]
    fn test_build_transport_from_settings() {
        let settings = CeremonySettings::default();
        let transport = settings.build_transport().unwrap();
        assert_eq!(transport.settings().base_url, "http://localhost:8000");
    }
}
