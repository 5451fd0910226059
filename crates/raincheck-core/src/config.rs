use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "raincheck";

/// Environment variable that overrides `weather_api.api_key`.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";
/// Environment variable that overrides `bark.device_key`.
pub const BARK_DEVICE_KEY_ENV: &str = "BARK_DEVICE_KEY";

/// Intervals shorter than this burn through the free provider quota.
const MIN_SENSIBLE_INTERVAL_MINUTES: u64 = 5;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider settings
    #[serde(default)]
    pub weather_api: WeatherApiConfig,

    /// Bark push notification settings
    #[serde(default)]
    pub bark: BarkConfig,

    /// Scheduling and transport settings
    #[serde(default)]
    pub app: AppSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    /// Provider API key (usually supplied via `WEATHER_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Place name to monitor, resolved to a provider location id
    #[serde(default = "default_location")]
    pub location: String,

    /// Bare host (`devapi.qweather.com`) or full base URL
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Provider response language; empty keeps the provider default
    #[serde(default)]
    pub lang: String,
}

fn default_location() -> String {
    "北京".to_string()
}

fn default_api_host() -> String {
    "devapi.qweather.com".to_string()
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            location: default_location(),
            api_host: default_api_host(),
            lang: String::new(),
        }
    }
}

impl WeatherApiConfig {
    /// Base URL for provider requests, without a trailing slash.
    ///
    /// A bare host is assumed to speak https.
    pub fn base_url(&self) -> String {
        let host = self.api_host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarkConfig {
    /// Target device key (usually supplied via `BARK_DEVICE_KEY`)
    #[serde(default)]
    pub device_key: String,

    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_sound")]
    pub sound: String,

    /// Bark interruption level (`active`, `timeSensitive`, `passive`)
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_category")]
    pub category: String,
}

fn default_server_url() -> String {
    "https://api.day.app".to_string()
}

fn default_sound() -> String {
    "alarm".to_string()
}

fn default_level() -> String {
    "timeSensitive".to_string()
}

fn default_category() -> String {
    "weather".to_string()
}

impl Default for BarkConfig {
    fn default() -> Self {
        Self {
            device_key: String::new(),
            server_url: default_server_url(),
            sound: default_sound(),
            level: default_level(),
            category: default_category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Minutes between check cycles
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,

    /// Attempts per request; transport faults only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Ceiling for a single request attempt
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log notification payloads and per-hour scan details
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_check_interval() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

fn default_verbose() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout(),
            verbose: default_verbose(),
        }
    }
}

impl AppSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Parse configuration from TOML text. Missing sections take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration from `path`, or from the first default location that exists.
    ///
    /// An explicit path that does not exist is an error. With no explicit path and no
    /// file on disk, defaults are used so an environment-only setup still works.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.display().to_string()).into());
                }
                Self::load_file(p)?
            }
            None => match Self::default_paths().into_iter().find(|p| p.exists()) {
                Some(p) => Self::load_file(&p)?,
                None => {
                    tracing::warn!("No config file found, using defaults and environment");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Validate, logging any warnings. Critical errors become [`ConfigError::Invalid`].
    pub fn ensure_valid(&self) -> Result<ValidationResult, ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(validation)
    }

    fn load_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading config from {}", path.display());

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// `./config.toml`, then `<config dir>/raincheck/config.toml`.
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Overlay secrets from the environment. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.weather_api.api_key = key;
        }
        if let Some(key) = lookup(BARK_DEVICE_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.bark.device_key = key;
        }
        if self.weather_api.location.trim().is_empty() {
            self.weather_api.location = default_location();
        }
        if self.weather_api.api_host.trim().is_empty() {
            self.weather_api.api_host = default_api_host();
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather_api.api_key.trim().is_empty() {
            result.add_error(
                "weather_api.api_key",
                format!("Weather API key not set; export {}", WEATHER_API_KEY_ENV),
            );
        }

        if self.bark.device_key.trim().is_empty() {
            result.add_error(
                "bark.device_key",
                format!("Bark device key not set; export {}", BARK_DEVICE_KEY_ENV),
            );
        }

        Self::validate_url(&self.bark.server_url, "bark.server_url", &mut result);
        Self::validate_url(
            &self.weather_api.base_url(),
            "weather_api.api_host",
            &mut result,
        );

        if self.app.max_retries == 0 {
            result.add_error("app.max_retries", "At least one attempt is required");
        }

        if self.app.request_timeout_secs == 0 {
            result.add_error("app.request_timeout_secs", "Request timeout must be positive");
        }

        if self.app.check_interval_minutes == 0 {
            result.add_error("app.check_interval_minutes", "Check interval must be positive");
        } else if self.app.check_interval_minutes < MIN_SENSIBLE_INTERVAL_MINUTES {
            result.add_warning(
                "app.check_interval_minutes",
                format!(
                    "Intervals under {} minutes may exhaust the provider quota",
                    MIN_SENSIBLE_INTERVAL_MINUTES
                ),
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn configured() -> Config {
        let mut config = Config::default();
        config.weather_api.api_key = "key".to_string();
        config.bark.device_key = "device".to_string();
        config
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.weather_api.location, "北京");
        assert_eq!(config.weather_api.api_host, "devapi.qweather.com");
        assert_eq!(config.bark.server_url, "https://api.day.app");
        assert_eq!(config.bark.sound, "alarm");
        assert_eq!(config.bark.level, "timeSensitive");
        assert_eq!(config.bark.category, "weather");
        assert_eq!(config.app.check_interval(), Duration::from_secs(3600));
        assert_eq!(config.app.max_retries, 3);
        assert_eq!(config.app.request_timeout(), Duration::from_secs(10));
        assert!(config.app.verbose);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [weather_api]
            location = "上海"

            [app]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.weather_api.location, "上海");
        assert_eq!(config.weather_api.api_host, "devapi.qweather.com");
        assert_eq!(config.app.max_retries, 5);
        assert_eq!(config.app.check_interval_minutes, 60);
        assert_eq!(config.bark.sound, "alarm");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[app\nmax_retries = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            WEATHER_API_KEY_ENV => Some("from-env".to_string()),
            BARK_DEVICE_KEY_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.weather_api.api_key, "from-env");
        // Blank values do not clobber.
        assert_eq!(config.bark.device_key, "");
    }

    #[test]
    fn test_env_overrides_restore_blank_location() {
        let mut config = Config::default();
        config.weather_api.location = String::new();
        config.weather_api.api_host = " ".to_string();
        config.apply_env_overrides(|_| None);
        assert_eq!(config.weather_api.location, "北京");
        assert_eq!(config.weather_api.api_host, "devapi.qweather.com");
    }

    #[test]
    fn test_base_url_handles_bare_host_and_full_url() {
        let mut api = WeatherApiConfig::default();
        assert_eq!(api.base_url(), "https://devapi.qweather.com");

        api.api_host = "http://127.0.0.1:8080/".to_string();
        assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_keys_are_errors() {
        let result = Config::default().validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather_api.api_key"));
        assert!(result.errors.iter().any(|e| e.field == "bark.device_key"));
    }

    #[test]
    fn test_configured_defaults_are_valid() {
        let result = configured().validate();
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_zero_retries_is_error() {
        let mut config = configured();
        config.app.max_retries = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "app.max_retries"));
    }

    #[test]
    fn test_short_interval_is_warning() {
        let mut config = configured();
        config.app.check_interval_minutes = 1;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "app.check_interval_minutes"));
    }

    #[test]
    fn test_huge_interval_saturates() {
        let mut config = configured();
        config.app.check_interval_minutes = u64::MAX;
        assert_eq!(config.app.check_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_invalid_bark_url_scheme() {
        let mut config = configured();
        config.bark.server_url = "ftp://api.day.app".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1: error1"));
        assert!(summary.contains("field2: error2"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[weather_api]\napi_key = \"file-key\"\nlocation = \"杭州\"\n\n[bark]\ndevice_key = \"d\""
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.weather_api.location, "杭州");
        assert!(!config.weather_api.api_key.is_empty());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_ensure_valid_rejects_missing_keys() {
        let err = Config::default().ensure_valid().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("bark.device_key")));
    }

    #[test]
    fn test_ensure_valid_passes_warnings_through() {
        let mut config = configured();
        config.app.check_interval_minutes = 1;
        let validation = config.ensure_valid().unwrap();
        assert_eq!(validation.warnings.len(), 1);
    }
}
