//! Process configuration, read once from the environment at start-up.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "SITEGEN_API_KEY";
/// Fallback environment variable for the API credential.
pub const API_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";
const MODEL_ENV: &str = "SITEGEN_MODEL";
const API_BASE_ENV: &str = "SITEGEN_API_BASE";
const TEMPERATURE_ENV: &str = "SITEGEN_TEMPERATURE";
const TIMEOUT_ENV: &str = "SITEGEN_TIMEOUT_SECS";
const PORT_ENV: &str = "SITEGEN_PORT";
const STATIC_DIR_ENV: &str = "SITEGEN_STATIC_DIR";
const SESSION_TTL_ENV: &str = "SITEGEN_SESSION_TTL_SECS";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default generation service endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default idle lifetime of a session, in seconds.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No credential in either environment variable.
    #[error("missing API key: set {API_KEY_ENV} or {API_KEY_FALLBACK_ENV}")]
    MissingApiKey,
    /// The service base URL does not parse.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    /// A numeric variable does not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
    },
}

/// Configuration for the generation service and the HTTP host.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteGenConfig {
    /// API credential for the generation service.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Base URL of the generation service.
    pub api_base: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Whole-request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    /// HTTP listen port.
    pub port: u16,
    /// Directory the builder client is served from.
    pub static_dir: PathBuf,
    /// Idle time after which an open session is dropped.
    #[serde(with = "duration_serde")]
    pub session_ttl: Duration,
}

impl Default for SiteGenConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl SiteGenConfig {
    /// Create a config with default settings and no credential.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if no API key is set or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if no API key is set or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_ENV)
            .or_else(|| get(API_KEY_FALLBACK_ENV))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new().with_api_key(api_key);

        if let Some(model) = get(MODEL_ENV) {
            config.model = model;
        }
        if let Some(base) = get(API_BASE_ENV) {
            config.api_base = base;
        }
        if let Some(raw) = get(TEMPERATURE_ENV) {
            config.temperature = parse_value(TEMPERATURE_ENV, &raw)?;
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            config.request_timeout = Duration::from_secs(parse_value(TIMEOUT_ENV, &raw)?);
        }
        if let Some(raw) = get(PORT_ENV) {
            config.port = parse_value(PORT_ENV, &raw)?;
        }
        if let Some(dir) = get(STATIC_DIR_ENV) {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(SESSION_TTL_ENV) {
            config.session_ttl = Duration::from_secs(parse_value(SESSION_TTL_ENV, &raw)?);
        }

        config.base_url()?;
        Ok(config)
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the service base URL.
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Set how long an untouched session stays open.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Parsed base URL of the generation service.
    ///
    /// # Errors
    /// Returns an error if `api_base` is not a valid URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.api_base)?)
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
