//! Portal runtime configuration.
//!
//! # Responsibility
//! - Load settings from a TOML document with environment overrides.
//! - Reject configurations that cannot reach the action endpoint.
//!
//! # Invariants
//! - `validate()` passing implies a configured endpoint and non-zero timeout.

use crate::logging::{default_log_level, LogLevel};
use crate::store::domain_store::StoreOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder left in deployment templates before the endpoint is known.
pub const ENDPOINT_PLACEHOLDER: &str = "YOUR_DEPLOYED_WEB_APP_URL";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

pub const ENV_ENDPOINT_URL: &str = "COE_PORTAL_ENDPOINT_URL";
pub const ENV_FALLBACK_TOKEN: &str = "COE_PORTAL_FALLBACK_TOKEN";
pub const ENV_IDENTITY_API_KEY: &str = "COE_PORTAL_IDENTITY_API_KEY";
pub const ENV_LOG_LEVEL: &str = "COE_PORTAL_LOG_LEVEL";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    EndpointNotConfigured,
    InvalidTimeout,
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::EndpointNotConfigured => write!(
                f,
                "endpoint_url is not configured; set it in the config file or {ENV_ENDPOINT_URL}"
            ),
            Self::InvalidTimeout => write!(f, "request_timeout_ms must be greater than zero"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            sign_in_url: default_sign_in_url(),
            api_key: None,
        }
    }
}

/// Fixed credential pair checked before identity sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginGateConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub fallback_token: Option<String>,
    #[serde(default)]
    pub token_db_path: Option<PathBuf>,
    #[serde(default = "default_log_level_string")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub login_gate: Option<LoginGateConfig>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            fallback_token: None,
            token_db_path: None,
            log_level: default_log_level_string(),
            log_dir: None,
            identity: IdentityConfig::default(),
            login_gate: None,
        }
    }
}

impl PortalConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies `COE_PORTAL_*` overrides using `lookup` (normally
    /// `std::env::var(..).ok()`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = non_empty(lookup(ENV_ENDPOINT_URL)) {
            self.endpoint_url = value;
        }
        if let Some(value) = non_empty(lookup(ENV_FALLBACK_TOKEN)) {
            self.fallback_token = Some(value);
        }
        if let Some(value) = non_empty(lookup(ENV_IDENTITY_API_KEY)) {
            self.identity.api_key = Some(value);
        }
        if let Some(value) = non_empty(lookup(ENV_LOG_LEVEL)) {
            self.log_level = value;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let endpoint = self.endpoint_url.trim();
        if endpoint.is_empty() || endpoint == ENDPOINT_PLACEHOLDER {
            return Err(ConfigError::EndpointNotConfigured);
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        LogLevel::parse(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            fallback_token: self.fallback_token.clone(),
            ..StoreOptions::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_sign_in_url() -> String {
    DEFAULT_SIGN_IN_URL.to_string()
}

fn default_log_level_string() -> String {
    default_log_level().to_string()
}
