//! Connection settings for a process engine session.
//!
//! Settings are read from `WORKBASKET_*` environment variables by the
//! binary, or built directly by library callers and tests. Lookups go through
//! a caller-supplied function so tests never mutate the process environment.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// REST root of the engine relative to `scheme://server:port/`.
pub const DEFAULT_BASE_PATH: &str = "peengine/P8BPMREST/p8/bpm/v1/";

/// Environment variable naming the engine host.
pub const ENV_SERVER: &str = "WORKBASKET_SERVER";
/// Environment variable naming the engine port.
pub const ENV_PORT: &str = "WORKBASKET_PORT";
/// Environment variable selecting `http` or `https`.
pub const ENV_SCHEME: &str = "WORKBASKET_SCHEME";
/// Environment variable overriding [`DEFAULT_BASE_PATH`].
pub const ENV_BASE_PATH: &str = "WORKBASKET_BASE_PATH";
/// Environment variable holding the login name.
pub const ENV_USER: &str = "WORKBASKET_USER";
/// Environment variable holding the password.
pub const ENV_PASSWORD: &str = "WORKBASKET_PASSWORD";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "WORKBASKET_TIMEOUT_SECS";

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DIRECTORY_LIMIT: u32 = 50;

/// Errors returned while building an [`EngineConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A credential is present but blank.
    #[error("setting {0} must not be empty")]
    EmptyCredential(&'static str),

    /// The port is not a valid TCP port number.
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// The timeout is not a positive number of seconds.
    #[error("invalid timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),

    /// The scheme is neither `http` nor `https`.
    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The composed base URL is not a usable REST root.
    #[error("invalid engine base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Offending URL text.
        value: String,
        /// Parser or validation message.
        reason: String,
    },
}

/// Settings for one engine session.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    base_url: Url,
    username: String,
    password: String,
    timeout: Duration,
    directory_limit: u32,
}

impl EngineConfig {
    /// Creates settings for `http://{server}:{port}/` plus the default REST
    /// root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the server name does not form a valid URL
    /// or a credential is blank.
    pub fn new(
        server: &str,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = compose_base_url(DEFAULT_SCHEME, server, port, DEFAULT_BASE_PATH)?;
        Self::with_credentials(base_url, username.into(), password.into())
    }

    /// Creates settings for an explicit REST root such as
    /// `https://pe.example.com:9443/peengine/P8BPMREST/p8/bpm/v1/`.
    ///
    /// A missing trailing slash is added so relative resource URIs resolve
    /// beneath the root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL cannot be parsed, uses another
    /// scheme than `http`/`https`, or a credential is blank.
    pub fn from_base_url(
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let parsed = parse_base_url(base_url)?;
        Self::with_credentials(parsed, username.into(), password.into())
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = lookup(ENV_SERVER).ok_or(ConfigError::Missing(ENV_SERVER))?;
        let raw_port = lookup(ENV_PORT).ok_or(ConfigError::Missing(ENV_PORT))?;
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw_port.clone()))?;
        let scheme = lookup(ENV_SCHEME).unwrap_or_else(|| DEFAULT_SCHEME.to_owned());
        let base_path = lookup(ENV_BASE_PATH).unwrap_or_else(|| DEFAULT_BASE_PATH.to_owned());
        let username = lookup(ENV_USER).ok_or(ConfigError::Missing(ENV_USER))?;
        let password = lookup(ENV_PASSWORD).ok_or(ConfigError::Missing(ENV_PASSWORD))?;

        let base_url = compose_base_url(&scheme, &server, port, &base_path)?;
        let mut config = Self::with_credentials(base_url, username, password)?;
        if let Some(raw_timeout) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw_timeout)?;
        }
        Ok(config)
    }

    fn with_credentials(
        base_url: Url,
        username: String,
        password: String,
    ) -> Result<Self, ConfigError> {
        if username.trim().is_empty() {
            return Err(ConfigError::EmptyCredential(ENV_USER));
        }
        if password.is_empty() {
            return Err(ConfigError::EmptyCredential(ENV_PASSWORD));
        }
        Ok(Self {
            base_url,
            username: username.trim().to_owned(),
            password,
            timeout: DEFAULT_TIMEOUT,
            directory_limit: DEFAULT_DIRECTORY_LIMIT,
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of participants a directory search returns.
    #[must_use]
    pub const fn with_directory_limit(mut self, limit: u32) -> Self {
        self.directory_limit = limit;
        self
    }

    /// Returns the REST root all resource URIs are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the directory search limit.
    #[must_use]
    pub const fn directory_limit(&self) -> u32 {
        self.directory_limit
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("directory_limit", &self.directory_limit)
            .finish()
    }
}

fn compose_base_url(
    scheme: &str,
    server: &str,
    port: u16,
    base_path: &str,
) -> Result<Url, ConfigError> {
    let normalized_scheme = scheme.trim().to_ascii_lowercase();
    if normalized_scheme != "http" && normalized_scheme != "https" {
        return Err(ConfigError::UnsupportedScheme(scheme.to_owned()));
    }
    let host = server.trim();
    if host.is_empty() {
        return Err(ConfigError::Missing(ENV_SERVER));
    }
    let path = base_path.trim().trim_start_matches('/');
    parse_base_url(&format!("{normalized_scheme}://{host}:{port}/{path}"))
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let mut parsed = Url::parse(value.trim()).map_err(|err| ConfigError::InvalidBaseUrl {
        value: value.to_owned(),
        reason: err.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_owned()));
    }
    if !parsed.path().ends_with('/') {
        let with_slash = format!("{}/", parsed.path());
        parsed.set_path(&with_slash);
    }
    Ok(parsed)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::InvalidTimeout(value.to_owned())),
    }
}
