//! Client configuration parsed from environment variables.
//!
//! The client-identification headers sent alongside `Authorization` come
//! from here rather than from literals in the request pipeline.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const SESSION_DIR: &str = "sarathi";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    MissingVar { var: &'static str },
    #[error("env var {var} must not be empty")]
    EmptyVar { var: &'static str },
}

/// Static client-identification header values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub api_key: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_file: PathBuf,
    pub identity: ClientIdentity,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Required:
    /// - `SARATHI_API_KEY`
    /// - `SARATHI_CLIENT_ID`
    ///
    /// Optional:
    /// - `SARATHI_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `SARATHI_SESSION_FILE`: default `<local data dir>/sarathi/session.json`
    /// - `SARATHI_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SARATHI_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let identity = ClientIdentity {
            api_key: required_var("SARATHI_API_KEY")?,
            client_id: required_var("SARATHI_CLIENT_ID")?,
        };

        let base_url = std::env::var("SARATHI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let session_file = std::env::var_os("SARATHI_SESSION_FILE").map_or_else(default_session_file, PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: env_parse("SARATHI_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("SARATHI_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, session_file, identity, timeouts })
    }

    /// Join an API path onto the configured base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn required_var(var: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(var).map_err(|_| ConfigError::MissingVar { var })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyVar { var });
    }
    Ok(value.to_owned())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(SESSION_DIR).join(SESSION_FILE))
        .unwrap_or_else(|| PathBuf::from(format!(".{SESSION_DIR}-{SESSION_FILE}")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
