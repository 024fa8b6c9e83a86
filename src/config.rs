//! Run configuration, read once from the environment at startup.

use log::debug;
use std::env::VarError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::runtime::Runtime;

pub const API_URL: &str = "API_URL";
pub const MAX_RETRIES: &str = "MAX_RETRIES";
pub const RETRY_DELAY: &str = "RETRY_DELAY";
pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
pub const ACCEPT_INVALID_CERTS: &str = "ACCEPT_INVALID_CERTS";
pub const FAIL_ON_ERROR: &str = "FAIL_ON_ERROR";

/// Number of attempts when `MAX_RETRIES` is not set.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Seconds between attempts when `RETRY_DELAY` is not set.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Log file used when neither `--log-file` nor `LOG_FILE` is given.
pub const DEFAULT_LOG_FILE: &str = "order_sync.log";

/// Errors that prevent a run from starting.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `API_URL` is unset or blank
    MissingApiUrl,
    /// A variable is set but cannot be used
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiUrl => {
                write!(f, "{} environment variable not set.", API_URL)
            }
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value {:?} for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command-line switches that take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub accept_invalid_certs: bool,
    pub fail_on_error: bool,
}

/// Immutable settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint the GET is sent to.
    pub api_url: String,
    /// Total number of attempts, always at least 1.
    pub max_retries: u32,
    /// Pause between a failed attempt and the next one.
    pub retry_delay: Duration,
    /// Per-request timeout. `None` leaves the transport without one.
    pub request_timeout: Option<Duration>,
    /// Skip TLS certificate validation. Opt-in only.
    pub accept_invalid_certs: bool,
    /// Exit non-zero when the run ends exhausted or aborted.
    pub fail_on_error: bool,
}

impl Config {
    /// Creates a configuration for `api_url` with every other setting at its default.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            request_timeout: None,
            accept_invalid_certs: false,
            fail_on_error: false,
        }
    }

    /// Reads the configuration from the environment and applies `overrides` on top.
    ///
    /// Unset or blank optional variables fall back to their defaults. A missing
    /// `API_URL` (after overrides) is reported as [`ConfigError::MissingApiUrl`].
    pub fn load<R: Runtime>(
        runtime: &R,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let api_url = match &overrides.api_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => lookup(runtime, API_URL)?.ok_or(ConfigError::MissingApiUrl)?,
        };

        let max_retries = match lookup(runtime, MAX_RETRIES)? {
            Some(raw) => {
                let value: u32 = parse_number(MAX_RETRIES, &raw)?;
                if value == 0 {
                    return Err(invalid(
                        MAX_RETRIES,
                        &raw,
                        "at least one attempt is required",
                    ));
                }
                value
            }
            None => DEFAULT_MAX_RETRIES,
        };

        let retry_delay = match lookup(runtime, RETRY_DELAY)? {
            Some(raw) => Duration::from_secs(parse_number(RETRY_DELAY, &raw)?),
            None => Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        };

        let request_timeout = match lookup(runtime, REQUEST_TIMEOUT)? {
            Some(raw) => {
                let secs: u64 = parse_number(REQUEST_TIMEOUT, &raw)?;
                if secs == 0 {
                    return Err(invalid(REQUEST_TIMEOUT, &raw, "timeout must be positive"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let accept_invalid_certs =
            overrides.accept_invalid_certs || parse_flag(runtime, ACCEPT_INVALID_CERTS)?;
        let fail_on_error = overrides.fail_on_error || parse_flag(runtime, FAIL_ON_ERROR)?;

        let config = Self {
            api_url,
            max_retries,
            retry_delay,
            request_timeout,
            accept_invalid_certs,
            fail_on_error,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

/// Returns the trimmed value of `key`, or `None` when it is unset or blank.
fn lookup<R: Runtime>(runtime: &R, key: &'static str) -> Result<Option<String>, ConfigError> {
    match runtime.env_var(key) {
        Ok(value) => {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(invalid(
            key,
            &raw.to_string_lossy(),
            "value is not valid unicode",
        )),
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| invalid(key, raw, &format!("expected a non-negative integer ({})", e)))
}

fn parse_flag<R: Runtime>(runtime: &R, key: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(runtime, key)? else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, &raw, "expected true or false")),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
