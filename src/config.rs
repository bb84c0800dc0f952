use crate::constants::*;
use crate::error::{ForwarderError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Bounded exponential backoff for delivery attempts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_wait_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_wait_ms: DEFAULT_INITIAL_WAIT_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn initial_wait(&self) -> Duration {
        Duration::from_millis(self.initial_wait_ms)
    }

    /// Waits taken between consecutive attempts; one fewer than `max_attempts`.
    pub fn wait_schedule(&self) -> Vec<Duration> {
        let mut wait = self.initial_wait();
        let mut schedule = Vec::new();
        for _ in 1..self.max_attempts {
            schedule.push(wait);
            wait = wait.mul_f64(self.backoff_factor);
        }
        schedule
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit console logs as JSON lines
    pub json: bool,
    /// Also write daily-rotated JSON logs under this directory
    pub log_dir: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct ForwarderConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl fmt::Debug for ForwarderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwarderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("retry", &self.retry)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("logging", &self.logging)
            .finish()
    }
}

impl ForwarderConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .ok_or_else(|| ForwarderError::Config(format!("{} must be set", API_KEY_ENV)))?;
        let endpoint = lookup(ENDPOINT_ENV)
            .ok_or_else(|| ForwarderError::Config(format!("{} must be set", ENDPOINT_ENV)))?;

        let config = Self {
            endpoint,
            api_key,
            retry: RetryPolicy {
                max_attempts: parse_or(&lookup, MAX_ATTEMPTS_ENV, DEFAULT_MAX_ATTEMPTS)?,
                initial_wait_ms: parse_or(&lookup, INITIAL_WAIT_MS_ENV, DEFAULT_INITIAL_WAIT_MS)?,
                backoff_factor: parse_or(&lookup, BACKOFF_FACTOR_ENV, DEFAULT_BACKOFF_FACTOR)?,
            },
            request_timeout_secs: parse_or(
                &lookup,
                REQUEST_TIMEOUT_SECS_ENV,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            logging: LoggingConfig {
                json: lookup(LOG_JSON_ENV).map(|v| parse_flag(&v)).unwrap_or(false),
                log_dir: lookup(LOG_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file. `SCALYR_API_KEY` and `SCALYR_ENDPOINT` in the
    /// environment take precedence over the file.
    pub fn load(path: &Path) -> Result<Self> {
        dotenv::dotenv().ok();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForwarderError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content, |name| std::env::var(name).ok())
    }

    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: ForwarderConfig = toml::from_str(content)?;
        if let Some(key) = lookup(API_KEY_ENV) {
            config.api_key = key;
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ForwarderError::Config(format!("{} is empty", API_KEY_ENV)));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ForwarderError::Config("ingestion endpoint is empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ForwarderError::Config("max_attempts must be at least 1".into()));
        }
        if !(self.retry.backoff_factor >= 1.0 && self.retry.backoff_factor.is_finite()) {
            return Err(ForwarderError::Config(format!(
                "backoff_factor must be a finite value >= 1.0, got {}",
                self.retry.backoff_factor
            )));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ForwarderError::Config(format!("invalid {}='{}': {}", name, raw, e))),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_uses_defaults() {
        let config = ForwarderConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (ENDPOINT_ENV, "https://app.scalyr.com/api/addEvents"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.logging.json);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = ForwarderConfig::from_lookup(lookup_from(&[(ENDPOINT_ENV, "http://x")]))
            .unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let err = ForwarderConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "k")])).unwrap_err();
        assert!(err.to_string().contains(ENDPOINT_ENV));
    }

    #[test]
    fn test_retry_overrides_and_invalid_values() {
        let config = ForwarderConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "k"),
            (ENDPOINT_ENV, "http://x"),
            (MAX_ATTEMPTS_ENV, "5"),
            (INITIAL_WAIT_MS_ENV, "250"),
            (LOG_JSON_ENV, "true"),
        ]))
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_wait(), Duration::from_millis(250));
        assert!(config.logging.json);

        let err = ForwarderConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "k"),
            (ENDPOINT_ENV, "http://x"),
            (MAX_ATTEMPTS_ENV, "three"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));

        let err = ForwarderConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "k"),
            (ENDPOINT_ENV, "http://x"),
            (MAX_ATTEMPTS_ENV, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));
    }

    #[test]
    fn test_default_wait_schedule() {
        let schedule = RetryPolicy::default().wait_schedule();
        assert_eq!(
            schedule,
            vec![Duration::from_millis(1000), Duration::from_millis(1500)]
        );
    }

    #[test]
    fn test_toml_config_with_env_key() {
        let content = r#"
            endpoint = "https://app.scalyr.com/api/addEvents"
            request_timeout_secs = 10

            [retry]
            max_attempts = 4
            initial_wait_ms = 100

            [logging]
            json = true
        "#;
        let config =
            ForwarderConfig::from_toml_str(content, lookup_from(&[(API_KEY_ENV, "from-env")]))
                .unwrap();

        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.backoff_factor, 1.5);
        assert!(config.logging.json);
    }

    #[test]
    fn test_toml_without_endpoint_takes_it_from_env() {
        let content = "api_key = \"file-key\"\n";
        let config = ForwarderConfig::from_toml_str(
            content,
            lookup_from(&[(ENDPOINT_ENV, "https://app.scalyr.com/api/addEvents")]),
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://app.scalyr.com/api/addEvents");
        assert_eq!(config.api_key, "file-key");

        let err = ForwarderConfig::from_toml_str(content, lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forwarder.toml");
        std::fs::write(
            &path,
            "endpoint = \"http://127.0.0.1:9/api/addEvents\"\napi_key = \"file-key\"\n",
        )
        .unwrap();

        // Environment may override, so only check what the file alone decides
        let config = ForwarderConfig::load(&path).unwrap();
        assert!(!config.api_key.is_empty());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ForwarderConfig::new("http://x", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
