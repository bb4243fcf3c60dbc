use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::RetryPolicy;

/// Application-level constants
pub const APP_NAME: &str = "Patient Triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ACQUISITION_TIMEOUT_SECS: u64 = 300;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "triage_lib=info,patient_triage=info,warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TRIAGE_API_KEY is not set")]
    MissingApiKey,
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration, read from `TRIAGE_*` environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub upstream_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub page_size: u32,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub request_timeout_secs: u64,
    pub acquisition_timeout: Duration,
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("backoff_base", &self.backoff_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("acquisition_timeout", &self.acquisition_timeout)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("TRIAGE_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let upstream_url =
            get("TRIAGE_UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.into());
        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "TRIAGE_UPSTREAM_URL",
                value: upstream_url,
            });
        }

        let page_size: u32 = parse_or(&get, "TRIAGE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "TRIAGE_PAGE_SIZE",
                value: "0".into(),
            });
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            upstream_url,
            host: parse_or(&get, "TRIAGE_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or(&get, "TRIAGE_PORT", DEFAULT_PORT)?,
            page_size,
            max_retries: parse_or(&get, "TRIAGE_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            backoff_base: Duration::from_millis(parse_or(
                &get,
                "TRIAGE_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            )?),
            request_timeout_secs: parse_or(
                &get,
                "TRIAGE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            acquisition_timeout: Duration::from_secs(parse_or(
                &get,
                "TRIAGE_ACQUISITION_TIMEOUT_SECS",
                DEFAULT_ACQUISITION_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: self.backoff_base,
        }
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
