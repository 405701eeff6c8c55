//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_DEFAULT_LOCALE` - `zh-TW` or `en` (default: zh-TW)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `STOREFRONT_AUTH_LATENCY_MS` - Simulated login/registration delay (default: 1500)
//! - `STOREFRONT_ACCOUNT_LATENCY_MS` - Simulated profile update delay (default: 1000)
//! - `STOREFRONT_CONTACT_LATENCY_MS` - Simulated contact form delay (default: 1000)
//! - `STOREFRONT_CHECKOUT_LATENCY_MS` - Simulated payment processing delay (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::i18n::Locale;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Locale used when the request does not ask for one
    pub default_locale: Locale,
    /// Log line format
    pub log_format: LogFormat,
    /// Artificial delays of the mock services
    pub latency: MockLatencyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Output format of the `fmt` tracing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Simulated network latency for each mock service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatencyConfig {
    /// Login and registration
    pub auth: Duration,
    /// Profile and password updates
    pub account: Duration,
    /// Contact form submission
    pub contact: Duration,
    /// Payment processing at checkout
    pub checkout: Duration,
}

impl Default for MockLatencyConfig {
    fn default() -> Self {
        Self {
            auth: Duration::from_millis(1500),
            account: Duration::from_millis(1000),
            contact: Duration::from_millis(1000),
            checkout: Duration::from_millis(3000),
        }
    }
}

impl MockLatencyConfig {
    /// No artificial delay anywhere.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            auth: Duration::ZERO,
            account: Duration::ZERO,
            contact: Duration::ZERO,
            checkout: Duration::ZERO,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            auth: get_millis_or_default("STOREFRONT_AUTH_LATENCY_MS", defaults.auth)?,
            account: get_millis_or_default("STOREFRONT_ACCOUNT_LATENCY_MS", defaults.account)?,
            contact: get_millis_or_default("STOREFRONT_CONTACT_LATENCY_MS", defaults.contact)?,
            checkout: get_millis_or_default("STOREFRONT_CHECKOUT_LATENCY_MS", defaults.checkout)?,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let default_locale = parse_env_or_default::<Locale>("STOREFRONT_DEFAULT_LOCALE", "zh-TW")?;
        let log_format = parse_env_or_default::<LogFormat>("STOREFRONT_LOG_FORMAT", "pretty")?;
        let latency = MockLatencyConfig::from_env()?;

        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            default_locale,
            log_format,
            latency,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Defaults for running on a developer machine, without reading the
    /// environment.
    #[must_use]
    pub fn local() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            default_locale: Locale::default(),
            log_format: LogFormat::Pretty,
            latency: MockLatencyConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_millis_or_default(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match get_optional_env(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a sample rate and check it lies in `[0, 1]`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate = parse_env_or_default::<f32>(key, default)?;
    validate_rate(key, rate)
}

fn validate_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0-1.0"),
        ))
    }
}
