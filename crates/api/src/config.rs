use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

/// Invalid value in the environment. Reported at startup.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {var} ({value:?}): {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the estimation service.
    pub estimator_base_url: String,
    /// Per-request timeout for estimation service calls (default: `15`).
    pub estimator_timeout_secs: u64,
    /// Scheduling page used for the "Book a tour" link. `None` falls back
    /// to a `mailto:` link.
    pub booking_base_url: Option<String>,
    /// Headless Chromium executable.
    pub chromium_path: String,
    /// PDF conversion budget in seconds (default: `10`).
    pub pdf_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                   |
    /// |--------------------------|---------------------------|
    /// | `HOST`                   | `0.0.0.0`                 |
    /// | `PORT`                   | `3000`                    |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`   |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                      |
    /// | `ESTIMATOR_BASE_URL`     | `http://localhost:8000`   |
    /// | `ESTIMATOR_TIMEOUT_SECS` | `15`                      |
    /// | `BOOKING_BASE_URL`       | unset                     |
    /// | `CHROMIUM_PATH`          | `chromium`                |
    /// | `PDF_TIMEOUT_SECS`       | `10`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse("PORT", var("PORT", "3000"))?;

        let cors_origins = var("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?;
        let estimator_base_url = var("ESTIMATOR_BASE_URL", "http://localhost:8000");
        let estimator_timeout_secs =
            parse("ESTIMATOR_TIMEOUT_SECS", var("ESTIMATOR_TIMEOUT_SECS", "15"))?;

        let booking_base_url = lookup("BOOKING_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let chromium_path = var("CHROMIUM_PATH", "chromium");
        let pdf_timeout_secs: u64 = parse("PDF_TIMEOUT_SECS", var("PDF_TIMEOUT_SECS", "10"))?;
        if pdf_timeout_secs == 0 {
            return Err(ConfigError {
                var: "PDF_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            estimator_base_url,
            estimator_timeout_secs,
            booking_base_url,
            chromium_path,
            pdf_timeout_secs,
        })
    }

    pub fn estimator_timeout(&self) -> Duration {
        Duration::from_secs(self.estimator_timeout_secs)
    }

    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        reason: e.to_string(),
        value,
    })
}
