//! Medica service configuration.
//!
//! Configuration is loaded from environment variables. Sensitive fields are
//! held as `SecretString` and redacted in Debug output.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::SecretString;
use common::types::GeoPoint;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default directory for consult attachments.
pub const DEFAULT_UPLOAD_DIR: &str = "./static/uploads";

/// Default maximum upload size (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Default reference point for ranking pharmacies when the requester sends
/// no location (Paris city centre).
pub const DEFAULT_LOCATOR_FALLBACK: GeoPoint = GeoPoint::new(48.8566, 2.3522);

/// Default request deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 30;

/// Minimum accepted length of the token signing secret (256 bits).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Medica service configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: SecretString,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// HS256 secret shared with the identity provider.
    pub jwt_secret: SecretString,

    /// JWT clock skew tolerance in seconds for iat validation.
    pub jwt_clock_skew_seconds: i64,

    /// Directory where consult attachments are written.
    pub upload_dir: PathBuf,

    /// Maximum accepted request body for uploads, in bytes.
    pub max_upload_bytes: usize,

    /// Reference point used by the medicine locator when the request
    /// carries no coordinates.
    pub locator_fallback: GeoPoint,

    /// Per-request deadline enforced at the HTTP boundary.
    pub request_timeout_seconds: u64,

    /// Seconds to keep draining connections after a shutdown signal.
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("locator_fallback", &self.locator_fallback)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret configuration: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid upload configuration: {0}")]
    InvalidUpload(String),

    #[error("Invalid locator fallback configuration: {0}")]
    InvalidLocatorFallback(String),

    #[error("Invalid timeout configuration: {0}")]
    InvalidTimeout(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?
            .clone();

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs() as i64
        };

        let upload_dir = vars
            .get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let max_upload_bytes = if let Some(value_str) = vars.get("MAX_UPLOAD_BYTES") {
            let value: usize = value_str.parse().map_err(|e| {
                ConfigError::InvalidUpload(format!(
                    "MAX_UPLOAD_BYTES must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidUpload(
                    "MAX_UPLOAD_BYTES must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_MAX_UPLOAD_BYTES
        };

        let fallback_lat = parse_coordinate(vars, "LOCATOR_FALLBACK_LAT", 90.0)?
            .unwrap_or(DEFAULT_LOCATOR_FALLBACK.lat);
        let fallback_lng = parse_coordinate(vars, "LOCATOR_FALLBACK_LNG", 180.0)?
            .unwrap_or(DEFAULT_LOCATOR_FALLBACK.lng);

        let request_timeout_seconds = parse_positive_seconds(
            vars,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;

        // Zero is allowed here: it skips the drain period entirely.
        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "DRAIN_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => DEFAULT_DRAIN_SECONDS,
        };

        Ok(Config {
            database_url: SecretString::from(database_url),
            bind_address,
            jwt_secret: SecretString::from(jwt_secret),
            jwt_clock_skew_seconds,
            upload_dir,
            max_upload_bytes,
            locator_fallback: GeoPoint::new(fallback_lat, fallback_lng),
            request_timeout_seconds,
            drain_seconds,
        })
    }
}

/// Parse an optional coordinate and check it lies within `[-bound, bound]`.
fn parse_coordinate(
    vars: &HashMap<String, String>,
    key: &str,
    bound: f64,
) -> Result<Option<f64>, ConfigError> {
    let Some(value_str) = vars.get(key) else {
        return Ok(None);
    };

    let value: f64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidLocatorFallback(format!(
            "{} must be a valid number, got '{}': {}",
            key, value_str, e
        ))
    })?;

    if !value.is_finite() || value.abs() > bound {
        return Err(ConfigError::InvalidLocatorFallback(format!(
            "{} must be within [-{}, {}], got {}",
            key, bound, bound, value
        )));
    }

    Ok(Some(value))
}

fn parse_positive_seconds(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value_str) = vars.get(key) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTimeout(format!(
            "{} must be a valid positive integer, got '{}': {}",
            key, value_str, e
        ))
    })?;

    if value == 0 {
        return Err(ConfigError::InvalidTimeout(format!(
            "{} must be greater than 0",
            key
        )));
    }

    Ok(value)
}
