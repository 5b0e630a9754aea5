//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EMPORIUM_DATABASE_URL` - `PostgreSQL` connection string
//! - `EMPORIUM_BASE_URL` - Public URL the API is reachable at (used to build
//!   image URLs)
//! - `EMPORIUM_JWT_SECRET` - HMAC signing secret for access/refresh tokens
//!   (min 32 chars)
//!
//! ## Optional
//! - `EMPORIUM_HOST` - Bind address (default: 127.0.0.1)
//! - `EMPORIUM_PORT` - Listen port (default: 8080)
//! - `EMPORIUM_UPLOAD_DIR` - Root directory for stored image bytes
//!   (default: uploads)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Minimum length of the JWT signing secret.
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used to build image URLs
    pub base_url: String,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Root directory for stored image bytes
    pub upload_dir: PathBuf,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the JWT secret fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = std::env::var("EMPORIUM_DATABASE_URL")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("EMPORIUM_DATABASE_URL".to_owned()))?;

        let host = get_env_or_default("EMPORIUM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMPORIUM_HOST".to_owned(), e.to_string()))?;

        let port = get_env_or_default("EMPORIUM_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMPORIUM_PORT".to_owned(), e.to_string()))?;

        let base_url = std::env::var("EMPORIUM_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("EMPORIUM_BASE_URL".to_owned()))?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("EMPORIUM_BASE_URL".to_owned(), e.to_string())
        })?;

        let jwt_secret = std::env::var("EMPORIUM_JWT_SECRET")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("EMPORIUM_JWT_SECRET".to_owned()))?;
        validate_jwt_secret(&jwt_secret, "EMPORIUM_JWT_SECRET")?;

        let upload_dir = PathBuf::from(get_env_or_default("EMPORIUM_UPLOAD_DIR", "uploads"));

        Ok(Self {
            database_url,
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_owned(),
            jwt_secret,
            upload_dir,
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read an environment variable, falling back to a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Validate the JWT signing secret: length and placeholder detection.
fn validate_jwt_secret(secret: &SecretString, var: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var.to_owned(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lowered.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var.to_owned(),
            format!("contains placeholder pattern \"{pattern}\""),
        ));
    }

    Ok(())
}
